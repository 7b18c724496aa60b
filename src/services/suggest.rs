//! Debounced search suggestions.
//!
//! Each keystroke cancels the previously scheduled fetch and schedules a new
//! one after a quiet interval, so a burst of typing costs exactly one network
//! call. A generation counter is checked before and after the fetch: results
//! belonging to a superseded query never reach visible state, even when
//! responses arrive out of order. Aborting the pending task also drops the
//! in-flight request at the transport level.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::clients::{ApiError, SearchApi};
use crate::config::SearchConfig;
use crate::events::AppEvent;
use crate::models::SearchSuggestion;

/// Which suggestion surface is being driven. Ingredient autocomplete fires
/// from a single character; general search waits for two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestMode {
    General,
    Ingredients,
}

/// Snapshot of the suggestion state as the UI would render it.
#[derive(Debug, Clone)]
pub struct SuggestState {
    pub query: String,
    pub suggestions: Vec<SearchSuggestion>,
    pub error: Option<String>,
    pub loading: bool,
    /// False when the search backend is not configured; render a
    /// disabled-feature state, not an error.
    pub available: bool,
}

impl SuggestState {
    fn new(available: bool) -> Self {
        Self {
            query: String::new(),
            suggestions: Vec::new(),
            error: None,
            loading: false,
            available,
        }
    }
}

pub struct SuggestService {
    api: Arc<dyn SearchApi>,
    bus: broadcast::Sender<AppEvent>,
    debounce: Duration,
    min_query_len: usize,
    min_ingredient_len: usize,
    limit: usize,
    state: Arc<Mutex<SuggestState>>,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SuggestService {
    #[must_use]
    pub fn new(
        api: Arc<dyn SearchApi>,
        bus: broadcast::Sender<AppEvent>,
        config: &SearchConfig,
    ) -> Self {
        let available = api.is_available();
        Self {
            api,
            bus,
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_len: config.min_query_len,
            min_ingredient_len: config.min_ingredient_len,
            limit: config.suggestion_limit,
            state: Arc::new(Mutex::new(SuggestState::new(available))),
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn state(&self) -> SuggestState {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|_| SuggestState::new(false))
    }

    const fn threshold(&self, mode: SuggestMode) -> usize {
        match mode {
            SuggestMode::General => self.min_query_len,
            SuggestMode::Ingredients => self.min_ingredient_len,
        }
    }

    /// Records a keystroke. Cancels any pending fetch; below the length
    /// threshold the results clear synchronously with no network call,
    /// otherwise a single fetch is scheduled after the quiet interval.
    pub fn set_query(&self, query: &str, mode: SuggestMode) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Ok(mut pending) = self.pending.lock()
            && let Some(handle) = pending.take()
        {
            handle.abort();
        }

        if let Ok(mut state) = self.state.lock() {
            state.query = query.to_string();
            if !state.available {
                state.suggestions.clear();
                state.loading = false;
                return;
            }
        }

        let trimmed = query.trim().to_string();
        if trimmed.chars().count() < self.threshold(mode) {
            if let Ok(mut state) = self.state.lock() {
                state.suggestions.clear();
                state.error = None;
                state.loading = false;
            }
            return;
        }

        if let Ok(mut state) = self.state.lock() {
            state.loading = true;
        }

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let generations = Arc::clone(&self.generation);
        let bus = self.bus.clone();
        let debounce = self.debounce;
        let limit = self.limit;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if generations.load(Ordering::SeqCst) != generation {
                return;
            }

            let result = api.suggestions(&trimmed, limit).await;

            // A newer keystroke may have arrived while the request was in
            // flight; its generation owns the state now.
            if generations.load(Ordering::SeqCst) != generation {
                debug!(query = %trimmed, "discarding superseded suggestion response");
                return;
            }

            if let Ok(mut state) = state.lock() {
                match result {
                    Ok(suggestions) => {
                        state.suggestions = suggestions;
                        state.error = None;
                    }
                    Err(ApiError::Unavailable) => {
                        state.suggestions.clear();
                        state.available = false;
                    }
                    Err(e) => {
                        state.suggestions.clear();
                        state.error = Some(format!("Suggestions temporarily unavailable: {e}"));
                    }
                }
                state.loading = false;
            }

            let _ = bus.send(AppEvent::SuggestionsUpdated { query: trimmed });
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }
    }

    /// Awaits the scheduled fetch, if any. Used by the CLI and tests; a UI
    /// would instead observe `SuggestionsUpdated` on the bus.
    pub async fn flush(&self) {
        let handle = self.pending.lock().ok().and_then(|mut p| p.take());
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
