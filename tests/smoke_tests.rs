//! Smoke tests for the core client flows against the mock backend.

mod support;

use ladle::SharedState;
use ladle::clients::{ApiError, SearchMode};
use ladle::clients::search::SearchRequest;
use ladle::models::FeedFilter;
use ladle::services::SuggestMode;
use serde_json::json;
use support::{MockBackend, MockNotification};

#[tokio::test]
async fn login_stores_token_and_authorizes_me() {
    let (_backend, base_url) = support::spawn(MockBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    let user = state.session.login("cook@example.com", "secret").await.unwrap();
    assert_eq!(user.id, "u1");

    // Bearer token from the login must authorize the profile fetch.
    let profile = state.session.me().await.unwrap();
    assert_eq!(profile.id, "u1");
}

#[tokio::test]
async fn bad_password_surfaces_backend_detail() {
    let (_backend, base_url) = support::spawn(MockBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    let err = state
        .session
        .login("cook@example.com", "nope")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid credentials"));
}

#[tokio::test]
async fn smart_search_decodes_results() {
    let (_backend, base_url) = support::spawn(MockBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    let request = SearchRequest::query("lasagna", 20);
    let response = state.search.search(SearchMode::Smart, &request).await.unwrap();

    assert_eq!(response.total, 1);
    assert_eq!(response.data[0].id, "r1");
    assert_eq!(response.data[0].title, "Classic Lasagna");
    assert!(response.execution_time_ms.is_some());
}

#[tokio::test]
async fn unconfigured_search_is_unavailable_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ladle::Config::default();
    config.cache.path = Some(dir.path().join("cache.json"));
    let state = SharedState::new(config).unwrap();

    assert!(!state.search.is_available());

    let request = SearchRequest::query("lasagna", 20);
    let err = state
        .search
        .search(SearchMode::Smart, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unavailable));
}

#[tokio::test]
async fn suggestions_flow_end_to_end() {
    let mut backend = MockBackend::default();
    backend.suggestions = vec![json!({
        "name": "chicken",
        "category": "Meat",
        "match_type": "exact",
    })];
    let (_backend, base_url) = support::spawn(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    state.suggest.set_query("ch", SuggestMode::General);
    state.suggest.flush().await;

    let snapshot = state.suggest.state();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.suggestions.len(), 1);
    assert_eq!(snapshot.suggestions[0].name, "chicken");
    assert_eq!(snapshot.suggestions[0].category, "Meat");
}

#[tokio::test]
async fn saved_toggle_round_trips_against_backend() {
    let (backend, base_url) = support::spawn(MockBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    state.session.login("cook@example.com", "secret").await.unwrap();
    state.saved.load("u1").await;

    assert!(state.saved.toggle("r1").await.unwrap());
    assert!(backend.lock().unwrap().saved.contains("r1"));

    assert!(!state.saved.toggle("r1").await.unwrap());
    assert!(!backend.lock().unwrap().saved.contains("r1"));
    assert!(!state.saved.is_saved("r1").await);
}

#[tokio::test]
async fn failed_save_reverts_membership() {
    let (backend, base_url) = support::spawn(MockBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    state.saved.load("u1").await;
    backend.lock().unwrap().fail_mutations = Some("backend offline".to_string());

    let result = state.saved.toggle("r1").await;
    assert!(result.is_err());
    assert!(!state.saved.is_saved("r1").await);

    let error = state.saved.last_error().await.unwrap();
    assert!(error.contains("backend offline"));
}

#[tokio::test]
async fn mark_all_read_then_refetch_yields_zero_unread() {
    let mut backend = MockBackend::default();
    backend.notifications = vec![
        MockNotification::new("n1", "INFO", "LOW", "Welcome", false),
        MockNotification::new("n2", "SUCCESS", "MEDIUM", "Recipe approved", false),
        MockNotification::new("n3", "WARNING", "HIGH", "Review pending", true),
    ];
    let (_backend, base_url) = support::spawn(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    assert_eq!(state.feed.poll_unread_once().await, 2);

    let affected = state.feed.mark_all_read().await.unwrap();
    assert_eq!(affected, 2);
    assert_eq!(state.feed.unread_count(), 0);

    let page = state.feed.page(1, &FeedFilter::unread_only()).await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn clear_all_empties_the_feed() {
    let mut backend = MockBackend::default();
    backend.notifications = vec![
        MockNotification::new("n1", "INFO", "LOW", "Welcome", false),
        MockNotification::new("n2", "ERROR", "HIGH", "Upload failed", false),
    ];
    let (_backend, base_url) = support::spawn(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let state = SharedState::new(support::test_config(&base_url, &dir)).unwrap();

    let affected = state.feed.clear_all().await.unwrap();
    assert_eq!(affected, 2);

    let page = state.feed.page(1, &FeedFilter::default()).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);

    // The batch mutation reports its count through the toast bus.
    let history = state.toasts.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].title.contains('2'));
}
