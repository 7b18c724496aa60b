use serde::{Deserialize, Serialize};

/// How a suggestion matched the typed prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMatch {
    Exact,
    Prefix,
    Fuzzy,
}

/// One autocomplete entry. Ephemeral: produced per keystroke, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSuggestion {
    pub name: String,
    pub category: String,
    pub match_type: SuggestionMatch,
}

/// Groups suggestions by category, preserving first-seen category order.
#[must_use]
pub fn group_by_category(
    suggestions: &[SearchSuggestion],
) -> Vec<(String, Vec<&SearchSuggestion>)> {
    let mut groups: Vec<(String, Vec<&SearchSuggestion>)> = Vec::new();

    for suggestion in suggestions {
        match groups.iter_mut().find(|(c, _)| *c == suggestion.category) {
            Some((_, members)) => members.push(suggestion),
            None => groups.push((suggestion.category.clone(), vec![suggestion])),
        }
    }

    groups
}
