//! Application events carried on the process-wide broadcast bus.
//!
//! UI layers subscribe to these to re-render; the CLI daemon prints them.

use serde::Serialize;

use crate::services::toast::ToastView;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum AppEvent {
    Toast(ToastView),

    UnreadCount(u64),

    FeedInvalidated,

    SavedChanged {
        recipe_id: String,
        saved: bool,
    },

    SuggestionsUpdated {
        query: String,
    },

    SessionChanged {
        signed_in: bool,
    },
}
