pub mod notification;
pub mod recipe;
pub mod suggestion;

pub use notification::{
    FeedFilter, FeedPage, Notification, NotificationKind, NotificationPriority,
};
pub use recipe::{Recipe, RecipeStatus};
pub use suggestion::{SearchSuggestion, SuggestionMatch, group_by_category};
