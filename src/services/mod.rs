pub mod feed;
pub use feed::{FeedError, FeedService};

pub mod push;
pub use push::{PushMessage, PushService};

pub mod saved;
pub use saved::{SavedError, SavedRecipesService};

pub mod session;
pub use session::{SessionData, SessionError, SessionService};

pub mod suggest;
pub use suggest::{SuggestMode, SuggestService, SuggestState};

pub mod toast;
pub use toast::{HistoryEntry, ToastBus, ToastView};
