// State management module
// Handles application state, UI state, and the persisted session

/// In-memory dashboard state
pub mod app_state;
/// Persisted login session
pub mod session;

pub use app_state::{AppState, ConversationView, DateRange, Section, SyncOutcome, UiState};
pub use session::{Session, SessionStore};
