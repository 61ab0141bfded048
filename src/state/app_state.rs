// Application state management
// Holds the cached subscriber list, stats, session and UI state

use super::session::SessionStore;
use crate::api::{ConversationMessage, Stats, Subscriber};
use crate::view::{SortColumn, SortState, ITEMS_PER_PAGE};
use std::collections::BTreeSet;

/// Dashboard sections reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// Stats cards and quota
    #[default]
    Dashboard,
    /// Subscriber table
    Audience,
    /// Compose form
    Compose,
    /// Conversation threads
    Threads,
    /// Backend endpoint details
    ApiInfo,
}

impl Section {
    /// All sections in sidebar order
    pub const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Audience,
        Section::Compose,
        Section::Threads,
        Section::ApiInfo,
    ];

    /// Page title shown in the top bar
    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Audience => "Audience Management",
            Section::Compose => "Compose Email",
            Section::Threads => "Gmail Threads",
            Section::ApiInfo => "API Information",
        }
    }

    /// Sidebar label
    pub fn nav_label(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Audience => "Audience",
            Section::Compose => "Compose",
            Section::Threads => "Threads",
            Section::ApiInfo => "API Info",
        }
    }
}

/// Start/end pair typed into the date-range fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Start date as typed
    pub start: String,
    /// End date as typed
    pub end: String,
}

/// Ephemeral table state, never persisted
#[derive(Debug, Clone)]
pub struct UiState {
    /// Active sidebar section
    pub current_section: Section,
    /// 1-based table page
    pub current_page: usize,
    /// Rows per page
    pub items_per_page: usize,
    /// Active sort, if any column was clicked
    pub sort: Option<SortState>,
    /// Free-text search
    pub search_term: String,
    /// Captured date range (stored only, not applied to the table)
    pub date_range: Option<DateRange>,
    /// Emails selected for batch actions
    pub selected: BTreeSet<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_section: Section::Dashboard,
            current_page: 1,
            items_per_page: ITEMS_PER_PAGE,
            sort: None,
            search_term: String::new(),
            date_range: None,
            selected: BTreeSet::new(),
        }
    }
}

impl UiState {
    /// Apply a click on a sortable column header and return to page 1
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = Some(SortState::after_click(self.sort, column));
        self.current_page = 1;
    }

    /// Replace the search term and return to page 1
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Store a date range when both ends are given, otherwise clear it
    pub fn set_date_range(&mut self, start: &str, end: &str) {
        let (start, end) = (start.trim(), end.trim());
        self.date_range = if start.is_empty() || end.is_empty() {
            None
        } else {
            Some(DateRange {
                start: start.to_string(),
                end: end.to_string(),
            })
        };
        self.current_page = 1;
    }

    /// Advance one page if not already on the last
    pub fn next_page(&mut self, total_pages: usize) {
        if self.current_page < total_pages {
            self.current_page += 1;
        }
    }

    /// Go back one page if not already on the first
    pub fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Add or remove one email from the batch selection
    pub fn toggle_selection(&mut self, email: &str, checked: bool) {
        if checked {
            self.selected.insert(email.to_string());
        } else {
            self.selected.remove(email);
        }
    }

    /// Apply the select-all checkbox to the given rows
    pub fn select_all<'a, I: IntoIterator<Item = &'a str>>(&mut self, emails: I, checked: bool) {
        for email in emails {
            self.toggle_selection(email, checked);
        }
    }

    /// Drop the whole batch selection
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Number of selected subscribers
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Whether an email is part of the batch selection
    pub fn is_selected(&self, email: &str) -> bool {
        self.selected.contains(email)
    }
}

/// Result of one dashboard sync, ready to be applied to [`AppState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh data from the backend
    Loaded {
        /// Full subscriber list
        subscribers: Vec<Subscriber>,
        /// Aggregate counters
        stats: Stats,
    },
    /// The fetch failed; the client shows zeroed, online defaults
    Degraded {
        /// Message for the error notification
        message: String,
    },
    /// The backend no longer accepts the token
    SessionExpired,
}

/// Conversation thread currently shown in the threads section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationView {
    /// Whose history this is
    pub email: String,
    /// Messages as returned by the backend
    pub history: Vec<ConversationMessage>,
}

/// Main application state
///
/// Owned by the UI controller and only touched from the UI thread.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Cached subscriber list, replaced wholesale on every sync
    pub subscribers: Vec<Subscriber>,
    /// Aggregate counters, replaced wholesale on every sync
    pub stats: Stats,
    /// Table, navigation and selection state
    pub ui: UiState,
    /// Persisted session
    pub session: SessionStore,
    /// A dashboard sync is in flight
    pub is_loading: bool,
    /// Last loaded conversation, if any
    pub conversation: Option<ConversationView>,
}

impl AppState {
    /// Create a new application state around a session store
    pub fn new(session: SessionStore) -> Self {
        Self {
            subscribers: Vec::new(),
            stats: Stats::default(),
            ui: UiState::default(),
            session,
            is_loading: false,
            conversation: None,
        }
    }

    /// Land a sync result
    ///
    /// Data is replaced, never merged, so overlapping syncs at worst cause a
    /// redundant re-render. Returns `false` when the session has expired and
    /// the caller must force a logout.
    pub fn apply_sync(&mut self, outcome: SyncOutcome) -> bool {
        self.is_loading = false;
        match outcome {
            SyncOutcome::Loaded { subscribers, stats } => {
                self.subscribers = subscribers;
                self.stats = stats;
                true
            }
            SyncOutcome::Degraded { .. } => {
                self.subscribers = Vec::new();
                self.stats = Stats::default();
                true
            }
            SyncOutcome::SessionExpired => false,
        }
    }

    /// Switch the visible section
    pub fn switch_section(&mut self, section: Section) {
        self.ui.current_section = section;
    }

    /// Forget everything tied to the logged-in session
    pub fn reset_after_logout(&mut self) {
        self.subscribers.clear();
        self.stats = Stats::default();
        self.ui = UiState::default();
        self.is_loading = false;
        self.conversation = None;
    }

    /// Number of cached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
