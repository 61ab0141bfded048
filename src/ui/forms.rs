// Form buffers and commands
// Widgets write into `Forms`; clicks that need the backend become `UiCommand`s

use crate::api::{EmailDraft, ImportEntry, SubscriberStatus};

/// A pending yes/no dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    /// "Are you sure you want to logout?"
    Logout,
    /// Remove one subscriber
    Unsubscribe(String),
    /// Delete every selected subscriber
    BatchDelete(usize),
    /// Submit a parsed import file
    Import(Vec<ImportEntry>),
}

impl Confirm {
    /// Dialog body text
    pub fn message(&self) -> String {
        match self {
            Confirm::Logout => "Are you sure you want to logout?".to_string(),
            Confirm::Unsubscribe(_) => {
                "Are you sure you want to remove this subscriber?".to_string()
            }
            Confirm::BatchDelete(count) => format!("Delete {} subscriber(s)?", count),
            Confirm::Import(entries) => crate::import::confirmation_message(entries),
        }
    }
}

/// Something the UI asked the controller to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Submit the login form
    Login,
    /// Logout confirmed
    Logout,
    /// Manual sync button
    Sync,
    /// Submit the add-subscriber modal
    AddSubscriber,
    /// Submit the compose form
    SendEmail,
    /// Load the thread for an email
    LoadConversation(String),
    /// Badge click: switch to the given status
    UpdateStatus {
        /// Subscriber email
        email: String,
        /// New status
        status: SubscriberStatus,
    },
    /// Single removal confirmed
    Unsubscribe(String),
    /// Batch removal confirmed
    BatchDelete,
    /// Parse the file named in the import field
    ParseImport,
    /// Import confirmed
    SubmitImport(Vec<ImportEntry>),
    /// Write the CSV export
    ExportCsv,
    /// Row action: compose to this subscriber
    QuickCompose(String),
    /// Row action: show this subscriber's thread
    OpenThread(String),
}

/// Text buffers and flags backing the forms
#[derive(Debug, Clone, Default)]
pub struct Forms {
    /// Login password field
    pub password: String,
    /// Inline login error
    pub login_error: Option<String>,
    /// "Attempts remaining" hint
    pub attempts_info: Option<String>,
    /// Account locked: keep the login button disabled
    pub login_locked: bool,
    /// A login request is in flight
    pub login_in_flight: bool,

    /// Add-subscriber modal is open
    pub show_add_modal: bool,
    /// Add-subscriber name field
    pub new_name: String,
    /// Add-subscriber email field
    pub new_email: String,
    /// An add request is in flight
    pub adding: bool,

    /// A batch delete loop is running
    pub batch_deleting: bool,

    /// Compose form
    pub compose: EmailDraft,
    /// A send is in flight
    pub sending: bool,

    /// Threads lookup field
    pub thread_email: String,
    /// A thread load is in flight
    pub loading_thread: bool,

    /// Import file path field
    pub import_path: String,

    /// Date-range start field
    pub date_start: String,
    /// Date-range end field
    pub date_end: String,

    /// Open confirmation dialog
    pub confirm: Option<Confirm>,
}

impl Forms {
    /// Reset the login screen after a logout
    pub fn reset_login(&mut self) {
        self.password.clear();
        self.login_error = None;
        self.attempts_info = None;
        self.login_locked = false;
        self.login_in_flight = false;
    }

    /// Close and clear the add-subscriber modal
    pub fn reset_add_modal(&mut self) {
        self.show_add_modal = false;
        self.adding = false;
        self.new_name.clear();
        self.new_email.clear();
    }

    /// Close any modal (Escape)
    pub fn close_modals(&mut self) {
        self.show_add_modal = false;
        self.confirm = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_messages() {
        assert_eq!(Confirm::BatchDelete(3).message(), "Delete 3 subscriber(s)?");
        let import = Confirm::Import(vec![ImportEntry::new("A", "a@x.com")]);
        assert!(import.message().starts_with("Found 1 subscribers to import."));
    }

    #[test]
    fn test_close_modals() {
        let mut forms = Forms {
            show_add_modal: true,
            confirm: Some(Confirm::Logout),
            ..Default::default()
        };
        forms.close_modals();
        assert!(!forms.show_add_modal);
        assert!(forms.confirm.is_none());
    }
}
