//! User-triggered operations
//!
//! Each action talks to the backend through [`ApiClient`] and returns a value
//! the UI thread applies to [`AppState`](crate::state::AppState). None of
//! these functions touch UI state directly, so they can run on the async
//! runtime while the UI keeps drawing.

use crate::api::{
    ApiClient, ConversationMessage, EmailDraft, ImportEntry, ImportResult, LoginGrant,
    SubscriberStatus,
};
use crate::error::{DashboardError, Result};
use crate::state::{SessionStore, SyncOutcome};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Green toast
    Success,
    /// Amber toast
    Warning,
    /// Red toast
    Error,
}

/// Transient notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text of the toast
    pub message: String,
    /// Severity
    pub level: NoticeLevel,
}

impl Notice {
    /// Success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    /// Warning notification
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Warning,
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// What the login screen should show after a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password accepted
    Authenticated(LoginGrant),
    /// Account locked; the login button stays disabled
    Locked(String),
    /// Wrong password
    Rejected {
        /// Message from the backend
        message: String,
        /// Remaining attempts, when reported
        attempts_left: Option<u32>,
    },
    /// The request itself failed
    Failed(String),
}

/// Reject an empty password before any request is made
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(DashboardError::Validation(
            "Please enter password".to_string(),
        ));
    }
    Ok(())
}

/// Attempt a login
pub async fn login(client: &ApiClient, password: &str) -> LoginOutcome {
    if let Err(e) = validate_password(password) {
        return LoginOutcome::Failed(e.to_string());
    }

    match client.login(password).await {
        Ok(grant) => {
            tracing::info!("Login accepted");
            LoginOutcome::Authenticated(grant)
        }
        Err(DashboardError::AccountLocked(message)) => {
            tracing::warn!("Login refused: account locked");
            LoginOutcome::Locked(message)
        }
        Err(DashboardError::LoginRejected {
            message,
            attempts_left,
        }) => {
            tracing::warn!(attempts_left = ?attempts_left, "Login rejected");
            LoginOutcome::Rejected {
                message,
                attempts_left,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Login request failed");
            LoginOutcome::Failed(format!("Error: {}", e))
        }
    }
}

/// Persist the session handed out by a successful login
pub fn establish_session(store: &mut SessionStore, grant: &LoginGrant) -> Result<()> {
    store.save(&grant.token, grant.expires_at)?;
    Ok(())
}

/// Tell the backend about a logout
///
/// The local session must already be cleared; a failure here is only logged.
pub async fn logout(client: &ApiClient, token: &str) {
    if let Err(e) = client.logout(token).await {
        tracing::warn!(error = %e, "Backend logout failed");
    }
}

/// Fetch the dashboard and decide what the UI should show
///
/// Every failure other than an expired session degrades to zeroed, online
/// stats so a client-side error never reads as the system being offline.
pub async fn sync_dashboard(client: &ApiClient, token: Option<&str>) -> SyncOutcome {
    let Some(token) = token else {
        return SyncOutcome::SessionExpired;
    };

    match client.get_dashboard(token).await {
        Ok(data) => {
            tracing::debug!(subscribers = data.subscribers.len(), "Dashboard synced");
            SyncOutcome::Loaded {
                subscribers: data.subscribers,
                stats: data.stats,
            }
        }
        Err(DashboardError::SessionExpired) => {
            tracing::warn!("Backend requires login");
            SyncOutcome::SessionExpired
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching dashboard data");
            let message = match &e {
                DashboardError::Rejected(message) => format!("Error: {}", message),
                DashboardError::Transport(_) => e.to_string(),
                other => format!("Connection error: {}", other),
            };
            SyncOutcome::Degraded { message }
        }
    }
}

/// Notification for a failed action
pub fn error_notice(err: &DashboardError) -> Notice {
    Notice::error(format!("Error: {}", err))
}

/// Add one subscriber
pub async fn add_subscriber(
    client: &ApiClient,
    token: &str,
    name: &str,
    email: &str,
) -> Result<Notice> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(DashboardError::Validation(
            "Name and email are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(DashboardError::Validation(format!(
            "Invalid email address: {}",
            email
        )));
    }

    let response = client.add_subscriber(token, name, email).await?;
    Ok(Notice::success(response.message.unwrap_or_else(|| {
        "Subscriber added successfully".to_string()
    })))
}

/// Send one composed email
pub async fn send_email(client: &ApiClient, token: &str, draft: &EmailDraft) -> Result<Notice> {
    if draft.to.trim().is_empty() || draft.subject.trim().is_empty() || draft.body.trim().is_empty()
    {
        return Err(DashboardError::Validation(
            "Recipient, subject and body are required".to_string(),
        ));
    }

    let response = client.send_email(token, draft).await?;
    Ok(Notice::success(
        response
            .message
            .unwrap_or_else(|| "Email sent successfully".to_string()),
    ))
}

/// Switch a subscriber's status (badge click)
pub async fn update_status(
    client: &ApiClient,
    token: &str,
    email: &str,
    status: SubscriberStatus,
) -> Result<Notice> {
    client.update_status(token, email, status).await?;
    Ok(Notice::success(format!(
        "Subscriber status changed to {}",
        status
    )))
}

/// Remove a single subscriber
pub async fn unsubscribe(client: &ApiClient, token: &str, email: &str) -> Result<Notice> {
    client.unsubscribe(token, email).await?;
    Ok(Notice::success("Subscriber removed"))
}

/// Load a subscriber's conversation thread
pub async fn load_conversation(
    client: &ApiClient,
    token: &str,
    email: &str,
) -> Result<Vec<ConversationMessage>> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DashboardError::Validation(
            "Enter an email address".to_string(),
        ));
    }
    client.get_conversation(token, email).await
}

/// Tally of a batch delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchDeleteReport {
    /// Subscribers the backend removed
    pub deleted: usize,
    /// Subscribers that failed (logical or transport errors)
    pub failed: usize,
}

impl BatchDeleteReport {
    /// Toast summarising the run
    pub fn summary(&self) -> Notice {
        if self.failed > 0 {
            Notice::warning(format!(
                "Deleted {} subscribers, {} errors occurred",
                self.deleted, self.failed
            ))
        } else {
            Notice::success(format!("Successfully deleted {} subscribers", self.deleted))
        }
    }
}

/// Delete the selected subscribers one request at a time
///
/// Requests are strictly sequential so the backend store never sees
/// concurrent writes from one batch. Failures are counted and skipped.
pub async fn batch_delete(client: &ApiClient, token: &str, emails: &[String]) -> BatchDeleteReport {
    let mut report = BatchDeleteReport::default();
    for email in emails {
        match client.unsubscribe(token, email).await {
            Ok(_) => report.deleted += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!(email = %email, error = %e, "Failed to delete subscriber");
            }
        }
    }
    tracing::info!(deleted = report.deleted, failed = report.failed, "Batch delete finished");
    report
}

/// Backend answer to an import batch
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Backend message
    pub message: String,
    /// Entries the backend reported as failed
    pub failed: Vec<ImportResult>,
}

impl ImportReport {
    /// Success toast, plus a warning when some entries failed
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = vec![Notice::success(self.message.clone())];
        if !self.failed.is_empty() {
            notices.push(Notice::warning(format!(
                "{} subscribers failed to import. Check the activity log for details.",
                self.failed.len()
            )));
        }
        notices
    }
}

/// Submit parsed entries as a single request
pub async fn submit_import(
    client: &ApiClient,
    token: &str,
    entries: &[ImportEntry],
) -> Result<ImportReport> {
    let response = client.import_subscribers(token, entries).await?;

    let failed: Vec<ImportResult> = response
        .results
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.success)
        .collect();
    for failure in &failed {
        tracing::warn!(
            email = failure.email.as_deref().unwrap_or("?"),
            reason = failure.reason().unwrap_or("unknown"),
            "Import failure"
        );
    }

    Ok(ImportReport {
        message: response
            .message
            .unwrap_or_else(|| "Import completed successfully".to_string()),
        failed,
    })
}
