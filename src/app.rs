//! Dashboard controller
//!
//! [`DashboardApp`] owns every piece of state and drives the egui frame loop.
//! Network actions run on the tokio runtime and report back as [`AppEvent`]s
//! over a channel the UI thread drains at the start of every frame, so only
//! the UI thread ever touches [`AppState`].

use crate::actions::{self, BatchDeleteReport, ImportReport, LoginOutcome, Notice};
use crate::api::{ApiClient, ConversationMessage, EmailDraft};
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::state::{AppState, ConversationView, Section, SessionStore, SyncOutcome};
use crate::ui::{self, ActivityLog, Confirm, Forms, Toasts, UiCommand};
use crate::{export, import};
use eframe::egui;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

/// Shown whenever a session check fails
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

type ActionFuture = Pin<Box<dyn Future<Output = Result<Notice>> + Send>>;

/// Which follow-up a finished action needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Add-subscriber modal submit
    AddSubscriber,
    /// Compose form submit
    SendEmail,
    /// Badge click
    UpdateStatus,
    /// Single removal
    Unsubscribe,
}

impl ActionKind {
    /// Whether success should trigger a dashboard refresh
    fn refreshes(self) -> bool {
        !matches!(self, ActionKind::SendEmail)
    }
}

/// Result of a background task, applied on the UI thread
#[derive(Debug)]
pub enum AppEvent {
    /// Login request answered
    LoginFinished(LoginOutcome),
    /// Dashboard fetch answered
    Synced(SyncOutcome),
    /// Single-shot action answered
    ActionFinished {
        /// Which action
        kind: ActionKind,
        /// Notice on success
        result: Result<Notice>,
    },
    /// Conversation history answered
    ConversationLoaded {
        /// Whose thread
        email: String,
        /// Messages on success
        result: Result<Vec<ConversationMessage>>,
    },
    /// Batch delete loop finished
    BatchDeleted(BatchDeleteReport),
    /// Import batch answered
    ImportSubmitted(Result<ImportReport>),
}

/// Main application struct
/// Manages application state, background tasks and UI rendering
pub struct DashboardApp {
    state: AppState,
    forms: Forms,
    toasts: Toasts,
    log: ActivityLog,
    client: ApiClient,
    config: Config,
    runtime: Handle,
    ctx: egui::Context,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    last_sync: Option<Instant>,
}

impl DashboardApp {
    /// Create the controller
    ///
    /// # Errors
    /// * `DashboardError::Transport` if the HTTP client cannot be built
    pub fn new(config: Config, runtime: Handle) -> Result<Self> {
        let client = ApiClient::new(&config.api)?;
        let session = SessionStore::new(&config.persistence.data_dir);
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            state: AppState::new(session),
            forms: Forms::default(),
            toasts: Toasts::default(),
            log: ActivityLog::default(),
            client,
            config,
            runtime,
            ctx: egui::Context::default(),
            tx,
            rx,
            last_sync: None,
        })
    }

    /// Use the window's context so finished tasks wake the UI
    pub fn attach_context(&mut self, ctx: egui::Context) {
        self.ctx = ctx;
    }

    /// Resume a stored session, if any, and fetch the dashboard
    pub fn start(&mut self) {
        if self.state.session.is_valid() {
            tracing::info!("Resuming stored session");
            self.log.add_line("Session restored".to_string());
            self.start_sync();
        } else {
            tracing::info!("No valid session, showing login");
        }
    }

    /// Whether the main screen (rather than the login screen) is shown
    pub fn is_authenticated(&self) -> bool {
        self.state.session.is_authenticated()
    }

    /// Application state, read-only
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Form buffers, read-only
    pub fn forms(&self) -> &Forms {
        &self.forms
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = task.await;
            if tx.send(event).is_err() {
                tracing::debug!("UI closed before background task finished");
            }
            ctx.request_repaint();
        });
    }

    fn notify(&mut self, notice: Notice) {
        self.log.add_line(notice.message.clone());
        self.toasts.push(notice);
    }

    fn handle_error(&mut self, err: DashboardError) {
        if err.is_session_expired() {
            self.force_logout();
        } else {
            self.notify(actions::error_notice(&err));
        }
    }

    /// Token for an authenticated action, or a forced logout
    fn authorized_token(&mut self) -> Option<String> {
        if self.state.session.is_valid() {
            if let Some(token) = self.state.session.token() {
                return Some(token.to_string());
            }
        }
        self.force_logout();
        None
    }

    fn force_logout(&mut self) {
        tracing::warn!("Session no longer valid, returning to login");
        self.end_session();
        self.notify(Notice::error(SESSION_EXPIRED_MESSAGE));
    }

    fn end_session(&mut self) {
        self.state.session.clear();
        self.state.reset_after_logout();
        self.forms.reset_login();
        self.forms.close_modals();
        self.forms.adding = false;
        self.forms.sending = false;
        self.forms.batch_deleting = false;
        self.last_sync = None;
    }

    /// Kick off a dashboard fetch
    fn start_sync(&mut self) {
        let Some(token) = self.authorized_token() else {
            return;
        };
        self.state.is_loading = true;
        self.last_sync = Some(Instant::now());

        let client = self.client.clone();
        self.spawn(async move {
            AppEvent::Synced(actions::sync_dashboard(&client, Some(&token)).await)
        });
    }

    /// Whether the periodic re-sync is due
    pub fn sync_due(&self, now: Instant) -> bool {
        match self.last_sync {
            Some(at) => now.saturating_duration_since(at) >= self.config.sync.interval(),
            None => false,
        }
    }

    /// Pre-fill the compose form and switch to it
    pub fn quick_compose(&mut self, email: &str) {
        self.forms.compose.to = email.to_string();
        self.state.switch_section(Section::Compose);
    }

    /// Switch to the threads view and load the history
    pub fn open_thread(&mut self, email: &str) {
        self.state.switch_section(Section::Threads);
        self.handle_command(UiCommand::LoadConversation(email.to_string()));
    }

    fn run_action<F>(&mut self, kind: ActionKind, action: F)
    where
        F: FnOnce(ApiClient, String) -> ActionFuture,
    {
        let Some(token) = self.authorized_token() else {
            self.clear_in_flight(kind);
            return;
        };
        let task = action(self.client.clone(), token);
        self.spawn(async move {
            AppEvent::ActionFinished {
                kind,
                result: task.await,
            }
        });
    }

    fn clear_in_flight(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::AddSubscriber => self.forms.adding = false,
            ActionKind::SendEmail => self.forms.sending = false,
            ActionKind::UpdateStatus | ActionKind::Unsubscribe => {}
        }
    }

    /// Apply one UI command
    pub fn handle_command(&mut self, command: UiCommand) {
        tracing::debug!(command = ?command, "UI command");
        match command {
            UiCommand::Login => {
                if self.forms.login_in_flight || self.forms.login_locked {
                    return;
                }
                if let Err(e) = actions::validate_password(&self.forms.password) {
                    self.forms.login_error = Some(e.to_string());
                    return;
                }
                self.forms.login_in_flight = true;
                self.forms.login_error = None;
                let client = self.client.clone();
                let password = self.forms.password.clone();
                self.spawn(async move {
                    AppEvent::LoginFinished(actions::login(&client, &password).await)
                });
            }
            UiCommand::Logout => {
                let token = self.state.session.token().map(str::to_string);
                self.end_session();
                self.notify(Notice::success("Logged out successfully"));
                if let Some(token) = token {
                    let client = self.client.clone();
                    self.runtime
                        .spawn(async move { actions::logout(&client, &token).await });
                }
            }
            UiCommand::Sync => self.start_sync(),
            UiCommand::AddSubscriber => {
                if self.forms.adding {
                    return;
                }
                self.forms.adding = true;
                let name = self.forms.new_name.clone();
                let email = self.forms.new_email.clone();
                self.run_action(ActionKind::AddSubscriber, move |client, token| {
                    Box::pin(async move {
                        actions::add_subscriber(&client, &token, &name, &email).await
                    })
                });
            }
            UiCommand::SendEmail => {
                if self.forms.sending {
                    return;
                }
                self.forms.sending = true;
                let draft = self.forms.compose.clone();
                self.run_action(ActionKind::SendEmail, move |client, token| {
                    Box::pin(async move { actions::send_email(&client, &token, &draft).await })
                });
            }
            UiCommand::UpdateStatus { email, status } => {
                self.run_action(ActionKind::UpdateStatus, move |client, token| {
                    Box::pin(async move {
                        actions::update_status(&client, &token, &email, status).await
                    })
                });
            }
            UiCommand::Unsubscribe(email) => {
                self.run_action(ActionKind::Unsubscribe, move |client, token| {
                    Box::pin(async move { actions::unsubscribe(&client, &token, &email).await })
                });
            }
            UiCommand::LoadConversation(email) => {
                let Some(token) = self.authorized_token() else {
                    return;
                };
                self.forms.thread_email = email.clone();
                self.forms.loading_thread = true;
                let client = self.client.clone();
                self.spawn(async move {
                    let result = actions::load_conversation(&client, &token, &email).await;
                    AppEvent::ConversationLoaded { email, result }
                });
            }
            UiCommand::BatchDelete => {
                if self.forms.batch_deleting {
                    tracing::debug!("Batch delete already running");
                    return;
                }
                let emails: Vec<String> = self.state.ui.selected.iter().cloned().collect();
                if emails.is_empty() {
                    return;
                }
                let Some(token) = self.authorized_token() else {
                    return;
                };
                self.forms.batch_deleting = true;
                let client = self.client.clone();
                self.spawn(async move {
                    AppEvent::BatchDeleted(actions::batch_delete(&client, &token, &emails).await)
                });
            }
            UiCommand::ParseImport => {
                let path = self.forms.import_path.trim().to_string();
                match import::parse_file(Path::new(&path)) {
                    Ok(entries) => self.forms.confirm = Some(Confirm::Import(entries)),
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "Import file rejected");
                        self.notify(Notice::error(e.to_string()));
                    }
                }
            }
            UiCommand::SubmitImport(entries) => {
                let Some(token) = self.authorized_token() else {
                    return;
                };
                let client = self.client.clone();
                self.spawn(async move {
                    AppEvent::ImportSubmitted(
                        actions::submit_import(&client, &token, &entries).await,
                    )
                });
            }
            UiCommand::ExportCsv => {
                let date = chrono::Utc::now().date_naive();
                match export::write_csv(
                    &self.config.persistence.export_dir,
                    &self.state.subscribers,
                    date,
                ) {
                    Ok(path) => self.notify(Notice::success(format!(
                        "Exported {} subscribers to {}",
                        self.state.subscriber_count(),
                        path.display()
                    ))),
                    Err(e) => {
                        tracing::error!(error = %e, "Export failed");
                        self.notify(actions::error_notice(&e));
                    }
                }
            }
            UiCommand::QuickCompose(email) => self.quick_compose(&email),
            UiCommand::OpenThread(email) => self.open_thread(&email),
        }
    }

    /// Apply one background result
    pub fn handle_event(&mut self, event: AppEvent) {
        let event = match event {
            AppEvent::LoginFinished(outcome) => {
                self.finish_login(outcome);
                return;
            }
            other => other,
        };
        // Results that land after a logout belong to a dead session
        if !self.is_authenticated() {
            tracing::debug!(event = ?event, "Dropping result for ended session");
            return;
        }

        match event {
            AppEvent::LoginFinished(_) => {}
            AppEvent::Synced(outcome) => {
                if let SyncOutcome::Degraded { message } = &outcome {
                    self.notify(Notice::error(message.clone()));
                }
                if !self.state.apply_sync(outcome) {
                    self.force_logout();
                }
            }
            AppEvent::ActionFinished { kind, result } => {
                self.clear_in_flight(kind);
                match result {
                    Ok(notice) => {
                        self.notify(notice);
                        match kind {
                            ActionKind::AddSubscriber => self.forms.reset_add_modal(),
                            ActionKind::SendEmail => self.forms.compose = EmailDraft::default(),
                            ActionKind::UpdateStatus | ActionKind::Unsubscribe => {}
                        }
                        if kind.refreshes() {
                            self.start_sync();
                        }
                    }
                    Err(e) => self.handle_error(e),
                }
            }
            AppEvent::ConversationLoaded { email, result } => {
                self.forms.loading_thread = false;
                match result {
                    Ok(history) => {
                        self.state.conversation = Some(ConversationView { email, history });
                    }
                    Err(e) => {
                        self.state.conversation = Some(ConversationView {
                            email,
                            history: Vec::new(),
                        });
                        self.handle_error(e);
                    }
                }
            }
            AppEvent::BatchDeleted(report) => {
                self.forms.batch_deleting = false;
                self.state.ui.clear_selection();
                self.notify(report.summary());
                self.start_sync();
            }
            AppEvent::ImportSubmitted(result) => match result {
                Ok(report) => {
                    for failure in &report.failed {
                        self.log.add_line(format!(
                            "Import failed for {}: {}",
                            failure.email.as_deref().unwrap_or("?"),
                            failure.reason().unwrap_or("unknown error")
                        ));
                    }
                    for notice in report.notices() {
                        self.notify(notice);
                    }
                    self.forms.import_path.clear();
                    self.start_sync();
                }
                Err(e) => self.handle_error(e),
            },
        }
    }

    fn finish_login(&mut self, outcome: LoginOutcome) {
        self.forms.login_in_flight = false;
        match outcome {
            LoginOutcome::Authenticated(grant) => {
                if let Err(e) = actions::establish_session(&mut self.state.session, &grant) {
                    tracing::error!(error = %e, "Failed to persist session");
                    self.forms.login_error = Some(e.to_string());
                    return;
                }
                self.forms.reset_login();
                self.state.switch_section(Section::Dashboard);
                self.notify(Notice::success("Login successful"));
                self.start_sync();
            }
            LoginOutcome::Locked(message) => {
                self.forms.login_locked = true;
                self.forms.attempts_info = None;
                self.forms.login_error = Some(message);
            }
            LoginOutcome::Rejected {
                message,
                attempts_left,
            } => {
                self.forms.login_error = Some(message);
                self.forms.attempts_info =
                    attempts_left.map(|n| format!("Attempts remaining: {}", n));
            }
            LoginOutcome::Failed(message) => self.forms.login_error = Some(message),
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Cheap per-frame expiry check against the in-memory mirror
    fn session_lapsed(&self) -> bool {
        self.state
            .session
            .expires_at()
            .is_some_and(|expires_at| crate::state::session::now_millis() >= expires_at)
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        let commands = if self.is_authenticated() {
            if self.session_lapsed() {
                self.force_logout();
                Vec::new()
            } else {
                if !self.state.is_loading && self.sync_due(Instant::now()) {
                    tracing::debug!("Auto-sync");
                    self.start_sync();
                }
                // Keep frames ticking so auto-sync fires without input
                ctx.request_repaint_after(Duration::from_secs(1));
                ui::render_app_layout(
                    ctx,
                    &mut self.state,
                    &mut self.forms,
                    &mut self.log,
                    self.client.base_url(),
                )
            }
        } else {
            ui::render_login(ctx, &mut self.forms)
        };

        self.toasts.render(ctx);

        for command in commands {
            self.handle_command(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LoginGrant, Stats, Subscriber};
    use crate::config::{ApiConfig, PersistenceConfig, SyncConfig};
    use crate::state::session::now_millis;
    use tempfile::TempDir;

    struct Harness {
        app: DashboardApp,
        _runtime: tokio::runtime::Runtime,
        dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let config = Config {
            // Nothing listens on the discard port, so stray syncs fail fast
            api: ApiConfig::new("http://127.0.0.1:9/exec", "test-key"),
            sync: SyncConfig {
                auto_sync_interval_secs: 300,
            },
            persistence: PersistenceConfig {
                data_dir: dir.path().join("data"),
                export_dir: dir.path().join("exports"),
            },
        };
        let app = DashboardApp::new(config, runtime.handle().clone()).unwrap();
        Harness {
            app,
            _runtime: runtime,
            dir,
        }
    }

    fn log_in(app: &mut DashboardApp) {
        app.handle_event(AppEvent::LoginFinished(LoginOutcome::Authenticated(
            LoginGrant {
                token: "tok".to_string(),
                expires_at: now_millis() + 3_600_000,
            },
        )));
    }

    #[test]
    fn test_starts_on_login_screen() {
        let mut h = harness();
        h.app.start();
        assert!(!h.app.is_authenticated());
        assert!(!h.app.state().is_loading);
    }

    #[test]
    fn test_login_success_persists_session_and_syncs() {
        let mut h = harness();
        log_in(&mut h.app);

        assert!(h.app.is_authenticated());
        assert!(h.app.state().is_loading);
        assert!(h.dir.path().join("data/session.json").exists());
        assert!(h.app.forms().password.is_empty());
    }

    #[test]
    fn test_login_rejected_shows_attempts() {
        let mut h = harness();
        h.app.handle_event(AppEvent::LoginFinished(LoginOutcome::Rejected {
            message: "Invalid password".to_string(),
            attempts_left: Some(2),
        }));

        assert!(!h.app.is_authenticated());
        assert_eq!(h.app.forms().login_error.as_deref(), Some("Invalid password"));
        assert_eq!(
            h.app.forms().attempts_info.as_deref(),
            Some("Attempts remaining: 2")
        );
    }

    #[test]
    fn test_locked_account_blocks_login() {
        let mut h = harness();
        h.app.handle_event(AppEvent::LoginFinished(LoginOutcome::Locked(
            "Account locked".to_string(),
        )));
        assert!(h.app.forms().login_locked);

        h.app.handle_command(UiCommand::Login);
        assert!(!h.app.forms().login_in_flight);
    }

    #[test]
    fn test_empty_password_is_inline_error() {
        let mut h = harness();
        h.app.handle_command(UiCommand::Login);
        assert_eq!(
            h.app.forms().login_error.as_deref(),
            Some("Please enter password")
        );
        assert!(!h.app.forms().login_in_flight);
    }

    #[test]
    fn test_sync_results_replace_state() {
        let mut h = harness();
        log_in(&mut h.app);

        let stats = Stats {
            total: 1,
            active: 1,
            ..Default::default()
        };
        h.app.handle_event(AppEvent::Synced(SyncOutcome::Loaded {
            subscribers: vec![Subscriber::new("1", "Ann", "ann@x.com")],
            stats,
        }));
        assert_eq!(h.app.state().subscriber_count(), 1);
        assert!(!h.app.state().is_loading);

        h.app.handle_event(AppEvent::Synced(SyncOutcome::Degraded {
            message: "Connection error: refused".to_string(),
        }));
        assert_eq!(h.app.state().subscriber_count(), 0);
        assert_eq!(h.app.state().stats, Stats::default());
    }

    #[test]
    fn test_expired_sync_forces_logout() {
        let mut h = harness();
        log_in(&mut h.app);

        h.app.handle_event(AppEvent::Synced(SyncOutcome::SessionExpired));
        assert!(!h.app.is_authenticated());
        assert!(!h.dir.path().join("data/session.json").exists());
        assert_eq!(h.app.toasts.len(), 2);
    }

    #[test]
    fn test_action_session_error_forces_logout() {
        let mut h = harness();
        log_in(&mut h.app);

        h.app.handle_event(AppEvent::ActionFinished {
            kind: ActionKind::Unsubscribe,
            result: Err(DashboardError::SessionExpired),
        });
        assert!(!h.app.is_authenticated());
    }

    #[test]
    fn test_results_after_logout_are_dropped() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.handle_command(UiCommand::Logout);
        assert!(!h.app.is_authenticated());

        h.app.handle_event(AppEvent::Synced(SyncOutcome::Loaded {
            subscribers: vec![Subscriber::new("1", "Ann", "ann@x.com")],
            stats: Stats::default(),
        }));
        assert_eq!(h.app.state().subscriber_count(), 0);
    }

    #[test]
    fn test_quick_compose_and_open_thread() {
        let mut h = harness();
        log_in(&mut h.app);

        h.app.handle_command(UiCommand::QuickCompose("ann@x.com".to_string()));
        assert_eq!(h.app.state().ui.current_section, Section::Compose);
        assert_eq!(h.app.forms().compose.to, "ann@x.com");

        h.app.handle_command(UiCommand::OpenThread("bo@x.com".to_string()));
        assert_eq!(h.app.state().ui.current_section, Section::Threads);
        assert_eq!(h.app.forms().thread_email, "bo@x.com");
        assert!(h.app.forms().loading_thread);
    }

    #[test]
    fn test_failed_conversation_shows_empty_history() {
        let mut h = harness();
        log_in(&mut h.app);

        h.app.handle_event(AppEvent::ConversationLoaded {
            email: "ann@x.com".to_string(),
            result: Err(DashboardError::Rejected("No thread".to_string())),
        });
        let view = h.app.state().conversation.as_ref().unwrap();
        assert_eq!(view.email, "ann@x.com");
        assert!(view.history.is_empty());
        assert!(!h.app.forms().loading_thread);
    }

    #[test]
    fn test_batch_delete_clears_selection() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.state.ui.toggle_selection("a@x.com", true);

        h.app.handle_event(AppEvent::BatchDeleted(BatchDeleteReport {
            deleted: 1,
            failed: 0,
        }));
        assert_eq!(h.app.state().ui.selected_count(), 0);
    }

    #[test]
    fn test_batch_delete_with_failures_still_clears_selection() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.state.ui.toggle_selection("a@x.com", true);
        h.app.state.ui.toggle_selection("b@x.com", true);
        h.app.state.ui.toggle_selection("c@x.com", true);

        h.app.handle_event(AppEvent::BatchDeleted(BatchDeleteReport {
            deleted: 1,
            failed: 2,
        }));
        assert_eq!(h.app.state().ui.selected_count(), 0);
        assert_eq!(
            h.app.toasts.last(),
            Some(&Notice::warning("Deleted 1 subscribers, 2 errors occurred"))
        );
    }

    #[test]
    fn test_batch_delete_runs_once_at_a_time() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.state.ui.toggle_selection("a@x.com", true);
        h.app.state.ui.toggle_selection("b@x.com", true);

        h.app.handle_command(UiCommand::BatchDelete);
        assert!(h.app.forms().batch_deleting);
        let toasts_before = h.app.toasts.len();

        // A second confirm while the loop is running is ignored
        h.app.handle_command(UiCommand::BatchDelete);
        assert!(h.app.forms().batch_deleting);
        assert_eq!(h.app.toasts.len(), toasts_before);

        h.app.handle_event(AppEvent::BatchDeleted(BatchDeleteReport {
            deleted: 2,
            failed: 0,
        }));
        assert!(!h.app.forms().batch_deleting);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_batch_delete_sends_no_extra_requests() {
        let mut server = mockito::Server::new_async().await;
        let deletes = server
            .mock("GET", "/exec")
            .match_query(mockito::Matcher::UrlEncoded(
                "action".into(),
                "unsubscribe".into(),
            ))
            .with_body(r#"{"success": true}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let config = Config {
            api: ApiConfig::new(format!("{}/exec", server.url()), "k"),
            sync: SyncConfig {
                auto_sync_interval_secs: 300,
            },
            persistence: PersistenceConfig {
                data_dir: dir.path().join("data"),
                export_dir: dir.path().join("exports"),
            },
        };
        let mut app = DashboardApp::new(config, Handle::current()).unwrap();
        app.state
            .session
            .save("tok", now_millis() + 3_600_000)
            .unwrap();
        app.state.ui.toggle_selection("a@x.com", true);
        app.state.ui.toggle_selection("b@x.com", true);

        app.handle_command(UiCommand::BatchDelete);
        app.handle_command(UiCommand::BatchDelete);

        let mut report = None;
        for _ in 0..250 {
            match app.rx.try_recv() {
                Ok(AppEvent::BatchDeleted(done)) => {
                    report = Some(done);
                    break;
                }
                Ok(_) => {}
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        assert_eq!(report.map(|r| r.deleted), Some(2));
        deletes.assert_async().await;
    }

    #[test]
    fn test_add_subscriber_ignores_double_submit() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.forms.new_name = "Ann".to_string();
        h.app.forms.new_email = "ann@x.com".to_string();

        h.app.handle_command(UiCommand::AddSubscriber);
        assert!(h.app.forms().adding);
        h.app.handle_command(UiCommand::AddSubscriber);
        assert!(h.app.forms().adding);

        h.app.handle_event(AppEvent::ActionFinished {
            kind: ActionKind::AddSubscriber,
            result: Err(DashboardError::Rejected("Already exists".to_string())),
        });
        assert!(!h.app.forms().adding);
    }

    #[test]
    fn test_parse_import_opens_confirmation() {
        let mut h = harness();
        log_in(&mut h.app);
        let path = h.dir.path().join("subs.csv");
        std::fs::write(&path, "Name,Email\nAnn,ann@x.com\n").unwrap();
        h.app.forms.import_path = path.display().to_string();

        h.app.handle_command(UiCommand::ParseImport);
        match &h.app.forms().confirm {
            Some(Confirm::Import(entries)) => assert_eq!(entries.len(), 1),
            other => panic!("expected import confirmation, got {:?}", other),
        }
    }

    #[test]
    fn test_export_writes_file() {
        let mut h = harness();
        log_in(&mut h.app);
        h.app.state.subscribers = vec![Subscriber::new("1", "Ann", "ann@x.com")];

        h.app.handle_command(UiCommand::ExportCsv);
        let written: Vec<_> = std::fs::read_dir(h.dir.path().join("exports"))
            .unwrap()
            .collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_sync_due_after_interval() {
        let mut h = harness();
        assert!(!h.app.sync_due(Instant::now()));

        let start = Instant::now();
        h.app.last_sync = Some(start);
        assert!(!h.app.sync_due(start + Duration::from_secs(299)));
        assert!(h.app.sync_due(start + Duration::from_secs(300)));
    }
}
