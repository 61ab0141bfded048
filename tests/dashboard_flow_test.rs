//! End-to-end tests driving the public API against a mock backend

use mockito::{Matcher, Server};
use subscriber_dashboard::actions::{self, LoginOutcome, NoticeLevel};
use subscriber_dashboard::api::{ApiClient, SubscriberStatus, SystemStatus};
use subscriber_dashboard::config::ApiConfig;
use subscriber_dashboard::state::{AppState, SessionStore, SyncOutcome};
use subscriber_dashboard::view::{self, SortColumn};
use subscriber_dashboard::{export, import};
use tempfile::TempDir;

const DASHBOARD_BODY: &str = r#"{
    "success": true,
    "data": [
        {"id": 1, "name": "Ann", "email": "ann@x.com", "status": "active",
         "date": "2024-01-02", "opens": 10, "clicks": 4},
        {"id": 2, "name": "Bo", "email": "bo@x.com", "status": "unsubscribed",
         "date": "", "opens": "3", "clicks": 0},
        {"id": 3, "name": "Cy", "email": "cy@x.com", "status": "ACTIVE", "opens": 7, "clicks": 7}
    ],
    "stats": {
        "total": 3, "active": 2, "totalOpens": 20, "totalClicks": 11,
        "remainingEmails": 15, "systemStatus": "ONLINE"
    }
}"#;

fn client(server: &Server) -> ApiClient {
    ApiClient::new(&ApiConfig::new(format!("{}/exec", server.url()), "secret")).unwrap()
}

#[tokio::test]
async fn test_login_sync_and_view() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/exec")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "login".into()),
            Matcher::UrlEncoded("password".into(), "hunter2".into()),
        ]))
        .with_body(r#"{"success": true, "token": "tok-1", "expiresAt": 4102444800000}"#)
        .create_async()
        .await;
    let dashboard = server
        .mock("GET", "/exec")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "getDashboard".into()),
            Matcher::UrlEncoded("key".into(), "secret".into()),
            Matcher::UrlEncoded("token".into(), "tok-1".into()),
        ]))
        .with_body(DASHBOARD_BODY)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let api = client(&server);
    let mut state = AppState::new(SessionStore::new(dir.path()));

    // Login and persist the session
    let grant = match actions::login(&api, "hunter2").await {
        LoginOutcome::Authenticated(grant) => grant,
        other => panic!("unexpected login outcome: {:?}", other),
    };
    actions::establish_session(&mut state.session, &grant).unwrap();
    assert!(state.session.is_authenticated());

    // A fresh store over the same directory resumes the session
    let mut resumed = SessionStore::new(dir.path());
    assert!(resumed.is_valid());
    assert_eq!(resumed.token(), Some("tok-1"));

    // Sync replaces state
    let outcome = actions::sync_dashboard(&api, state.session.token()).await;
    assert!(state.apply_sync(outcome));
    dashboard.assert_async().await;

    assert_eq!(state.subscriber_count(), 3);
    assert_eq!(state.stats.system_status, SystemStatus::Online);
    assert_eq!(state.subscribers[1].status, SubscriberStatus::Unsubscribed);
    assert_eq!(state.subscribers[1].opens, 3);
    assert_eq!(state.subscribers[1].date, None);
    assert_eq!(state.subscribers[2].status, SubscriberStatus::Active);

    // Quota: 15 of 100 remaining
    let usage = view::quota_usage(&state.stats);
    assert!((usage.percent_used - 85.0).abs() < 1e-9);
    assert_eq!(usage.level, view::QuotaLevel::Warning);

    // Sort by opens descending, then search
    state.ui.toggle_sort(SortColumn::Opens);
    let page = view::compute_visible_rows(&state.subscribers, &state.ui);
    let names: Vec<&str> = page.rows.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Cy", "Bo"]);
    assert!(!page.show_pagination());

    state.ui.set_search("CY@");
    let page = view::compute_visible_rows(&state.subscribers, &state.ui);
    assert_eq!(page.total_filtered, 1);
    assert_eq!(page.rows[0].email, "cy@x.com");
}

#[tokio::test]
async fn test_backend_requires_login_ends_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "getDashboard".into()))
        .with_body(r#"{"requiresLogin": true}"#)
        .create_async()
        .await;

    let outcome = actions::sync_dashboard(&client(&server), Some("stale")).await;
    assert_eq!(outcome, SyncOutcome::SessionExpired);

    let dir = TempDir::new().unwrap();
    let mut state = AppState::new(SessionStore::new(dir.path()));
    assert!(!state.apply_sync(outcome));
}

#[tokio::test]
async fn test_batch_delete_then_summary() {
    let mut server = Server::new_async().await;
    let deletes = server
        .mock("GET", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "unsubscribe".into()))
        .with_body(r#"{"success": true}"#)
        .expect(2)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let mut state = AppState::new(SessionStore::new(dir.path()));
    state.ui.toggle_selection("b@x.com", true);
    state.ui.toggle_selection("a@x.com", true);

    let emails: Vec<String> = state.ui.selected.iter().cloned().collect();
    let report = actions::batch_delete(&client(&server), "tok", &emails).await;
    deletes.assert_async().await;

    let notice = report.summary();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Successfully deleted 2 subscribers");
}

#[tokio::test]
async fn test_import_file_then_export() {
    let mut server = Server::new_async().await;
    let import_mock = server
        .mock("POST", "/exec")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "action": "importSubscribers",
            "key": "secret",
            "token": "tok",
            "subscribers": [
                {"name": "Ann", "email": "ann@x.com", "sendWelcome": false},
                {"name": "Bo", "email": "bo@x.com", "sendWelcome": false}
            ]
        })))
        .with_body(
            r#"{"success": true, "message": "Imported 1 of 2",
                "results": [
                    {"success": true, "email": "ann@x.com"},
                    {"success": false, "email": "bo@x.com", "error": "Duplicate"}
                ]}"#,
        )
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(
        &path,
        "Full Name,Email Address\n\"Ann\",\"ann@x.com\"\nBo,bo@x.com\n,nobody@x.com\n",
    )
    .unwrap();

    let entries = import::parse_file(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(import::confirmation_message(&entries).contains("Ann (ann@x.com)"));

    let report = actions::submit_import(&client(&server), "tok", &entries)
        .await
        .unwrap();
    import_mock.assert_async().await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].reason(), Some("Duplicate"));

    let notices = report.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[1].level, NoticeLevel::Warning);

    // Export what a sync would have cached
    let subscribers = vec![subscriber_dashboard::api::Subscriber::new("1", "Ann", "ann@x.com")];
    let date = chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let written = export::write_csv(dir.path(), &subscribers, date).unwrap();
    assert!(written.ends_with("subscribers_2024-05-06.csv"));
    let csv = std::fs::read_to_string(written).unwrap();
    assert_eq!(csv.lines().count(), 2);
}
