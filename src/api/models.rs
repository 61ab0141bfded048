//! Wire types exchanged with the backend
//!
//! The backend is loosely typed: counters sometimes arrive as strings,
//! subscriber ids may be numbers, and optional blocks are simply left out.
//! Deserialization here absorbs those differences so the rest of the crate
//! works with plain Rust types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Subscription state of a recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    /// Receives campaign emails
    Active,
    /// Opted out (also used for any status string the client does not know)
    #[default]
    Unsubscribed,
}

impl SubscriberStatus {
    /// The status a badge click switches to
    pub fn toggled(self) -> Self {
        match self {
            SubscriberStatus::Active => SubscriberStatus::Unsubscribed,
            SubscriberStatus::Unsubscribed => SubscriberStatus::Active,
        }
    }

    /// Wire name sent to the backend
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriberStatus::Active => "active",
            SubscriberStatus::Unsubscribed => "unsubscribed",
        }
    }
}

impl std::fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubscriberStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw.as_str().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("active") => SubscriberStatus::Active,
            _ => SubscriberStatus::Unsubscribed,
        })
    }
}

/// A recipient record tracked by the backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscriber {
    /// Backend row identifier (numbers are stringified)
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Email address, the key used by every per-subscriber action
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    /// Subscription state
    #[serde(default)]
    pub status: SubscriberStatus,
    /// Join date as reported by the backend
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    /// Number of tracked opens
    #[serde(default, deserialize_with = "lenient::count")]
    pub opens: u64,
    /// Number of tracked clicks
    #[serde(default, deserialize_with = "lenient::count")]
    pub clicks: u64,
}

impl Subscriber {
    /// Build a subscriber with zeroed counters
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            status: SubscriberStatus::Active,
            date: None,
            opens: 0,
            clicks: 0,
        }
    }
}

/// Backend health flag shown in the top bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemStatus {
    /// Backend reports normal operation
    #[default]
    Online,
    /// Backend reports it cannot send
    Offline,
}

impl<'de> Deserialize<'de> for SystemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            Some("ONLINE") => SystemStatus::Online,
            _ => SystemStatus::Offline,
        })
    }
}

fn missing_system_status() -> SystemStatus {
    SystemStatus::Offline
}

/// Aggregate counters for the dashboard cards
///
/// `Default` is the safe fallback used whenever a sync fails: all zero and
/// online.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Total subscribers
    #[serde(default, deserialize_with = "lenient::count")]
    pub total: u64,
    /// Active subscribers
    #[serde(default, deserialize_with = "lenient::count")]
    pub active: u64,
    /// Sum of opens across subscribers
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_opens: u64,
    /// Sum of clicks across subscribers
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_clicks: u64,
    /// Remaining sendable emails in the current quota window
    #[serde(default, deserialize_with = "lenient::count")]
    pub remaining_emails: u64,
    /// Backend health flag
    #[serde(default = "missing_system_status")]
    pub system_status: SystemStatus,
}

/// Response to `action=login`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Whether the password was accepted
    #[serde(default)]
    pub success: bool,
    /// Opaque session token
    #[serde(default)]
    pub token: Option<String>,
    /// Session expiry in epoch milliseconds
    #[serde(default, deserialize_with = "lenient::opt_millis")]
    pub expires_at: Option<i64>,
    /// Set when too many attempts locked the account
    #[serde(default)]
    pub locked: bool,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Remaining attempts before lockout
    #[serde(default, deserialize_with = "lenient::opt_count")]
    pub attempts_left: Option<u32>,
}

/// Response to `action=getDashboard`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// `Some(false)` signals a logical failure; absent means success
    #[serde(default)]
    pub success: Option<bool>,
    /// Subscriber rows
    #[serde(default)]
    pub data: Option<Vec<Subscriber>>,
    /// Aggregate counters
    #[serde(default)]
    pub stats: Option<Stats>,
    /// Set when the token is no longer accepted
    #[serde(default)]
    pub requires_login: bool,
    /// Failure message
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-item outcome reported by `importSubscribers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResult {
    /// Whether this entry was stored
    #[serde(default)]
    pub success: bool,
    /// Entry the result refers to
    #[serde(default)]
    pub email: Option<String>,
    /// Message attached to the entry
    #[serde(default)]
    pub message: Option<String>,
    /// Failure reason
    #[serde(default)]
    pub error: Option<String>,
}

impl ImportResult {
    /// Why the entry failed: `error` first, then `message`
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Generic response to write actions
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    /// Whether the action succeeded
    #[serde(default)]
    pub success: bool,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Per-item results for batch imports
    #[serde(default)]
    pub results: Option<Vec<ImportResult>>,
    /// Set when the token is no longer accepted
    #[serde(default)]
    pub requires_login: bool,
}

/// One message in a subscriber's conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversationMessage {
    /// Sender address or name
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    /// Subject line
    #[serde(default, deserialize_with = "lenient::string")]
    pub subject: String,
    /// Plain-text body
    #[serde(default, deserialize_with = "lenient::string")]
    pub body: String,
    /// Send time
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response to `action=getConversation`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    /// Whether the history could be loaded
    #[serde(default)]
    pub success: bool,
    /// Messages, oldest first as delivered by the backend
    #[serde(default)]
    pub history: Option<Vec<ConversationMessage>>,
    /// Failure message
    #[serde(default)]
    pub message: Option<String>,
    /// Set when the token is no longer accepted
    #[serde(default)]
    pub requires_login: bool,
}

/// Subscriber entry submitted by a bulk import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntry {
    /// Display name (`Unknown` when the source had none)
    pub name: String,
    /// Email address
    pub email: String,
    /// Imported subscribers never receive the welcome email
    pub send_welcome: bool,
}

impl ImportEntry {
    /// Build an entry with the welcome email disabled
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            send_welcome: false,
        }
    }
}

/// Outgoing email composed in the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Display name of the sender
    pub sender_name: String,
}

/// Lenient field deserializers mirroring how the backend's JSON is consumed
mod lenient {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value_to_string(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    fn value_to_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(value_to_string(Value::deserialize(deserializer)?))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let s = value_to_string(Value::deserialize(deserializer)?);
        Ok(if s.is_empty() { None } else { Some(s) })
    }

    /// Non-negative counter; anything unparseable counts as zero
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value_to_f64(&value) {
            Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
            _ => 0,
        })
    }

    pub fn opt_count<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value_to_f64(&value) {
            Some(n) if n.is_finite() && n >= 0.0 => u32::try_from(n.trunc() as u64).ok(),
            _ => None,
        })
    }

    fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(ms) = s.parse::<i64>() {
                    return Utc.timestamp_millis_opt(ms).single();
                }
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            _ => None,
        }
    }

    pub fn opt_datetime<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(parse_datetime(&Value::deserialize(deserializer)?))
    }

    pub fn opt_millis<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Ok(parse_datetime(&Value::deserialize(deserializer)?).map(|dt| dt.timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_lenient_fields() {
        let json = r#"{"id": 7, "name": "Ada", "email": "ada@x.com",
                       "status": "active", "date": "", "opens": "12", "clicks": 3.0}"#;
        let sub: Subscriber = serde_json::from_str(json).unwrap();
        assert_eq!(sub.id, "7");
        assert_eq!(sub.status, SubscriberStatus::Active);
        assert_eq!(sub.date, None);
        assert_eq!(sub.opens, 12);
        assert_eq!(sub.clicks, 3);
    }

    #[test]
    fn test_subscriber_garbage_counters_are_zero() {
        let json = r#"{"email": "b@x.com", "status": "bounced", "opens": "n/a", "clicks": -4}"#;
        let sub: Subscriber = serde_json::from_str(json).unwrap();
        assert_eq!(sub.name, "");
        assert_eq!(sub.status, SubscriberStatus::Unsubscribed);
        assert_eq!(sub.opens, 0);
        assert_eq!(sub.clicks, 0);
    }

    #[test]
    fn test_non_string_status_falls_back() {
        let json = r#"{"success": true, "data": [
            {"email": "a@x.com", "status": 1},
            {"email": "b@x.com", "status": true},
            {"email": "c@x.com", "status": "Active"}
        ], "stats": {"systemStatus": 0}}"#;
        let response: DashboardResponse = serde_json::from_str(json).unwrap();
        let data = response.data.unwrap();
        assert_eq!(data[0].status, SubscriberStatus::Unsubscribed);
        assert_eq!(data[1].status, SubscriberStatus::Unsubscribed);
        assert_eq!(data[2].status, SubscriberStatus::Active);
        assert_eq!(response.stats.unwrap().system_status, SystemStatus::Offline);
    }

    #[test]
    fn test_import_result_with_message_and_error() {
        let both: ImportResult = serde_json::from_str(
            r#"{"success": false, "email": "a@x.com", "message": "Duplicate", "error": "exists"}"#,
        )
        .unwrap();
        assert_eq!(both.reason(), Some("exists"));

        let message_only: ImportResult =
            serde_json::from_str(r#"{"success": false, "message": "Duplicate"}"#).unwrap();
        assert_eq!(message_only.reason(), Some("Duplicate"));
        assert_eq!(ImportResult::default().reason(), None);
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(SubscriberStatus::Active.toggled(), SubscriberStatus::Unsubscribed);
        assert_eq!(SubscriberStatus::Unsubscribed.toggled(), SubscriberStatus::Active);
        assert_eq!(SubscriberStatus::Unsubscribed.as_str(), "unsubscribed");
    }

    #[test]
    fn test_stats_default_is_online_and_zero() {
        let stats = Stats::default();
        assert_eq!(stats.system_status, SystemStatus::Online);
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn test_stats_system_status_must_be_online_literal() {
        let stats: Stats =
            serde_json::from_str(r#"{"total": 4, "systemStatus": "ONLINE"}"#).unwrap();
        assert_eq!(stats.system_status, SystemStatus::Online);
        assert_eq!(stats.total, 4);

        let stats: Stats = serde_json::from_str(r#"{"systemStatus": "OFFLINE"}"#).unwrap();
        assert_eq!(stats.system_status, SystemStatus::Offline);

        let stats: Stats = serde_json::from_str(r#"{"total": 1}"#).unwrap();
        assert_eq!(stats.system_status, SystemStatus::Offline);
    }

    #[test]
    fn test_login_response_variants() {
        let ok: LoginResponse =
            serde_json::from_str(r#"{"success": true, "token": "t", "expiresAt": 1700000000000}"#)
                .unwrap();
        assert!(ok.success);
        assert_eq!(ok.expires_at, Some(1_700_000_000_000));

        let iso: LoginResponse = serde_json::from_str(
            r#"{"success": true, "token": "t", "expiresAt": "2023-11-14T22:13:20Z"}"#,
        )
        .unwrap();
        assert_eq!(iso.expires_at, Some(1_700_000_000_000));

        let bad: LoginResponse =
            serde_json::from_str(r#"{"success": false, "message": "Wrong", "attemptsLeft": "2"}"#)
                .unwrap();
        assert_eq!(bad.attempts_left, Some(2));
        assert!(!bad.locked);
    }

    #[test]
    fn test_conversation_timestamp_forms() {
        let json = r#"{"success": true, "history": [
            {"from": "a@x.com", "subject": "Hi", "body": "Hello", "timestamp": 1700000000000},
            {"from": "b@x.com", "subject": "Re", "body": "Yo", "timestamp": "2023-11-14T22:13:20Z"},
            {"from": "c@x.com", "subject": "?", "body": "", "timestamp": "yesterday"}
        ]}"#;
        let resp: ConversationResponse = serde_json::from_str(json).unwrap();
        let history = resp.history.unwrap();
        assert_eq!(history[0].timestamp, history[1].timestamp);
        assert!(history[0].timestamp.is_some());
        assert!(history[2].timestamp.is_none());
    }

    #[test]
    fn test_request_field_names() {
        let entry = serde_json::to_value(ImportEntry::new("A", "a@x.com")).unwrap();
        assert_eq!(entry["sendWelcome"], serde_json::json!(false));

        let draft = EmailDraft {
            sender_name: "Team".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(draft).unwrap();
        assert_eq!(value["senderName"], "Team");
    }
}
