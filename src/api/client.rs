//! Backend API client
//!
//! Every call goes to one fixed endpoint and carries an `action`
//! discriminator. Reads are GET requests with query parameters, writes are
//! POST requests with a JSON body. Authenticated calls attach the shared API
//! key and the session token.

use crate::api::models::{
    ActionResponse, ConversationMessage, ConversationResponse, DashboardResponse, EmailDraft,
    ImportEntry, LoginResponse, Stats, Subscriber, SubscriberStatus,
};
use crate::config::ApiConfig;
use crate::error::{DashboardError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Credentials handed out by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Opaque session token
    pub token: String,
    /// Expiry in epoch milliseconds
    pub expires_at: i64,
}

/// Payload of a successful dashboard fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardData {
    /// Full subscriber list (replaces the cached copy)
    pub subscribers: Vec<Subscriber>,
    /// Aggregate counters
    pub stats: Stats,
}

/// JSON body for POST actions: the envelope plus action-specific fields
#[derive(Serialize)]
struct ActionRequest<'a, F: Serialize> {
    action: &'a str,
    key: &'a str,
    token: &'a str,
    #[serde(flatten)]
    fields: F,
}

#[derive(Serialize)]
struct AddSubscriberFields<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct UpdateStatusFields<'a> {
    email: &'a str,
    status: SubscriberStatus,
}

#[derive(Serialize)]
struct ImportFields<'a> {
    subscribers: &'a [ImportEntry],
}

/// HTTP client for the dashboard backend
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted and
/// shares its connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Build a client for the configured endpoint
    ///
    /// # Errors
    /// * Returns `DashboardError::Transport` if the HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The backend endpoint, shown on the API info page
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange the dashboard password for a session token
    ///
    /// # Errors
    /// * `AccountLocked` when the backend reports a lockout
    /// * `LoginRejected` for a wrong password (with remaining attempts if known)
    /// * `InvalidResponse` when a success carries no token or expiry
    pub async fn login(&self, password: &str) -> Result<LoginGrant> {
        let response: LoginResponse = self
            .get("login", &[("password", password)])
            .await?;

        if response.locked {
            return Err(DashboardError::AccountLocked(
                response
                    .message
                    .unwrap_or_else(|| "Account locked".to_string()),
            ));
        }

        if !response.success {
            return Err(DashboardError::LoginRejected {
                message: response
                    .message
                    .unwrap_or_else(|| "Login failed".to_string()),
                attempts_left: response.attempts_left,
            });
        }

        match (response.token, response.expires_at) {
            (Some(token), Some(expires_at)) if !token.is_empty() => {
                Ok(LoginGrant { token, expires_at })
            }
            _ => Err(DashboardError::InvalidResponse(
                "login succeeded without a token or expiry".to_string(),
            )),
        }
    }

    /// Tell the backend to invalidate a token
    pub async fn logout(&self, token: &str) -> Result<()> {
        tracing::debug!(action = "logout", "Calling backend");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("action", "logout"), ("token", token)])
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    /// Fetch the subscriber list and aggregate stats
    ///
    /// Missing `data` or `stats` blocks are read as an empty list and the
    /// online/zero default respectively.
    ///
    /// # Errors
    /// * `SessionExpired` when the backend answers `requiresLogin`
    /// * `Rejected` when it answers `success: false`
    pub async fn get_dashboard(&self, token: &str) -> Result<DashboardData> {
        let response: DashboardResponse = self
            .get(
                "getDashboard",
                &[("key", self.api_key.as_str()), ("token", token)],
            )
            .await?;

        if response.requires_login {
            return Err(DashboardError::SessionExpired);
        }
        if response.success == Some(false) {
            return Err(DashboardError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "Failed to load dashboard".to_string()),
            ));
        }

        Ok(DashboardData {
            subscribers: response.data.unwrap_or_default(),
            stats: response.stats.unwrap_or_default(),
        })
    }

    /// Load the email thread exchanged with one subscriber
    pub async fn get_conversation(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Vec<ConversationMessage>> {
        let response: ConversationResponse = self
            .get(
                "getConversation",
                &[("email", email), ("token", token), ("key", self.api_key.as_str())],
            )
            .await?;

        if response.requires_login {
            return Err(DashboardError::SessionExpired);
        }
        if !response.success {
            return Err(DashboardError::Rejected(response.message.unwrap_or_else(
                || "Failed to load conversation history".to_string(),
            )));
        }
        Ok(response.history.unwrap_or_default())
    }

    /// Remove a subscriber
    pub async fn unsubscribe(&self, token: &str, email: &str) -> Result<ActionResponse> {
        let response: ActionResponse = self
            .get(
                "unsubscribe",
                &[("email", email), ("token", token), ("key", self.api_key.as_str())],
            )
            .await?;
        ensure_success(response, "Failed to remove subscriber")
    }

    /// Add a single subscriber
    pub async fn add_subscriber(
        &self,
        token: &str,
        name: &str,
        email: &str,
    ) -> Result<ActionResponse> {
        let response = self
            .post("addSubscriber", token, AddSubscriberFields { name, email })
            .await?;
        ensure_success(response, "Failed to add subscriber")
    }

    /// Send one email through the backend
    pub async fn send_email(&self, token: &str, draft: &EmailDraft) -> Result<ActionResponse> {
        let response = self.post("sendEmail", token, draft).await?;
        ensure_success(response, "Failed to send email")
    }

    /// Change a subscriber's status
    pub async fn update_status(
        &self,
        token: &str,
        email: &str,
        status: SubscriberStatus,
    ) -> Result<ActionResponse> {
        let response = self
            .post("updateStatus", token, UpdateStatusFields { email, status })
            .await?;
        ensure_success(response, "Failed to update status")
    }

    /// Submit a whole import batch in one request
    pub async fn import_subscribers(
        &self,
        token: &str,
        subscribers: &[ImportEntry],
    ) -> Result<ActionResponse> {
        let response = self
            .post("importSubscribers", token, ImportFields { subscribers })
            .await?;
        ensure_success(response, "Import failed")
    }

    async fn get<T: DeserializeOwned>(&self, action: &str, params: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(action = %action, "Calling backend");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("action", action)])
            .query(params)
            .send()
            .await?;
        parse_json(response).await
    }

    async fn post<T: DeserializeOwned, F: Serialize>(
        &self,
        action: &str,
        token: &str,
        fields: F,
    ) -> Result<T> {
        tracing::debug!(action = %action, "Calling backend");
        let body = ActionRequest {
            action,
            key: &self.api_key,
            token,
            fields,
        };
        let response = self.http.post(&self.base_url).json(&body).send().await?;
        parse_json(response).await
    }
}

/// Turn `requiresLogin` and `success: false` into errors
fn ensure_success(response: ActionResponse, fallback: &str) -> Result<ActionResponse> {
    if response.requires_login {
        return Err(DashboardError::SessionExpired);
    }
    if !response.success {
        return Err(DashboardError::Rejected(
            response.message.unwrap_or_else(|| fallback.to_string()),
        ));
    }
    Ok(response)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body
    };
    tracing::error!(
        status_code = status.as_u16(),
        error_body = %message,
        "Backend returned error status"
    );
    Err(DashboardError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        DashboardError::InvalidResponse(format!("{} - Response body: {}", e, body))
    })
}
