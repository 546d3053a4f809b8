//! Gateway to the movie API.
//!
//! [`ApiClient`] is the single point of contact with the remote service. It
//! attaches the bearer token from the [`SessionStore`], normalizes response
//! bodies, funnels every failure through one logging handler, and keeps the
//! cached user (and its subscribers) current after mutations.
//!
//! Routes:
//! - POST /users - Register
//! - POST /login - Log in, returns `{token, user}`
//! - GET /movies, GET /movies/{id}
//! - GET /movies/genre/{name}, GET /movies/director/{name}
//! - GET|PUT|DELETE /users/{username}
//! - POST|DELETE /users/{username}/movies/{movieId}

mod error;


use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::{
    Credentials, Director, Genre, LoginResponse, Movie, ProfileUpdate, RegistrationDetails,
    UserRecord,
};
use crate::notify::UserNotifier;
use crate::session::SessionStore;

pub use error::ApiError;

/// What an authorized call does when no token is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTokenPolicy {
    /// Dispatch anyway with `Authorization: Bearer null` and let the server
    /// reject it.
    #[default]
    Send,
    /// Fail with [`ApiError::MissingToken`] before dispatch.
    Reject,
}

/// Whether a route needs the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    None,
    Bearer,
}

/// Client for the movie API.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    notifier: UserNotifier,
    missing_token: MissingTokenPolicy,
}

impl ApiClient {
    /// Build a client from configuration, owning `session`.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Client)?;

        let notifier = UserNotifier::new(session.user());

        info!(base_url = %config.api_url, "Created movie API client");

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            notifier,
            missing_token: config.missing_token,
        })
    }

    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Subscribe to user changes. The receiver starts at the latest value.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.notifier.subscribe()
    }

    /// Last published user.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.notifier.current()
    }

    // === Accounts ===

    /// Register a new account. The raw response body is returned.
    pub async fn register(&self, details: &RegistrationDetails) -> Result<Value, ApiError> {
        debug!(username = %details.username, "Registering user");
        self.call("register", Method::POST, &["users"], Auth::None, Some(details))
            .await
    }

    /// Log in and persist the returned token and user.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        const OP: &str = "login";
        let body = self
            .call(OP, Method::POST, &["login"], Auth::None, Some(credentials))
            .await?;
        let response: LoginResponse = self.decode(OP, body)?;

        if let Some(token) = response.token.as_deref() {
            self.session.set_token(token).map_err(|e| self.fail(OP, e.into()))?;
            // The cached user must belong to the new token.
            let user = response.user.clone().map(UserRecord::scrubbed);
            let stored = match &user {
                Some(user) => self.session.set_user(user),
                None => {
                    warn!("Login response carried no user, cached user cleared");
                    self.session.clear_user()
                }
            };
            stored.map_err(|e| self.fail(OP, e.into()))?;
            self.notifier.publish(user);
            info!(username = %credentials.username, "Logged in");
        } else {
            warn!("Login response carried no token, session left untouched");
        }

        Ok(response)
    }

    /// Forget the local session and tell subscribers.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        self.notifier.publish(None);
        info!("Logged out");
        Ok(())
    }

    // === Catalog ===

    pub async fn get_all_movies(&self) -> Result<Vec<Movie>, ApiError> {
        self.get_typed("get_all_movies", &["movies"]).await
    }

    pub async fn get_movie(&self, movie_id: &str) -> Result<Movie, ApiError> {
        self.get_typed("get_movie", &["movies", movie_id]).await
    }

    pub async fn get_director(&self, name: &str) -> Result<Director, ApiError> {
        self.get_typed("get_director", &["movies", "director", name])
            .await
    }

    pub async fn get_genre(&self, name: &str) -> Result<Genre, ApiError> {
        self.get_typed("get_genre", &["movies", "genre", name]).await
    }

    // === Current user ===

    /// Fetch the user named in the cached session.
    ///
    /// With no cached user the username is empty and the request still goes
    /// out; the server decides.
    pub async fn get_current_user(&self) -> Result<UserRecord, ApiError> {
        let username = self.session.username();
        self.get_typed("get_current_user", &["users", username.as_str()])
            .await
    }

    /// Fetch the current user, cache it and publish it.
    pub async fn refresh_user(&self) -> Result<UserRecord, ApiError> {
        let user = self.get_current_user().await?.scrubbed();
        self.session
            .set_user(&user)
            .map_err(|e| self.fail("refresh_user", e.into()))?;
        self.notifier.publish(Some(user.clone()));
        Ok(user)
    }

    /// Favorite ids from the cached user. No network access.
    pub fn favorite_ids(&self) -> Vec<String> {
        self.session.favorite_ids()
    }

    pub async fn add_favorite(&self, movie_id: &str) -> Result<Value, ApiError> {
        let username = self.session.username();
        let ack = self
            .call(
                "add_favorite",
                Method::POST,
                &["users", username.as_str(), "movies", movie_id],
                Auth::Bearer,
                Some(&serde_json::json!({})),
            )
            .await?;
        self.refresh_after("add_favorite").await;
        Ok(ack)
    }

    pub async fn remove_favorite(&self, movie_id: &str) -> Result<Value, ApiError> {
        let username = self.session.username();
        let ack = self
            .call(
                "remove_favorite",
                Method::DELETE,
                &["users", username.as_str(), "movies", movie_id],
                Auth::Bearer,
                None::<&()>,
            )
            .await?;
        self.refresh_after("remove_favorite").await;
        Ok(ack)
    }

    /// Replace the profile. The returned record is cached before the refresh
    /// so a changed username is followed.
    pub async fn update_profile(&self, details: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        const OP: &str = "update_profile";
        let username = self.session.username();
        let body = self
            .call(OP, Method::PUT, &["users", username.as_str()], Auth::Bearer, Some(details))
            .await?;
        let updated: UserRecord = self.decode(OP, body)?;

        self.session
            .set_user(&updated.clone().scrubbed())
            .map_err(|e| self.fail(OP, e.into()))?;
        self.refresh_after(OP).await;
        Ok(updated)
    }

    /// Delete the account on the server. The local session is left for the
    /// caller to clear.
    pub async fn delete_account(&self) -> Result<Value, ApiError> {
        let username = self.session.username();
        self.call(
            "delete_account",
            Method::DELETE,
            &["users", username.as_str()],
            Auth::Bearer,
            None::<&()>,
        )
        .await
    }

    // === Plumbing ===

    /// Re-fetch and republish the user after a successful mutation.
    ///
    /// The mutation already happened server-side, so a failed refresh is
    /// logged rather than returned.
    async fn refresh_after(&self, operation: &'static str) {
        if let Err(e) = self.refresh_user().await {
            warn!(operation, error = %e, "User refresh after mutation failed");
        }
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &[&str],
    ) -> Result<T, ApiError> {
        let body = self
            .call(operation, Method::GET, path, Auth::Bearer, None::<&()>)
            .await?;
        self.decode(operation, body)
    }

    fn url(&self, path: &[&str]) -> String {
        let encoded: Vec<_> = path.iter().map(|s| urlencoding::encode(s)).collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }

    fn bearer(&self) -> Result<String, ApiError> {
        match self.session.token() {
            Some(token) => Ok(format!("Bearer {token}")),
            None => match self.missing_token {
                MissingTokenPolicy::Send => {
                    warn!("No session token stored, sending request unauthenticated");
                    Ok("Bearer null".to_string())
                }
                MissingTokenPolicy::Reject => Err(ApiError::MissingToken),
            },
        }
    }

    /// Send one request and return its normalized body.
    async fn call<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        method: Method,
        path: &[&str],
        auth: Auth,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);

        if auth == Auth::Bearer {
            let bearer = self.bearer().map_err(|e| self.fail(operation, e))?;
            request = request.header(AUTHORIZATION, bearer);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(operation, %method, %url, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| self.fail(operation, ApiError::Transport(e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.fail(operation, ApiError::Transport(e)))?;

        if !status.is_success() {
            return Err(self.fail(operation, ApiError::Server { status, body: text }));
        }

        debug!(operation, %status, bytes = text.len(), "Request succeeded");
        Ok(normalize_body(&text))
    }

    fn decode<T: DeserializeOwned>(&self, operation: &'static str, body: Value) -> Result<T, ApiError> {
        serde_json::from_value(body).map_err(|e| self.fail(operation, e.into()))
    }

    /// The single error funnel: log, then hand the error back.
    #[allow(clippy::unused_self)]
    fn fail(&self, operation: &'static str, err: ApiError) -> ApiError {
        match &err {
            ApiError::Server { status, body } => {
                error!(operation, status = status.as_u16(), body = %body, "Server returned an error");
            }
            other => {
                error!(operation, error = %other, "Client-side error occurred");
            }
        }
        err
    }
}

/// Empty and `null` bodies become `{}`; non-JSON text is kept as a string.
fn normalize_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    match serde_json::from_str(trimmed) {
        Ok(Value::Null) => Value::Object(serde_json::Map::new()),
        Ok(value) => value,
        Err(_) => Value::String(text.to_string()),
    }
}

/// Error message body as shown by the registration form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValidationBody {
    Errors { errors: Vec<ValidationItem> },
    Message { message: String },
}

#[derive(Debug, Deserialize)]
struct ValidationItem {
    msg: String,
}

/// Best-effort human text from a server error body.
///
/// The API answers validation failures with `{"errors":[{"msg":..}]}` and
/// other failures with plain text.
pub fn server_error_detail(err: &ApiError) -> Option<String> {
    let ApiError::Server { body, .. } = err else {
        return None;
    };
    match serde_json::from_str::<ValidationBody>(body) {
        Ok(ValidationBody::Errors { errors }) => Some(
            errors
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Ok(ValidationBody::Message { message }) => Some(message),
        Err(_) => Some(body.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_normalize_body() {
        assert_eq!(normalize_body(""), serde_json::json!({}));
        assert_eq!(normalize_body("null"), serde_json::json!({}));
        assert_eq!(normalize_body(r#"{"a":1}"#), serde_json::json!({"a": 1}));
        assert_eq!(
            normalize_body("alice was deleted."),
            Value::String("alice was deleted.".to_string())
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let config = Config {
            api_url: "http://localhost:8080/".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, SessionStore::in_memory()).unwrap();
        assert_eq!(
            client.url(&["movies", "genre", "Science Fiction"]),
            "http://localhost:8080/movies/genre/Science%20Fiction"
        );
        assert_eq!(client.url(&["users", ""]), "http://localhost:8080/users/");
    }

    #[test]
    fn test_server_error_detail() {
        let validation = ApiError::Server {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"errors":[{"msg":"Username is required"},{"msg":"Email does not appear to be valid"}]}"#
                .to_string(),
        };
        assert_eq!(
            server_error_detail(&validation).as_deref(),
            Some("Username is required; Email does not appear to be valid")
        );

        let text = ApiError::Server {
            status: StatusCode::BAD_REQUEST,
            body: "alice already exists\n".to_string(),
        };
        assert_eq!(server_error_detail(&text).as_deref(), Some("alice already exists"));

        assert_eq!(server_error_detail(&ApiError::MissingToken), None);
    }

    #[test]
    fn test_missing_token_policy_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: MissingTokenPolicy,
        }
        let parsed: Wrapper = toml::from_str("policy = \"reject\"").unwrap();
        assert_eq!(parsed.policy, MissingTokenPolicy::Reject);
    }
}
