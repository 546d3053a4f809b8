//! Gateway error type.

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::StoreError;

/// Every failure a gateway call can produce.
///
/// The UI only shows [`ApiError::user_message`]; the variants keep enough
/// detail (status, body) for logging and for callers that want to branch.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, DNS, timeout).
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Server { status: StatusCode, body: String },

    /// A 2xx body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An authorized call was attempted with no stored token and the
    /// configured policy rejects such calls.
    #[error("no session token, log in first")]
    MissingToken,

    /// The session could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be constructed from the configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// The one message shown to users for any failed call.
    pub const GENERIC_MESSAGE: &'static str = "Something bad happened; please try again later.";

    pub const fn user_message(&self) -> &'static str {
        Self::GENERIC_MESSAGE
    }

    /// HTTP status of a server-side failure.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED) || matches!(self, Self::MissingToken)
    }

    /// Client-side failures, as opposed to an answer from the server.
    pub const fn is_client_side(&self) -> bool {
        !matches!(self, Self::Server { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_keeps_status() {
        let err = ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            body: "Unauthorized".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_unauthorized());
        assert!(!err.is_client_side());
        assert_eq!(err.user_message(), ApiError::GENERIC_MESSAGE);
        assert_eq!(err.to_string(), "server returned 401 Unauthorized: Unauthorized");
    }

    #[test]
    fn test_missing_token_is_client_side() {
        let err = ApiError::MissingToken;
        assert_eq!(err.status(), None);
        assert!(err.is_unauthorized());
        assert!(err.is_client_side());
        assert_eq!(err.user_message(), ApiError::GENERIC_MESSAGE);
    }
}
