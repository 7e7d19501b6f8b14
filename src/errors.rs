use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the store, the sync client and the HTTP surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Any storage operation failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Missing, malformed or expired session credential.
    #[error("Authentication failed: {reason}")]
    Auth {
        /// Why the credential was rejected
        reason: String,
    },

    /// A recognised command whose payload does not decode into its typed variant.
    #[error("Invalid command payload: {message}")]
    InvalidPayload {
        /// Decoder message
        message: String,
    },

    /// JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network failure talking to the remote store.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote store answered with a non-success status.
    #[error("Remote store responded {status}: {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Body of the error envelope
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the same request could ever succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the caller must re-authenticate before trying again.
    #[must_use]
    pub const fn requires_reauth(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Remote { status: 401, .. })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Auth { reason } => (StatusCode::UNAUTHORIZED, reason.clone()),
            Self::InvalidPayload { message } => (StatusCode::BAD_REQUEST, message.clone()),
            other => {
                tracing::error!("Request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_unauthorized() {
        let response = Error::Auth {
            reason: "missing token".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_database_error_maps_to_internal_error() {
        let response = Error::Database(sea_orm::DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_retry_classification() {
        assert!(
            Error::Remote {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !Error::Remote {
                status: 401,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            Error::Remote {
                status: 401,
                message: String::new()
            }
            .requires_reauth()
        );
    }
}
