//! Points Mall backend API client.
//!
//! # Architecture
//!
//! - Every request goes to `{base_url}{api_prefix}/{path}`
//! - The session token, when present, is sent as `Authorization: Bearer ...`
//! - Failures are shown to the user through a [`Notifier`](crate::notify::Notifier)
//!   *and* returned to the caller, so call sites can add local handling
//! - A 401 expires the token and sends the application to the login page
//!
//! # Example
//!
//! ```rust,ignore
//! use points_mall_client::api::ApiClient;
//!
//! let api = ApiClient::new(&config, session, notifier, router)?;
//!
//! let products: Vec<Product> = api.get("/products").await?;
//! let order: Order = api.post("/orders", &checkout).await?;
//! ```

mod client;
pub mod envelope;

pub use client::ApiClient;

use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request or the HTTP client could not be built.
    #[error("Request error: {0}")]
    Request(String),

    /// No response arrived: connection failure or timeout.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or(envelope::REQUEST_FAILED))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// The backend answered `"success": false`.
    #[error("Rejected: {message}")]
    Rejected { message: String },

    /// The body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the response, if one arrived.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 409,
            message: Some("Already redeemed".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 409: Already redeemed");

        let err = ApiError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP 502: Request failed");

        let err = ApiError::Rejected {
            message: "Not enough points".to_string(),
        };
        assert_eq!(err.to_string(), "Rejected: Not enough points");
    }

    #[test]
    fn test_api_error_status() {
        let err = ApiError::Status {
            status: 401,
            message: None,
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());

        let err = ApiError::Request("bad url".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
    }
}
