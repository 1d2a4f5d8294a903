//! Client error taxonomy
//!
//! Four failure classes cross the client boundary: a non-2xx answer from
//! GitHub, a transport failure, a per-call deadline, and undecodable file
//! content. Aggregation layers decide per call site whether an error is fatal
//! or absorbed; the retry decorator consults [`ClientError::is_retryable`].

use http::StatusCode;
use thiserror::Error;

/// An error from the GitHub client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// GitHub answered with a non-success status.
    #[error("{operation} failed with status {status}: {message}")]
    Upstream {
        operation: String,
        status: StatusCode,
        message: String,
    },

    /// The request never produced an HTTP answer (DNS, TLS, connection...).
    #[error("{operation} failed: {message}")]
    Network { operation: String, message: String },

    /// The per-call deadline elapsed.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// File content was not valid base64 or not valid UTF-8.
    #[error("could not decode content of {filename}: {reason}")]
    Decode { filename: String, reason: String },
}

impl ClientError {
    /// The upstream HTTP status, when there was one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying could plausibly help.
    ///
    /// Server-side errors (5xx), rate limiting (429), transport failures and
    /// timeouts are transient; client errors (4xx) and decode failures are
    /// not and must never be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Upstream { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ClientError::Network { .. } | ClientError::Timeout { .. } => true,
            ClientError::Decode { .. } => false,
        }
    }
}

/// Map an octocrab error onto the taxonomy.
///
/// GitHub-level errors carry the upstream status and message; everything that
/// failed below HTTP becomes [`ClientError::Network`].
pub(crate) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> ClientError {
    match error {
        octocrab::Error::GitHub { source, .. } => ClientError::Upstream {
            operation: operation.to_string(),
            status: source.status_code,
            message: source.message.clone(),
        },
        octocrab::Error::Http { .. }
        | octocrab::Error::Hyper { .. }
        | octocrab::Error::Service { .. } => ClientError::Network {
            operation: operation.to_string(),
            message: error.to_string(),
        },
        other => ClientError::Network {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}
