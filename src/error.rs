//! Error types.

use thiserror::Error;

/// Result alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors returned by the sync pipeline. Every variant is terminal for a run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required settings are missing or invalid. Raised before any network call.
    #[error("config error: {0}")]
    Config(String),

    /// The client-credentials token exchange failed.
    #[error("auth error: {message}")]
    Auth {
        /// Human-readable cause.
        message: String,
        /// Whether the request hit the configured timeout.
        timed_out: bool,
    },

    /// The device listing failed.
    #[error("fetch error: {message}")]
    Fetch {
        /// Human-readable cause.
        message: String,
        /// Whether the request hit the configured timeout.
        timed_out: bool,
    },

    /// Creating the output directory or writing the hosts file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            timed_out: false,
        }
    }

    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Returns `true` if a network step failed because it ran out of time.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Auth {
                timed_out: true,
                ..
            } | Self::Fetch {
                timed_out: true,
                ..
            }
        )
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Auth { .. } | Self::Fetch { .. } | Self::Io(_) => 1,
        }
    }
}
