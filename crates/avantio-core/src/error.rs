// ── Core error types ──
//
// User-facing errors from avantio-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<avantio_api::Error>`
// impl translates transport-layer errors into the two outcomes the host
// platform distinguishes: "ask the user for credentials again" and
// "this refresh failed, try again on the next cycle".

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so the aggregator can retain the last failure for its
/// accessors while also returning it to the refresh caller.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The stored credentials no longer work; the host must re-prompt
    /// the user before any further refresh can succeed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The refresh failed for a reason the next scheduled attempt may
    /// resolve (transport problem, unexpected portal response).
    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },

    /// Invalid account configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the host should re-prompt for credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<avantio_api::Error> for CoreError {
    fn from(err: avantio_api::Error) -> Self {
        if err.is_auth_required() {
            CoreError::AuthenticationFailed {
                message: err.to_string(),
            }
        } else {
            CoreError::RefreshFailed {
                message: err.to_string(),
            }
        }
    }
}
