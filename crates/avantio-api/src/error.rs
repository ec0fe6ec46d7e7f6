use thiserror::Error;

/// Top-level error type for the `avantio-api` crate.
///
/// Distinguishes terminal authentication rejections from transient
/// session loss so callers can decide between re-prompting for
/// credentials and simply waiting for the next scheduled refresh.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The portal rejected the credentials (login landed back on the
    /// login module, or any request answered HTTP 403).
    #[error("Invalid credentials: login rejected by the portal")]
    InvalidCredentials,

    /// The session was logged out mid-sequence and the bounded
    /// re-login budget was exhausted.
    #[error("Re-authentication required: session expired after {attempts} re-login attempts")]
    AuthenticationRequired { attempts: u32 },

    // ── Page shape ───────────────────────────────────────────────────
    /// The portal returned a page we don't recognize (e.g. the login
    /// page no longer carries a `csrftoken` hidden field).
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// JSON decode failure, or the expected item array was missing or
    /// not an array at the configured dot-path.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-200 status that is not a 403 auth rejection.
    #[error("Unexpected response status: HTTP {status}")]
    UnexpectedStatus { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this failure means the stored credentials are
    /// no longer usable and the caller must obtain fresh ones.
    ///
    /// Covers both the hard rejection (`InvalidCredentials`) and the
    /// exhausted mid-sequence re-login budget (`AuthenticationRequired`);
    /// the two are surfaced identically to callers.
    pub fn is_auth_required(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::AuthenticationRequired { .. }
        )
    }

    /// Returns `true` if this is a transient transport failure that the
    /// caller's own refresh cadence may resolve.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::UnexpectedStatus { .. } => true,
            _ => false,
        }
    }
}
