// ── Account configuration ──
//
// Describes one portal account. Carries credential data and connection
// tuning, but never touches disk — the host platform collects the
// values (its own credential form, defaults, stored time zone) and
// hands a built `AccountConfig` in.

use std::time::Duration;

use chrono_tz::Tz;
use secrecy::SecretString;
use url::Url;

/// Configuration for one portal account.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Portal login (email address).
    pub username: String,
    /// Portal password.
    pub password: SecretString,
    /// Portal base URL.
    pub base_url: Url,
    /// Time zone used to pin check-in/check-out hours on event dates.
    pub timezone: Tz,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: SecretString::from(String::new()),
            base_url: "https://app.avantio.pro"
                .parse()
                .expect("default base URL is valid"),
            timezone: chrono_tz::UTC,
            timeout: Duration::from_secs(30),
        }
    }
}
