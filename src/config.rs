//! Environment configuration for the server binary.
//!
//! The server refuses to start when a required value is missing, naming the
//! variable instead of failing somewhere deep inside a request handler.

use std::{env, fmt::Display};

/// The environment variable holding the secret used to sign auth cookies.
pub const SECRET_VAR: &str = "KHARCHA_SECRET";
/// The environment variable holding the canonical local timezone name.
pub const TIMEZONE_VAR: &str = "KHARCHA_TIMEZONE";

/// A required configuration value was missing or empty.
#[derive(Debug, PartialEq, Eq)]
pub struct MissingConfig(pub &'static str);

impl Display for MissingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "the environment variable '{}' must be set, the server is not configured",
            self.0
        )
    }
}

/// Configuration values read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// The secret used to derive the cookie signing key.
    pub cookie_secret: String,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kathmandu".
    pub local_timezone: String,
}

impl Config {
    /// Read the configuration from the environment.
    ///
    /// The timezone defaults to "Asia/Kathmandu" when unset since that is
    /// where the Bikram Sambat calendar is in civil use.
    ///
    /// # Errors
    /// Returns a [MissingConfig] naming the missing variable if a required
    /// value is absent or empty.
    pub fn from_env() -> Result<Self, MissingConfig> {
        let cookie_secret = match env::var(SECRET_VAR) {
            Ok(secret) if !secret.is_empty() => secret,
            _ => return Err(MissingConfig(SECRET_VAR)),
        };

        let local_timezone = env::var(TIMEZONE_VAR)
            .ok()
            .filter(|timezone| !timezone.is_empty())
            .unwrap_or_else(|| "Asia/Kathmandu".to_owned());

        Ok(Self {
            cookie_secret,
            local_timezone,
        })
    }
}

#[cfg(test)]
mod config_tests {
    use super::{Config, MissingConfig, SECRET_VAR};

    #[test]
    fn missing_secret_names_the_variable() {
        // Environment variables are process-wide, so only assert on the
        // error message rather than mutating the environment.
        let error = MissingConfig(SECRET_VAR);

        assert!(error.to_string().contains(SECRET_VAR));
        assert!(error.to_string().contains("not configured"));
    }

    #[test]
    fn config_holds_values() {
        let config = Config {
            cookie_secret: "foobar".to_owned(),
            local_timezone: "Etc/UTC".to_owned(),
        };

        assert_eq!(config.cookie_secret, "foobar");
        assert_eq!(config.local_timezone, "Etc/UTC");
    }
}
