use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// PostgreSQL `sslmode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Allow,
    Prefer,
    #[default]
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    pub const ALL: [SslMode; 6] = [
        SslMode::Disable,
        SslMode::Allow,
        SslMode::Prefer,
        SslMode::Require,
        SslMode::VerifyCa,
        SslMode::VerifyFull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unsupported SSL mode {s:?}"))
    }
}

/// A connection profile with its password in the clear.
///
/// This is what callers hand to the store and get back from it; the
/// plaintext password never reaches disk.
#[derive(Debug)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: SecretString,
    pub ssl_mode: SslMode,
}

impl ConnectionProfile {
    /// Render a libpq connection URI.
    ///
    /// User and password are percent-encoded; plain alphanumeric values come
    /// through unchanged.
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            urlencoding::encode(&self.user),
            urlencoding::encode(self.password.expose_secret()),
            self.host,
            self.port,
            self.database,
            self.ssl_mode
        )
    }
}

/// On-disk form of a connection profile.
///
/// `password` holds the sealed blob, never plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(rename = "sslmode", alias = "sslMode")]
    pub ssl_mode: SslMode,
}

impl StoredProfile {
    /// Check the field invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("host", &self.host),
            ("database", &self.database),
            ("user", &self.user),
            ("password", &self.password),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("field `{field}` is empty"));
            }
        }
        if self.port == 0 {
            return Err("field `port` must be between 1 and 65535".to_string());
        }
        Ok(())
    }
}
