use std::env;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// Minimum length of the session signing key, in bytes.
pub const MIN_SESSION_SECRET_BYTES: usize = 32;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// The URL of the Redis server backing the revocation denylist.
    pub redis_url: Option<String>,
    /// The lifetime of a session token in days.
    pub session_duration_days: i64,
    /// Whether logout revokes still-valid tokens server-side.
    pub session_revocation: bool,
    /// The key used to sign session tokens.
    pub session_secret: Zeroizing<Vec<u8>>,
    /// Whether the service runs in production (affects cookie attributes).
    pub production: bool,
    /// The port to listen on.
    pub port: u16,
    /// Origins allowed to make credentialed cross-origin requests.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut secret_hex = env::var("SESSION_SECRET")
            .context("SESSION_SECRET must be set (generate with: openssl rand -hex 32)")?;

        let secret = decode_secret(&secret_hex);
        secret_hex.zeroize();
        let session_secret = secret?;

        let session_duration_days: i64 = env::var("SESSION_DURATION_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .context("Invalid SESSION_DURATION_DAYS")?;

        if session_duration_days <= 0 {
            anyhow::bail!("SESSION_DURATION_DAYS must be positive");
        }

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
            session_duration_days,
            session_revocation: parse_flag(
                &env::var("SESSION_REVOCATION").unwrap_or_default(),
            ),
            session_secret,
            production: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string())
                == "production",
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid PORT")?,
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string()),
            ),
        })
    }

    /// The session lifetime as a `chrono::Duration`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_duration_days)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Decodes a hex signing key and enforces the minimum length.
pub fn decode_secret(secret_hex: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = Zeroizing::new(
        hex::decode(secret_hex.trim()).context("SESSION_SECRET must be valid hexadecimal")?,
    );

    if bytes.len() < MIN_SESSION_SECRET_BYTES {
        anyhow::bail!(
            "SESSION_SECRET must be at least {} bytes ({} hex characters)",
            MIN_SESSION_SECRET_BYTES,
            MIN_SESSION_SECRET_BYTES * 2
        );
    }

    Ok(bytes)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_secret_accepts_32_bytes() {
        let secret = decode_secret(&"ab".repeat(32)).unwrap();
        assert_eq!(secret.len(), 32);
    }

    #[test]
    fn decode_secret_rejects_short_keys() {
        assert!(decode_secret(&"ab".repeat(16)).is_err());
    }

    #[test]
    fn decode_secret_rejects_non_hex() {
        assert!(decode_secret(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn flags_and_origins() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag(""));
        assert!(!parse_flag("no"));

        assert_eq!(
            parse_origins("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
