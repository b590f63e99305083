//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; without either an in-memory store is used)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>);
//!   an `https://` URL marks session cookies `Secure`
//! - `STOREFRONT_ARGON2_MEMORY_KIB` - Argon2 memory cost
//! - `STOREFRONT_ARGON2_ITERATIONS` - Argon2 time cost
//! - `STOREFRONT_ARGON2_PARALLELISM` - Argon2 lanes
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Password hashing cost
    pub password_hashing: PasswordHashingConfig,
    /// Sentry error tracking
    pub sentry: SentryConfig,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Sentry settings. Reporting is disabled without a DSN.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: Option<f32>,
    pub traces_sample_rate: Option<f32>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            password_hashing: PasswordHashingConfig::default(),
            sentry: SentryConfig::default(),
        }
    }
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashingConfig {
    /// Build an Argon2id hasher with these costs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the costs are out of Argon2's range.
    pub fn hasher(&self) -> Result<Argon2<'static>, ConfigError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_ARGON2_*".to_string(), e.to_string())
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = get("STOREFRONT_DATABASE_URL")
            // Fallback set by Fly.io postgres attach
            .or_else(|| get("DATABASE_URL"))
            .filter(|url| !url.is_empty())
            .map(SecretString::from);

        let cost = defaults.password_hashing;
        let password_hashing = PasswordHashingConfig {
            memory_kib: parse_or(&get, "STOREFRONT_ARGON2_MEMORY_KIB", cost.memory_kib)?,
            iterations: parse_or(&get, "STOREFRONT_ARGON2_ITERATIONS", cost.iterations)?,
            parallelism: parse_or(&get, "STOREFRONT_ARGON2_PARALLELISM", cost.parallelism)?,
        };
        password_hashing.hasher()?;

        let sentry = SentryConfig {
            dsn: get("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            environment: get("SENTRY_ENVIRONMENT"),
            sample_rate: parse_optional(&get, "SENTRY_SAMPLE_RATE")?,
            traces_sample_rate: parse_optional(&get, "SENTRY_TRACES_SAMPLE_RATE")?,
        };

        Ok(Self {
            database_url,
            host: parse_or(&get, "STOREFRONT_HOST", defaults.host)?,
            port: parse_or(&get, "STOREFRONT_PORT", defaults.port)?,
            base_url: get("STOREFRONT_BASE_URL").unwrap_or(defaults.base_url),
            password_hashing,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable.
fn parse_optional<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Parse a variable, using `default` if it is unset.
fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(get, key)?.unwrap_or(default))
}
