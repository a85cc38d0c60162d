//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payout: PayoutConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "pay.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://pay.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Authentication configuration (Google OAuth)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    /// Emails granted the admin capability on sign-in.
    ///
    /// This is the only way to obtain `is_admin`; it is never accepted
    /// from client input.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    pub google: GoogleOAuthConfig,
}

impl AuthConfig {
    /// Whether the given email is configured as an admin.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

/// Google OAuth configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Payout policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutConfig {
    /// Minimum withdrawal amount in currency units (default: 500)
    #[serde(default = "default_minimum_withdrawal")]
    pub minimum_withdrawal: f64,
    /// Default per-view rate applied to newly submitted shorts
    #[serde(default = "default_earnings_per_view")]
    pub default_earnings_per_view: f64,
    /// Banking region, selects which routing identifier is mandatory
    #[serde(default)]
    pub region: BankRegion,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            minimum_withdrawal: default_minimum_withdrawal(),
            default_earnings_per_view: default_earnings_per_view(),
            region: BankRegion::default(),
        }
    }
}

/// Banking region selector
///
/// `Routing` regions (e.g. US ACH) require a routing number on withdrawal
/// requests; `Ifsc` regions (India) require an IFSC code.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BankRegion {
    Routing,
    #[default]
    Ifsc,
}

fn default_minimum_withdrawal() -> f64 {
    500.0
}

fn default_earnings_per_view() -> f64 {
    0.0001
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (STUDIOPAY_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("payout.minimum_withdrawal", 500.0)?
            .set_default("payout.default_earnings_per_view", 0.0001)?
            .set_default("payout.region", "ifsc")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (STUDIOPAY_*)
            .add_source(
                Environment::with_prefix("STUDIOPAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.as_bytes().len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        if !self.payout.minimum_withdrawal.is_finite() || self.payout.minimum_withdrawal <= 0.0 {
            return Err(crate::error::AppError::Config(
                "payout.minimum_withdrawal must be a positive number".to_string(),
            ));
        }

        if !self.payout.default_earnings_per_view.is_finite()
            || self.payout.default_earnings_per_view < 0.0
        {
            return Err(crate::error::AppError::Config(
                "payout.default_earnings_per_view must be non-negative".to_string(),
            ));
        }

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure session cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/studiopay-test.db"),
            },
            auth: AuthConfig {
                session_secret: "x".repeat(32),
                session_max_age: 604_800,
                admin_emails: vec!["admin@example.com".to_string()],
                google: GoogleOAuthConfig {
                    client_id: "google-client-id".to_string(),
                    client_secret: "google-client-secret".to_string(),
                },
            },
            payout: PayoutConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn accepts_local_http_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_short_session_secret() {
        let mut config = valid_config();
        config.auth.session_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_http_on_public_domain() {
        let mut config = valid_config();
        config.server.domain = "pay.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_minimum_withdrawal() {
        let mut config = valid_config();
        config.payout.minimum_withdrawal = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn admin_email_match_is_case_insensitive() {
        let config = valid_config();
        assert!(config.auth.is_admin_email("Admin@Example.com"));
        assert!(!config.auth.is_admin_email("user@example.com"));
    }
}
