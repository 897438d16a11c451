use serde::Deserialize;

/// Application configuration, loaded from `config/default.toml`,
/// `config/local.toml` and `GIFTDAY_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Session token settings. The signing secret is shared with the external
/// identity provider and is the only required setting.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret (required).
    pub jwt_secret: String,
    /// Issuer stamped into and required of every token.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Access token lifetime in seconds (default: 1 hour).
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds (default: 14 days).
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
    /// Remaining access lifetime below which a pair is re-minted.
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_secs: u64,
    /// Access token cookie name.
    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,
    /// Refresh token cookie name.
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
    /// Set the Secure attribute on session cookies (default: false).
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database URL (default: sqlite:./data/giftday.db)
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Page targets the access gate redirects to.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    /// Where `/` and an authenticated login page land (default: /countdown).
    #[serde(default = "default_landing")]
    pub landing: String,
    /// The sign-in page anonymous visitors are sent to (default: /login).
    #[serde(default = "default_login")]
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// CORS allowed origins (comma-separated, default: *)
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("GIFTDAY").separator("__"))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            landing: default_landing(),
            login: default_login(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_issuer() -> String {
    "giftday".to_string()
}

fn default_access_ttl() -> u64 {
    3600
}

fn default_refresh_ttl() -> u64 {
    14 * 24 * 3600
}

fn default_refresh_margin() -> u64 {
    60
}

fn default_access_cookie() -> String {
    "giftday_access".to_string()
}

fn default_refresh_cookie() -> String {
    "giftday_refresh".to_string()
}

fn default_database_url() -> String {
    "sqlite:./data/giftday.db".to_string()
}

fn default_landing() -> String {
    "/countdown".to_string()
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> String {
    "*".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = from_toml("[auth]\njwt_secret = \"secret\"").unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.auth.issuer, "giftday");
        assert_eq!(cfg.auth.access_ttl_secs, 3600);
        assert_eq!(cfg.auth.refresh_ttl_secs, 14 * 24 * 3600);
        assert_eq!(cfg.auth.refresh_margin_secs, 60);
        assert_eq!(cfg.auth.access_cookie, "giftday_access");
        assert_eq!(cfg.auth.refresh_cookie, "giftday_refresh");
        assert!(!cfg.auth.secure_cookies);
        assert_eq!(cfg.database.url, "sqlite:./data/giftday.db");
        assert_eq!(cfg.routes.landing, "/countdown");
        assert_eq!(cfg.routes.login, "/login");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.cors.origins, "*");
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        assert!(from_toml("[auth]").is_err());
        assert!(from_toml("").is_err());
    }

    #[test]
    fn test_sections_override_defaults() {
        let cfg = from_toml(
            r#"
            port = 9000

            [auth]
            jwt_secret = "secret"
            access_ttl_secs = 120
            secure_cookies = true

            [routes]
            landing = "/home"

            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.auth.access_ttl_secs, 120);
        assert!(cfg.auth.secure_cookies);
        assert_eq!(cfg.routes.landing, "/home");
        assert_eq!(cfg.routes.login, "/login");
        assert_eq!(cfg.database.url, "sqlite::memory:");
    }
}
