//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Log level filter (e.g. "info", "shop_server=debug")
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
    /// Directory for rolling log files (console only when unset)
    pub log_dir: Option<String>,
    /// Page size used when a listing omits `limit`
    pub default_page_size: i64,
    /// Upper bound for `limit` on listings
    pub max_page_size: i64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables (after `.env`, if present)
    pub fn from_env() -> Result<Self, BoxError> {
        let _ = dotenvy::dotenv();

        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        if !matches!(
            environment.as_str(),
            "development" | "staging" | "production"
        ) {
            return Err(format!("ENVIRONMENT must be development, staging or production, got {environment}").into());
        }

        let default_page_size = Self::parse_or("DEFAULT_PAGE_SIZE", 20_i64).max(1);
        let max_page_size = Self::parse_or("MAX_PAGE_SIZE", 100_i64).max(default_page_size);

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "shop.db".into()),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: Self::parse_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            default_page_size,
            max_page_size,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET: &str = "SHOP_SERVER_TEST_SECRET_NEVER_SET";

    #[test]
    fn test_missing_secret_falls_back_in_development() {
        let secret = Config::require_secret(UNSET, "development").unwrap();
        assert!(secret.starts_with("dev-"));
    }

    #[test]
    fn test_missing_secret_fails_outside_development() {
        assert!(Config::require_secret(UNSET, "production").is_err());
        assert!(Config::require_secret(UNSET, "staging").is_err());
    }

    #[test]
    fn test_is_development() {
        let mut config = Config {
            database_path: "shop.db".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "secret".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            default_page_size: 20,
            max_page_size: 100,
        };
        assert!(config.is_development());
        config.environment = "production".into();
        assert!(!config.is_development());
    }

    #[test]
    fn test_parse_or_uses_default_for_missing_values() {
        assert_eq!(Config::parse_or(UNSET, 42_i64), 42);
        assert!(!Config::parse_or(UNSET, false));
    }
}
