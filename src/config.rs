use clap::Parser;
use std::env;
use std::str::FromStr;

/// Command line overrides, applied on top of the environment
#[derive(Parser, Debug, Default)]
#[command(name = "job-services")]
#[command(about = "Job tracking HTTP service")]
#[command(version)]
pub struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for rolling log files (overrides LOG_DIR)
    #[arg(long)]
    pub log_dir: Option<String>,
}

/// Bearer token settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the identity provider
    pub secret: String,
    /// Required `iss` claim, unchecked when unset
    pub issuer: Option<String>,
    /// Required `aud` claim, unchecked when unset
    pub audience: Option<String>,
    /// Scope every caller must hold
    pub scope: String,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite connection URL
    /// Default: sqlite::memory:
    pub database_url: String,

    /// Maximum payload size for all requests (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_payload_size: usize,

    /// Maximum pooled database connections, ignored for in-memory stores
    pub max_db_connections: u32,

    pub host: String,
    pub port: u16,

    /// Directory for the rolling log files
    pub log_dir: String,

    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - AUTH_SECRET: token signing secret
    ///
    /// Optional environment variables:
    /// - DATABASE_URL (default: sqlite::memory:)
    /// - MAX_PAYLOAD_SIZE in bytes (default: 10485760 = 10MB)
    /// - MAX_DB_CONNECTIONS (default: 5)
    /// - HOST (default: 127.0.0.1), PORT (default: 8080)
    /// - LOG_DIR (default: logs)
    /// - AUTH_ISSUER, AUTH_AUDIENCE, AUTH_SCOPE (default: read)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("AUTH_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "AUTH_SECRET must be set in .env file or environment".to_string())?;

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string()),
            max_payload_size: parse_or(lookup("MAX_PAYLOAD_SIZE"), 10 * 1024 * 1024),
            max_db_connections: parse_or(lookup("MAX_DB_CONNECTIONS"), 5),
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(lookup("PORT"), 8080),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            auth: AuthConfig {
                secret,
                issuer: lookup("AUTH_ISSUER"),
                audience: lookup("AUTH_AUDIENCE"),
                scope: lookup("AUTH_SCOPE").unwrap_or_else(|| "read".to_string()),
            },
        })
    }

    /// Apply command line overrides
    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(host) = cli.host {
            self.host = host;
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_dir) = cli.log_dir {
            self.log_dir = log_dir;
        }
        self
    }
}

/// Parse an optional value, falling back to `default` when absent or invalid
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup_from(&[("AUTH_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.max_payload_size, 10 * 1024 * 1024);
        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.scope, "read");
        assert!(config.auth.issuer.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("AUTH_SECRET", "")])).is_err());
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("AUTH_SECRET", "s"),
            ("PORT", "not-a-port"),
            ("MAX_DB_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_db_connections, 3);
    }

    #[test]
    fn cli_overrides_environment() {
        let config = Config::from_lookup(lookup_from(&[("AUTH_SECRET", "s"), ("PORT", "9000")]))
            .unwrap()
            .with_cli(Cli::parse_from(["job-services", "--port", "9100", "--host", "0.0.0.0"]));

        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.log_dir, "logs");
    }
}
