//! Typed application configuration loaded from the process environment.
//!
//! Every field has a documented default except `JWT_SECRET`, which is
//! required and must be non-empty. Loading is a pure transform over a
//! name -> value map: absent keys take defaults, present keys are coerced
//! into their semantic type or the load fails with the variable name and
//! the reason. A failed load aborts startup; the server never listens
//! with a partially validated configuration.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Serialize;

/// Configuration load error, reported with enough detail for an operator
/// to fix the environment and restart.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Deployment environment. Closed set; anything else fails the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(format!(
                "'{other}' is not one of development, production, test"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        })
    }
}

/// Log verbosity. Closed set; `fatal` is accepted for parity with common
/// service log conventions and maps to the `error` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive string for the tracing env filter.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Fatal | LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "'{other}' is not one of fatal, error, warn, info, debug, trace"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

/// Application configuration, constructed once at startup and shared
/// read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    /// Deployment environment (`NODE_ENV`)
    pub env: Environment,

    /// Listen port (`PORT`)
    pub port: u16,

    /// Bind host (`HOST`)
    pub host: String,

    /// Data store connection string (`DATABASE_URL`), unused by the scaffold
    pub database_url: Option<String>,

    /// Cache connection string (`REDIS_URL`), unused by the scaffold
    pub redis_url: Option<String>,

    /// Token signing secret (`JWT_SECRET`), required and non-empty
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Token expiry, e.g. "7d" (`JWT_EXPIRES_IN`)
    pub jwt_expires_in: String,

    /// Rate-limit ceiling per client per window (`RATE_LIMIT_MAX`)
    pub rate_limit_max: u32,

    /// Rate-limit window in milliseconds (`RATE_LIMIT_WINDOW`)
    pub rate_limit_window_ms: u64,

    /// Log verbosity (`LOG_LEVEL`)
    pub log_level: LogLevel,

    /// Whether a metrics endpoint should be exposed (`ENABLE_METRICS`).
    /// The scaffold reserves the path but mounts no exporter.
    pub enable_metrics: bool,

    /// Metrics endpoint path (`METRICS_PATH`)
    pub metrics_path: String,

    /// Password-hashing cost factor (`BCRYPT_ROUNDS`)
    pub bcrypt_rounds: u32,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A local `.env` file, if present, fills gaps only: `dotenvy` never
    /// overrides variables already set in the real environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build a configuration from an explicit name -> value map.
    ///
    /// Pure and deterministic: equal maps yield equal configurations.
    /// Stops at the first invalid field.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwt_secret = match vars.get("JWT_SECRET") {
            None => return Err(ConfigError::Missing("JWT_SECRET")),
            Some(s) if s.is_empty() => {
                return Err(ConfigError::Invalid {
                    var: "JWT_SECRET",
                    reason: "must not be empty".to_string(),
                })
            }
            Some(s) => s.clone(),
        };

        Ok(Self {
            env: parse_or(vars, "NODE_ENV", Environment::Development)?,
            port: parse_or(vars, "PORT", 3000)?,
            host: string_or(vars, "HOST", "0.0.0.0"),
            database_url: vars.get("DATABASE_URL").cloned(),
            redis_url: vars.get("REDIS_URL").cloned(),
            jwt_secret,
            jwt_expires_in: string_or(vars, "JWT_EXPIRES_IN", "7d"),
            rate_limit_max: parse_or(vars, "RATE_LIMIT_MAX", 100)?,
            rate_limit_window_ms: parse_or(vars, "RATE_LIMIT_WINDOW", 900_000)?,
            log_level: parse_or(vars, "LOG_LEVEL", LogLevel::Info)?,
            enable_metrics: bool_or(vars, "ENABLE_METRICS", true)?,
            metrics_path: string_or(vars, "METRICS_PATH", "/metrics"),
            bcrypt_rounds: parse_or(vars, "BCRYPT_ROUNDS", 12)?,
        })
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                var: "HOST",
                reason: format!("'{}' is not a bindable address: {e}", self.host),
            })
    }
}

fn string_or(vars: &HashMap<String, String>, var: &'static str, default: &str) -> String {
    vars.get(var).cloned().unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(
    vars: &HashMap<String, String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match vars.get(var) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

fn bool_or(
    vars: &HashMap<String, String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(var).map(String::as_str) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            var,
            reason: format!("'{other}' is not one of true, false, 1, 0"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("JWT_SECRET".to_string(), "test-secret".to_string());
        vars
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AppConfig::from_vars(&base_vars()).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.redis_url, None);
        assert_eq!(cfg.jwt_secret, "test-secret");
        assert_eq!(cfg.jwt_expires_in, "7d");
        assert_eq!(cfg.rate_limit_max, 100);
        assert_eq!(cfg.rate_limit_window_ms, 900_000);
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert!(cfg.enable_metrics);
        assert_eq!(cfg.metrics_path, "/metrics");
        assert_eq!(cfg.bcrypt_rounds, 12);
    }

    #[test]
    fn missing_secret_fails() {
        let err = AppConfig::from_vars(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn empty_secret_fails() {
        let mut vars = HashMap::new();
        vars.insert("JWT_SECRET".to_string(), String::new());
        let err = AppConfig::from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn non_numeric_port_fails() {
        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "abc".to_string());
        let err = AppConfig::from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn unknown_environment_fails() {
        let mut vars = base_vars();
        vars.insert("NODE_ENV".to_string(), "staging".to_string());
        let err = AppConfig::from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains("NODE_ENV"));
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut vars = base_vars();
        vars.insert("LOG_LEVEL".to_string(), "verbose".to_string());
        assert!(AppConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn bad_boolean_fails() {
        let mut vars = base_vars();
        vars.insert("ENABLE_METRICS".to_string(), "yes".to_string());
        let err = AppConfig::from_vars(&vars).unwrap_err();
        assert!(err.to_string().contains("ENABLE_METRICS"));
    }

    #[test]
    fn explicit_values_coerce() {
        let mut vars = base_vars();
        vars.insert("NODE_ENV".to_string(), "production".to_string());
        vars.insert("PORT".to_string(), "8080".to_string());
        vars.insert("HOST".to_string(), "127.0.0.1".to_string());
        vars.insert("DATABASE_URL".to_string(), "postgres://db/app".to_string());
        vars.insert("REDIS_URL".to_string(), "redis://cache".to_string());
        vars.insert("JWT_EXPIRES_IN".to_string(), "1h".to_string());
        vars.insert("RATE_LIMIT_MAX".to_string(), "10".to_string());
        vars.insert("RATE_LIMIT_WINDOW".to_string(), "60000".to_string());
        vars.insert("LOG_LEVEL".to_string(), "debug".to_string());
        vars.insert("ENABLE_METRICS".to_string(), "false".to_string());
        vars.insert("METRICS_PATH".to_string(), "/internal/metrics".to_string());
        vars.insert("BCRYPT_ROUNDS".to_string(), "10".to_string());

        let cfg = AppConfig::from_vars(&vars).unwrap();
        assert_eq!(cfg.env, Environment::Production);
        assert!(!cfg.env.is_development());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://db/app"));
        assert_eq!(cfg.redis_url.as_deref(), Some("redis://cache"));
        assert_eq!(cfg.jwt_expires_in, "1h");
        assert_eq!(cfg.rate_limit_max, 10);
        assert_eq!(cfg.rate_limit_window_ms, 60_000);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert!(!cfg.enable_metrics);
        assert_eq!(cfg.metrics_path, "/internal/metrics");
        assert_eq!(cfg.bcrypt_rounds, 10);
    }

    #[test]
    fn loading_is_idempotent() {
        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "4000".to_string());
        let a = AppConfig::from_vars(&vars).unwrap();
        let b = AppConfig::from_vars(&vars).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let mut vars = base_vars();
        vars.insert("PORT".to_string(), "4100".to_string());
        let cfg = AppConfig::from_vars(&vars).unwrap();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 4100);
    }

    #[test]
    fn log_level_filter_mapping() {
        assert_eq!(LogLevel::Fatal.as_filter(), "error");
        assert_eq!(LogLevel::Info.as_filter(), "info");
        assert_eq!(LogLevel::Trace.as_filter(), "trace");
    }
}
