/*
 * Responsibility
 * - 環境変数や設定の読み込み (JWT secret / expiration, DATABASE_URL など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::http::HttpLimits;

/// Default token lifetime: one hour.
pub const DEFAULT_JWT_EXPIRATION_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // base64-encoded HMAC secret. Never log this.
    pub jwt_secret: String,
    pub jwt_expiration: Duration,

    pub database_url: Option<String>,
    pub static_principals: Option<String>,

    pub http_limits: HttpLimits,

    // Off by default: a panicking request must not take the server down.
    pub abort_on_panic: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_expiration", &self.jwt_expiration)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("http_limits", &self.http_limits)
            .field("abort_on_panic", &self.abort_on_panic)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let jwt_secret = get("JWT_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration_ms = match get("JWT_EXPIRATION_MS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_EXPIRATION_MS"))?,
            None => DEFAULT_JWT_EXPIRATION_MS,
        };
        if jwt_expiration_ms == 0 {
            return Err(ConfigError::Invalid("JWT_EXPIRATION_MS"));
        }

        let database_url = get("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let static_principals = get("STATIC_PRINCIPALS").filter(|s| !s.trim().is_empty());

        let defaults = HttpLimits::default();
        let body_limit_bytes = match get("REQUEST_BODY_LIMIT_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("REQUEST_BODY_LIMIT_BYTES"))?,
            None => defaults.body_limit_bytes,
        };
        let timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
            None => defaults.timeout,
        };

        let abort_on_panic = match get("ABORT_ON_PANIC") {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::Invalid("ABORT_ON_PANIC")),
            },
            None => false,
        };

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            jwt_expiration: Duration::from_millis(jwt_expiration_ms),
            database_url,
            static_principals,
            http_limits: HttpLimits {
                body_limit_bytes,
                timeout,
            },
            abort_on_panic,
        })
    }
}
