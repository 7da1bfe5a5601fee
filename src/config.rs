/*
 * Responsibility
 * - 環境変数や設定の読み込み (signing key, bypass/privileged prefixes, port)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動後は不変 (read-only で共有する)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
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

/// Token signing/verification material. Immutable after startup.
#[derive(Clone)]
pub struct SigningConfig {
    pub secret: Vec<u8>,
    pub leeway_seconds: u64,
    pub ttl_seconds: u64,
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SigningConfig")
            .field("leeway_seconds", &self.leeway_seconds)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub signing: SigningConfig,

    pub bypass_prefixes: Vec<String>,
    pub privileged_prefixes: Vec<String>,
}

pub const DEFAULT_BYPASS_PREFIX: &str = "/auth";
pub const DEFAULT_PRIVILEGED_PREFIX: &str = "/admin";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))
            .and_then(|v| decode_secret(&v))?;

        let leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let ttl_seconds = std::env::var("ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600); // 1 hour

        let bypass_prefixes = std::env::var("AUTH_BYPASS_PREFIXES")
            .map(|v| parse_prefixes(&v))
            .unwrap_or_else(|_| vec![DEFAULT_BYPASS_PREFIX.to_string()]);

        let privileged_prefixes = std::env::var("AUTH_PRIVILEGED_PREFIXES")
            .map(|v| parse_prefixes(&v))
            .unwrap_or_else(|_| vec![DEFAULT_PRIVILEGED_PREFIX.to_string()]);

        Ok(Self {
            addr,
            app_env,
            signing: SigningConfig {
                secret,
                leeway_seconds,
                ttl_seconds,
            },
            bypass_prefixes,
            privileged_prefixes,
        })
    }
}

/// Comma-separated list; entries are trimmed and blanks dropped.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn decode_secret(raw: &str) -> Result<Vec<u8>, ConfigError> {
    let secret = STANDARD
        .decode(raw.trim())
        .map_err(|_| ConfigError::Invalid("JWT_SECRET_KEY"))?;
    if secret.is_empty() {
        return Err(ConfigError::Invalid("JWT_SECRET_KEY"));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_prefixes(" /auth , ,/public,"),
            vec!["/auth".to_string(), "/public".to_string()]
        );
        assert!(parse_prefixes("").is_empty());
    }

    #[test]
    fn secret_must_be_non_empty_base64() {
        assert_eq!(decode_secret("c2VjcmV0").unwrap(), b"secret".to_vec());
        assert!(matches!(
            decode_secret("%%%"),
            Err(ConfigError::Invalid("JWT_SECRET_KEY"))
        ));
        assert!(matches!(
            decode_secret(""),
            Err(ConfigError::Invalid("JWT_SECRET_KEY"))
        ));
    }

    #[test]
    fn signing_debug_hides_secret() {
        let signing = SigningConfig {
            secret: b"hunter2".to_vec(),
            leeway_seconds: 0,
            ttl_seconds: 60,
        };
        assert!(!format!("{signing:?}").contains("hunter2"));
    }
}
