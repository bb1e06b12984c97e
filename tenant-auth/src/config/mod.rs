use secrecy::{ExposeSecret, SecretString};
use service_core::config as core_config;
use service_core::error::AppError;
use service_core::observability;
use std::env;

use crate::services::ManagerWithoutOrganization;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
    pub ephemeral_tokens: EphemeralTokenConfig,
    pub manager_without_organization: ManagerWithoutOrganization,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC key for HS256. Never logged.
    pub secret: SecretString,
    /// Token lifetime in milliseconds. Negative values produce tokens that
    /// are already expired, which tests rely on.
    pub expiration_ms: i64,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct EphemeralTokenConfig {
    pub ttl_seconds: u64,
}

const MIN_PROD_SECRET_BYTES: usize = 32;

impl AuthConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("tenant-auth"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            jwt: JwtConfig {
                secret: SecretString::new(get_env("JWT_SECRET", None, is_prod)?),
                expiration_ms: get_env("JWT_EXPIRATION_MS", Some("86400000"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!("JWT_EXPIRATION_MS: {}", e))
                    })?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://127.0.0.1:6379"), is_prod)?,
            },
            ephemeral_tokens: EphemeralTokenConfig {
                ttl_seconds: get_env("EPHEMERAL_TOKEN_TTL_SECONDS", Some("900"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "EPHEMERAL_TOKEN_TTL_SECONDS: {}",
                            e
                        ))
                    })?,
            },
            manager_without_organization: get_env(
                "MANAGER_WITHOUT_ORGANIZATION",
                Some("bootstrap"),
                false,
            )?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.ephemeral_tokens.ttl_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "EPHEMERAL_TOKEN_TTL_SECONDS must be positive"
            )));
        }

        if self.environment == Environment::Prod {
            if self.jwt.secret.expose_secret().len() < MIN_PROD_SECRET_BYTES {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be at least {} bytes in production",
                    MIN_PROD_SECRET_BYTES
                )));
            }

            if self.jwt.expiration_ms <= 0 {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_EXPIRATION_MS must be positive in production"
                )));
            }
        }

        Ok(())
    }

    /// Install the global subscriber for this service.
    pub fn init_tracing(&self) -> Result<(), AppError> {
        observability::init_tracing(&self.service_name, &self.log_level, self.common.log_format)
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
