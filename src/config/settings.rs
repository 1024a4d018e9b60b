use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub stripe: StripeConfig,
    pub charge: ChargePollConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Terminal reader the charge flow dispatches to. Absence is reported per
    /// charge as a configuration error, not at startup, so status lookup and
    /// refund stay usable on a partially configured deployment.
    pub terminal_reader_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChargePollConfig {
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl AppSettings {
    pub fn from_env() -> Result<Self, AppError> {
        // App config
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "terminal-relay".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Server config
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::Configuration("SERVER_PORT must be a valid port number".to_string()))?;

        // CORS origins
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        // Stripe configuration
        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| AppError::Configuration("STRIPE_SECRET_KEY must be set".to_string()))?;

        let terminal_reader_id = env::var("STRIPE_TERMINAL_READER").ok().filter(|s| !s.is_empty());

        // Poll loop budget: 1.5s spacing for 80 attempts, a 120 second ceiling
        let poll_interval_ms = env::var("CHARGE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1500".to_string())
            .parse::<u64>()
            .map_err(|_| AppError::Configuration("CHARGE_POLL_INTERVAL_MS must be a valid number".to_string()))?;

        let max_poll_attempts = env::var("CHARGE_MAX_POLL_ATTEMPTS")
            .unwrap_or_else(|_| "80".to_string())
            .parse::<u32>()
            .map_err(|_| AppError::Configuration("CHARGE_MAX_POLL_ATTEMPTS must be a valid number".to_string()))?;

        Ok(Self {
            app: AppConfig {
                name: app_name,
                environment,
            },
            server: ServerConfig {
                host: server_host,
                port: server_port,
                cors_origins,
            },
            stripe: StripeConfig {
                secret_key: stripe_secret_key,
                terminal_reader_id,
            },
            charge: ChargePollConfig {
                poll_interval_ms,
                max_poll_attempts,
            },
        })
    }
}
