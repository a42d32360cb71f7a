use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use nightschool_core::AppError;
use nightschool_domain::RateLimitPolicy;
use nightschool_infrastructure::{FirestoreConfig, OpenAiConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub enum RateLimitStoreConfig {
    InMemory,
    Redis { redis_url: String },
    Firestore(FirestoreConfig),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub openai: OpenAiConfig,
    pub rate_limit_store: RateLimitStoreConfig,
    pub rate_limit_policy: RateLimitPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let openai = OpenAiConfig {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_owned()),
            api_key: required_non_empty_env("OPENAI_API_KEY")?,
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_owned()),
        };

        let rate_limit_store = match env::var("RATE_LIMIT_STORE")
            .unwrap_or_else(|_| "in_memory".to_owned())
            .as_str()
        {
            "in_memory" => RateLimitStoreConfig::InMemory,
            "redis" => RateLimitStoreConfig::Redis {
                redis_url: required_non_empty_env("REDIS_URL")?,
            },
            "firestore" => RateLimitStoreConfig::Firestore(FirestoreConfig {
                base_url: env::var("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".to_owned()),
                project_id: required_non_empty_env("FIRESTORE_PROJECT_ID")?,
                database_id: env::var("FIRESTORE_DATABASE")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| "(default)".to_owned()),
                api_key: required_non_empty_env("FIRESTORE_API_KEY")?,
            }),
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be one of 'in_memory', 'redis' or 'firestore', got '{other}'"
                )));
            }
        };

        let max_messages = parse_env_or(
            "CHAT_RATE_LIMIT_MAX",
            RateLimitPolicy::DEFAULT_MAX_MESSAGES,
        )?;
        let window_seconds = parse_env_or(
            "CHAT_RATE_LIMIT_WINDOW_SECONDS",
            RateLimitPolicy::DEFAULT_WINDOW_SECONDS,
        )?;
        let rate_limit_policy = RateLimitPolicy::new(max_messages, window_seconds)?;

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            openai,
            rate_limit_store,
            rate_limit_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_or<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
