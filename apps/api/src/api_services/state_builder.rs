use std::sync::Arc;

use nightschool_application::ChatService;
use nightschool_core::AppError;
use nightschool_infrastructure::SystemClock;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod completions;
mod stores;

pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::new();

    let rate_limit_repository =
        stores::build_rate_limit_repository(&config.rate_limit_store, http_client.clone())?;
    let completion_provider = completions::build_completion_provider(config, http_client)?;

    let chat_service =
        ChatService::new(rate_limit_repository, completion_provider, Arc::new(SystemClock))
            .with_policy(config.rate_limit_policy);
    info!(
        max_messages = chat_service.policy().max_messages(),
        window_seconds = chat_service.policy().window().num_seconds(),
        "chat rate limit policy configured"
    );

    Ok(AppState { chat_service })
}
