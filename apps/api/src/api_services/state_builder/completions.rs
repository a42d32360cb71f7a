use std::sync::Arc;

use nightschool_application::CompletionProvider;
use nightschool_core::AppResult;
use nightschool_infrastructure::OpenAiCompletionProvider;
use tracing::info;

use crate::api_config::ApiConfig;

pub(super) fn build_completion_provider(
    config: &ApiConfig,
    http_client: reqwest::Client,
) -> AppResult<Arc<dyn CompletionProvider>> {
    let provider = OpenAiCompletionProvider::new(http_client, config.openai.clone())?;
    info!(model = %config.openai.model, "completion client configured");

    Ok(Arc::new(provider))
}
