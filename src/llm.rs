use anyhow::{anyhow, Result};
use async_trait::async_trait;
use awful_aj::{api::ask, config::AwfulJadeConfig, template::ChatTemplate};
use tracing::{debug, info};

/// Generative-model collaborator: one prompt in, raw answer text out.
///
/// Model calls are driven on the caller's task and never spawned, so
/// implementations need not be `Send`.
#[async_trait(?Send)]
pub trait ModelClient {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Model client backed by an OpenAI-compatible endpoint configured through
/// `awful_aj`.
pub struct AwfulModelClient {
    cfg: AwfulJadeConfig,
    template: ChatTemplate,
}

impl AwfulModelClient {
    pub fn new(cfg: AwfulJadeConfig, template: ChatTemplate) -> Self {
        Self { cfg, template }
    }
}

#[async_trait(?Send)]
impl ModelClient for AwfulModelClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();

        debug!("LLM call starting - prompt_length={} chars", prompt.len());

        // Map Box<dyn StdError> -> anyhow::Error *before* `?`
        let answer = ask(&self.cfg, prompt.to_string(), &self.template, None, None, false)
            .await
            .map_err(|e| anyhow!(e.to_string()))?;

        info!(
            "LLM API call completed - duration={:.2}s, response_length={} chars",
            start.elapsed().as_secs_f32(),
            answer.len()
        );

        Ok(answer)
    }
}
