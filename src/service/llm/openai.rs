//! Public OpenAI API chat model.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, ChatCompletionTool},
};
use async_trait::async_trait;
use tracing::instrument;

use crate::base::types::{Provider, Res};

use super::{ChatModel, ChatReply, GenericChatModel, SamplingParams, build_request, call_with_retry, parse_reply};

/// Sampling temperature for the public provider: fully deterministic.
pub const OPENAI_TEMPERATURE: f32 = 0.0;

// Extra methods on `ChatModel` applied by the openai implementation.

impl ChatModel {
    pub fn openai(api_key: &str, model: &str) -> Self {
        let client = OpenAiChatModel::new(api_key, model);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI chat model handle.
#[derive(Clone)]
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    sampling: SamplingParams,
}

impl OpenAiChatModel {
    /// Create a new OpenAI chat model handle with zero temperature.
    #[instrument(name = "OpenAiChatModel::new", skip_all)]
    pub fn new(api_key: &str, model: &str) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(api_key);

        Self {
            client: Client::with_config(cfg),
            model: model.to_string(),
            sampling: SamplingParams {
                temperature: Some(OPENAI_TEMPERATURE),
                max_tokens: None,
            },
        }
    }
}

#[async_trait]
impl GenericChatModel for OpenAiChatModel {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }

    #[instrument(name = "OpenAiChatModel::complete", skip_all)]
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, tools: Vec<ChatCompletionTool>) -> Res<ChatReply> {
        let request = build_request(&self.model, &self.sampling, messages, tools)?;
        let response = call_with_retry(&self.client, request).await?;

        parse_reply(response)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_handle_is_deterministic() {
        let model = ChatModel::openai("sk-test", "gpt-4.1-mini");

        assert_eq!(model.provider(), Provider::OpenAi);
        assert_eq!(model.model(), "gpt-4.1-mini");
        assert_eq!(model.sampling().temperature, Some(0.0));
        assert_eq!(model.sampling().max_tokens, None);
        assert_eq!(model.endpoint(), None);
    }
}
