//! Azure OpenAI (enterprise-hosted) chat model.

use std::sync::Arc;

use async_openai::{
    Client,
    config::AzureConfig,
    types::{ChatCompletionRequestMessage, ChatCompletionTool},
};
use async_trait::async_trait;
use tracing::instrument;

use crate::base::types::{Provider, Res};

use super::{ChatModel, ChatReply, GenericChatModel, SamplingParams, build_request, call_with_retry, parse_reply};

/// Max output tokens for the enterprise provider.
pub const AZURE_MAX_TOKENS: u32 = 4096;

/// Connection details for an Azure OpenAI deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureDeployment {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

// Extra methods on `ChatModel` applied by the azure implementation.

impl ChatModel {
    pub fn azure(deployment: AzureDeployment) -> Self {
        let client = AzureChatModel::new(deployment);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Azure OpenAI chat model handle.
#[derive(Clone)]
pub struct AzureChatModel {
    client: Client<AzureConfig>,
    endpoint: String,
    deployment: String,
    api_version: String,
    sampling: SamplingParams,
}

impl AzureChatModel {
    /// Create a new Azure OpenAI chat model handle with a fixed output token budget.
    #[instrument(name = "AzureChatModel::new", skip_all)]
    pub fn new(deployment: AzureDeployment) -> Self {
        let cfg = AzureConfig::new()
            .with_api_base(&deployment.endpoint)
            .with_api_key(&deployment.api_key)
            .with_deployment_id(&deployment.deployment)
            .with_api_version(&deployment.api_version);

        Self {
            client: Client::with_config(cfg),
            endpoint: deployment.endpoint,
            deployment: deployment.deployment,
            api_version: deployment.api_version,
            sampling: SamplingParams {
                temperature: None,
                max_tokens: Some(AZURE_MAX_TOKENS),
            },
        }
    }
}

#[async_trait]
impl GenericChatModel for AzureChatModel {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn model(&self) -> &str {
        &self.deployment
    }

    fn sampling(&self) -> &SamplingParams {
        &self.sampling
    }

    fn endpoint(&self) -> Option<&str> {
        Some(&self.endpoint)
    }

    fn api_version(&self) -> Option<&str> {
        Some(&self.api_version)
    }

    #[instrument(name = "AzureChatModel::complete", skip_all)]
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, tools: Vec<ChatCompletionTool>) -> Res<ChatReply> {
        // The deployment selects the model; the request field is informational.
        let request = build_request(&self.deployment, &self.sampling, messages, tools)?;
        let response = call_with_retry(&self.client, request).await?;

        parse_reply(response)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_handle_has_fixed_token_budget() {
        let model = ChatModel::azure(AzureDeployment {
            endpoint: "https://example.openai.azure.com".to_string(),
            api_key: "azure-key".to_string(),
            deployment: "gpt-4o-prod".to_string(),
            api_version: "2024-06-01".to_string(),
        });

        assert_eq!(model.provider(), Provider::Azure);
        assert_eq!(model.model(), "gpt-4o-prod");
        assert_eq!(model.sampling().max_tokens, Some(4096));
        assert_eq!(model.sampling().temperature, None);
        assert_eq!(model.endpoint(), Some("https://example.openai.azure.com"));
        assert_eq!(model.api_version(), Some("2024-06-01"));
    }
}
