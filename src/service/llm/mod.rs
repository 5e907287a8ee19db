//! Integration with chat-completion model services.
//!
//! The module defines the `GenericChatModel` trait that is implemented for the
//! public OpenAI API and for Azure OpenAI deployments. Both implementations share
//! the request building, retry, and response parsing helpers below.

pub mod azure;
pub mod openai;

use std::{ops::Deref, sync::Arc, time::Duration};

use async_openai::{
    Client,
    config::Config as ClientConfig,
    error::OpenAIError,
    types::{ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool, CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse},
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::base::types::{Provider, Res};

// Types.

/// The assistant's answer to a single completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    /// Text content, if the model produced any.
    pub text: Option<String>,
    /// Tool calls the model wants executed before it answers.
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
}

/// Sampling parameters applied to every request a handle sends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

// Traits.

/// Generic chat model trait that handles must implement.
///
/// A handle is configured once at construction and never mutated. No network
/// traffic happens until [`GenericChatModel::complete`] is called.
#[async_trait]
pub trait GenericChatModel: Send + Sync + 'static {
    /// The provider this handle talks to.
    fn provider(&self) -> Provider;

    /// The model name (OpenAI) or deployment name (Azure).
    fn model(&self) -> &str;

    /// The sampling parameters sent with each request.
    fn sampling(&self) -> &SamplingParams;

    /// The endpoint, for providers that are not reached through the default API base.
    fn endpoint(&self) -> Option<&str> {
        None
    }

    /// The API version, for providers that pin one.
    fn api_version(&self) -> Option<&str> {
        None
    }

    /// Send one chat-completion request with the given conversation and tools.
    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, tools: Vec<ChatCompletionTool>) -> Res<ChatReply>;
}

// Structs.

/// Chat model handle for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatModel {
    inner: Arc<dyn GenericChatModel>,
}

impl Deref for ChatModel {
    type Target = dyn GenericChatModel;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatModel {
    pub fn new(inner: Arc<dyn GenericChatModel>) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("provider", &self.provider())
            .field("model", &self.model())
            .field("sampling", self.sampling())
            .finish()
    }
}

// Helpers.

/// Build a chat-completion request.
#[allow(deprecated)]
pub fn build_request(model: &str, sampling: &SamplingParams, messages: Vec<ChatCompletionRequestMessage>, tools: Vec<ChatCompletionTool>) -> Res<CreateChatCompletionRequest> {
    let mut request = CreateChatCompletionRequestArgs::default();
    request.model(model).messages(messages);

    // Sending an empty tool list is rejected by the API.
    if !tools.is_empty() {
        request.tools(tools);
    }

    if let Some(temperature) = sampling.temperature {
        request.temperature(temperature);
    }

    // Azure deployments on older API versions only understand `max_tokens`.
    if let Some(max_tokens) = sampling.max_tokens {
        request.max_tokens(max_tokens);
    }

    Ok(request.build()?)
}

/// Send a chat-completion request with retry logic and timeout handling.
#[instrument(skip_all)]
pub async fn call_with_retry<C: ClientConfig>(client: &Client<C>, request: CreateChatCompletionRequest) -> Res<CreateChatCompletionResponse> {
    const MAX_RETRIES: u32 = 3;
    const TIMEOUT: u64 = 120;
    const RETRY_DELAY_MS: u64 = 1000;

    let mut retries = 0;

    loop {
        let result = timeout(Duration::from_secs(TIMEOUT), client.chat().create(request.clone())).await;

        match result {
            Ok(Ok(response)) => {
                info!("Chat completion succeeded after {} attempts", retries + 1);
                return Ok(response);
            }
            Ok(Err(err)) => {
                if !is_transient(&err) {
                    return Err(anyhow::anyhow!("Chat completion failed: {err}"));
                }
                if retries >= MAX_RETRIES {
                    return Err(anyhow::anyhow!("Chat completion failed after {MAX_RETRIES} retries: {err}"));
                }
                retries += 1;
                warn!("Chat completion failed, retrying {retries}/{MAX_RETRIES}: {err}");
            }
            Err(_) => {
                if retries >= MAX_RETRIES {
                    return Err(anyhow::anyhow!("Chat completion timed out after {MAX_RETRIES} attempts"));
                }
                retries += 1;
                warn!("Chat completion timed out, retrying {retries}/{MAX_RETRIES}");
            }
        }

        let delay = Duration::from_millis(RETRY_DELAY_MS * 2_u64.pow(retries - 1));
        tokio::time::sleep(delay).await;
    }
}

/// Whether a failed call may succeed if sent again.
///
/// Transport failures and server-side or rate-limit API errors are transient;
/// rejected credentials, invalid requests, and local errors are not.
pub fn is_transient(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::Reqwest(_) => true,
        OpenAIError::ApiError(api) => {
            matches!(api.r#type.as_deref(), Some("server_error" | "rate_limit_error" | "requests" | "tokens"))
                || matches!(api.code.as_deref(), Some("rate_limit_exceeded"))
        }
        _ => false,
    }
}

/// Parse the first choice of a chat-completion response.
pub fn parse_reply(response: CreateChatCompletionResponse) -> Res<ChatReply> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(anyhow::anyhow!("Chat completion returned no choices."));
    };

    let message = choice.message;

    if let Some(refusal) = message.refusal {
        return Err(anyhow::anyhow!("Request refused: {refusal}"));
    }

    Ok(ChatReply {
        text: message.content,
        tool_calls: message.tool_calls.unwrap_or_default(),
    })
}

// Tests.
