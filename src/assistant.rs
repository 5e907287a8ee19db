//! A single assistant turn: prompt the model with the incident tools registered,
//! run any tool calls it requests, and feed the results back until it answers.

use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::{
    base::{prompts::ASSISTANT_SYSTEM_DIRECTIVE, types::Res},
    service::llm::ChatModel,
    toolkit::IncidentToolkit,
};

/// Upper bound on model round trips within one turn.
pub const MAX_TOOL_ROUNDS: usize = 5;

// Types.

/// The outcome of a tool call made during a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutcome {
    pub name: String,
    pub arguments: String,
    /// The tool's JSON result, or `{"error": "..."}` if it failed.
    pub output: Value,
}

/// The result of one assistant turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssistantTurn {
    /// The model's final text answer, if any.
    pub reply: Option<String>,
    /// Every tool call executed, in order.
    pub tool_outcomes: Vec<ToolOutcome>,
}

// Functions.

/// Run one assistant turn for `prompt`.
///
/// Tool failures are reported back to the model as error objects rather than
/// aborting the turn; model failures abort it.
#[instrument(skip_all)]
pub async fn ask(model: &ChatModel, toolkit: &IncidentToolkit, prompt: &str) -> Res<AssistantTurn> {
    let tools = toolkit.definitions()?;

    let mut messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default().content(ASSISTANT_SYSTEM_DIRECTIVE).build()?.into(),
        ChatCompletionRequestUserMessageArgs::default().content(prompt).build()?.into(),
    ];

    let mut turn = AssistantTurn::default();

    for round in 1..=MAX_TOOL_ROUNDS {
        let reply = model.complete(messages.clone(), tools.clone()).await?;

        if reply.tool_calls.is_empty() {
            info!("Model answered after {round} round(s).");
            turn.reply = reply.text;
            return Ok(turn);
        }

        info!("Model requested {} tool call(s) in round {round}.", reply.tool_calls.len());

        let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
        assistant.tool_calls(reply.tool_calls.clone());
        if let Some(text) = reply.text {
            assistant.content(text);
        }
        messages.push(assistant.build()?.into());

        for call in reply.tool_calls {
            let output = match toolkit.invoke(&call.function.name, &call.function.arguments).await {
                Ok(output) => output,
                Err(err) => {
                    error!("Tool `{}` failed: {err}", call.function.name);
                    serde_json::json!({ "error": err.to_string() })
                }
            };

            messages.push(ChatCompletionRequestToolMessageArgs::default().tool_call_id(call.id.clone()).content(output.to_string()).build()?.into());

            turn.tool_outcomes.push(ToolOutcome {
                name: call.function.name,
                arguments: call.function.arguments,
                output,
            });
        }
    }

    Err(anyhow::anyhow!("Model did not answer within {MAX_TOOL_ROUNDS} rounds."))
}
