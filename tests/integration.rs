#![cfg(test)]

use std::sync::Arc;

use async_openai::types::{ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool, ChatCompletionToolType, FunctionCall};
use async_trait::async_trait;
use mockall::mock;
use incident_toolkit::{
    assistant::{self, MAX_TOOL_ROUNDS},
    base::{
        incident::Incident,
        types::{IncidentError, Provider, Res, Void},
    },
    service::{
        incident::{GenericIncidentBackend, IncidentBackend},
        llm::{ChatModel, ChatReply, GenericChatModel, SamplingParams},
    },
    toolkit::IncidentToolkit,
};

// Mocks.

// Mock incident backend for testing.

mock! {
    pub Backend {}

    #[async_trait]
    impl GenericIncidentBackend for Backend {
        async fn lookup(&self, incident_id: &str) -> Res<Incident>;
        async fn escalate(&self, incident: &Incident) -> Void;
    }
}

// Mock chat model for testing.

mock! {
    pub Model {}

    #[async_trait]
    impl GenericChatModel for Model {
        fn provider(&self) -> Provider;
        fn model(&self) -> &str;
        fn sampling(&self) -> &SamplingParams;
        async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>, tools: Vec<ChatCompletionTool>) -> Res<ChatReply>;
    }
}

fn disk_incident() -> Incident {
    Incident::new("INC-42", "Disk full", "   /var/log filled up on web-3   ", "high", "open")
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: id.to_string(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

fn get_mock_model() -> MockModel {
    let mut mock = MockModel::new();

    mock.expect_provider().return_const(Provider::OpenAi);
    mock.expect_model().return_const("mock-model".to_string());
    mock.expect_sampling().return_const(SamplingParams::default());

    mock
}

// Toolkit over a real backend.

#[tokio::test]
async fn test_toolkit_reads_through_backend() {
    let mut backend = MockBackend::new();
    backend.expect_lookup().withf(|id| id == "INC-42").times(1).returning(|_| Ok(disk_incident()));

    let toolkit = IncidentToolkit::new(IncidentBackend::new(Arc::new(backend)));

    let incident = toolkit.read_incident("INC-42").await.unwrap();

    assert_eq!(incident, disk_incident());
}

#[tokio::test]
async fn test_toolkit_surfaces_not_found() {
    let mut backend = MockBackend::new();
    backend.expect_lookup().returning(|id| Err(IncidentError::NotFound(id.to_string()).into()));

    let toolkit = IncidentToolkit::new(IncidentBackend::new(Arc::new(backend)));

    let err = toolkit.read_incident("INC-404").await.unwrap_err();

    assert_eq!(err.downcast_ref::<IncidentError>(), Some(&IncidentError::NotFound("INC-404".to_string())));
}

#[tokio::test]
async fn test_escalate_pages_backend_once() {
    let mut backend = MockBackend::new();
    backend.expect_escalate().withf(|incident| incident.id() == Ok("INC-42")).times(1).returning(|_| Ok(()));

    let toolkit = IncidentToolkit::new(IncidentBackend::new(Arc::new(backend)));

    let message = toolkit.escalate_incident(&disk_incident()).await.unwrap();

    assert!(message.contains("INC-42"));
}

#[tokio::test]
async fn test_escalate_without_id_never_reaches_backend() {
    let mut backend = MockBackend::new();
    backend.expect_escalate().never();

    let toolkit = IncidentToolkit::new(IncidentBackend::new(Arc::new(backend)));
    let mut incident = disk_incident();
    incident.remove("id");

    assert!(toolkit.escalate_incident(&incident).await.is_err());
}

// Assistant turns.

#[tokio::test]
async fn test_assistant_answers_without_tools() {
    let mut model = get_mock_model();
    model.expect_complete().times(1).returning(|messages, tools| {
        assert_eq!(messages.len(), 2);
        assert_eq!(tools.len(), 3);

        Ok(ChatReply {
            text: Some("Nothing to triage.".to_string()),
            tool_calls: vec![],
        })
    });

    let turn = assistant::ask(&ChatModel::new(Arc::new(model)), &IncidentToolkit::stub(), "Anything on fire?").await.unwrap();

    assert_eq!(turn.reply.as_deref(), Some("Nothing to triage."));
    assert!(turn.tool_outcomes.is_empty());
}

#[tokio::test]
async fn test_assistant_runs_requested_tools() {
    let mut model = get_mock_model();
    model.expect_complete().times(2).returning(|messages, _| {
        // Answer once the tool results are in the conversation.
        if matches!(messages.last(), Some(ChatCompletionRequestMessage::Tool(_))) {
            return Ok(ChatReply {
                text: Some("INC-123 is a high severity server outage.".to_string()),
                tool_calls: vec![],
            });
        }

        Ok(ChatReply {
            text: None,
            tool_calls: vec![
                tool_call("call_1", "read_incident", serde_json::json!({ "incident_id": "INC-123" })),
                tool_call("call_2", "clean_incident", serde_json::json!({ "incident": disk_incident() })),
            ],
        })
    });

    let turn = assistant::ask(&ChatModel::new(Arc::new(model)), &IncidentToolkit::stub(), "Summarize INC-123").await.unwrap();

    assert_eq!(turn.reply.as_deref(), Some("INC-123 is a high severity server outage."));
    assert_eq!(turn.tool_outcomes.len(), 2);
    assert_eq!(turn.tool_outcomes[0].output["id"], "INC-123");
    assert_eq!(turn.tool_outcomes[1].output["description"], "/var/log filled up on web-3");
}

#[tokio::test]
async fn test_assistant_reports_tool_errors_to_model() {
    let mut model = get_mock_model();
    model.expect_complete().times(2).returning(|messages, _| {
        if matches!(messages.last(), Some(ChatCompletionRequestMessage::Tool(_))) {
            return Ok(ChatReply {
                text: Some("That tool does not exist.".to_string()),
                tool_calls: vec![],
            });
        }

        Ok(ChatReply {
            text: None,
            tool_calls: vec![tool_call("call_1", "resolve_incident", serde_json::json!({}))],
        })
    });

    let turn = assistant::ask(&ChatModel::new(Arc::new(model)), &IncidentToolkit::stub(), "Resolve INC-123").await.unwrap();

    assert!(turn.tool_outcomes[0].output["error"].as_str().unwrap().contains("resolve_incident"));
}

#[tokio::test]
async fn test_assistant_gives_up_after_max_rounds() {
    let mut model = get_mock_model();
    model.expect_complete().times(MAX_TOOL_ROUNDS).returning(|_, _| {
        Ok(ChatReply {
            text: None,
            tool_calls: vec![tool_call("call_x", "read_incident", serde_json::json!({ "incident_id": "INC-1" }))],
        })
    });

    let result = assistant::ask(&ChatModel::new(Arc::new(model)), &IncidentToolkit::stub(), "Loop forever").await;

    assert!(result.is_err());
}
