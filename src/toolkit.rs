//! Incident tools exposed to a chat model.
//!
//! The toolkit offers three operations (read, clean, escalate) as thin adapters
//! over an [`IncidentBackend`]. Each operation is also described as a
//! chat-completion function tool so it can be registered with a model and
//! dispatched by name when the model calls it.

use std::str::FromStr;

use async_openai::types::{ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType, FunctionObjectArgs};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    base::{
        incident::{DESCRIPTION, Incident},
        types::{IncidentError, Res},
    },
    service::incident::IncidentBackend,
};

// Types.

/// One of the operations the toolkit exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentTool {
    ReadIncident,
    CleanIncident,
    EscalateIncident,
}

/// Arguments of `read_incident`.
#[derive(Debug, Deserialize)]
struct ReadIncidentArgs {
    incident_id: String,
}

/// Arguments of `clean_incident` and `escalate_incident`.
#[derive(Debug, Deserialize)]
struct IncidentArgs {
    incident: Incident,
}

impl IncidentTool {
    /// All tools, in registration order.
    pub const ALL: [IncidentTool; 3] = [IncidentTool::ReadIncident, IncidentTool::CleanIncident, IncidentTool::EscalateIncident];

    pub fn name(&self) -> &'static str {
        match self {
            IncidentTool::ReadIncident => "read_incident",
            IncidentTool::CleanIncident => "clean_incident",
            IncidentTool::EscalateIncident => "escalate_incident",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IncidentTool::ReadIncident => "Read the details of a DevOps incident from the incident-management system.",
            IncidentTool::CleanIncident => "Clean the details of a DevOps incident so it can be triaged.  Returns the incident with its description trimmed.",
            IncidentTool::EscalateIncident => "Escalate a DevOps incident.  Returns a confirmation message.",
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn parameters(&self) -> Value {
        match self {
            IncidentTool::ReadIncident => serde_json::json!({
                "type": "object",
                "properties": {
                    "incident_id": { "type": "string", "description": "ID of the incident to read." },
                },
                "required": ["incident_id"],
                "additionalProperties": false
            }),
            IncidentTool::CleanIncident => incident_parameters("Incident details to clean."),
            IncidentTool::EscalateIncident => incident_parameters("Incident details to escalate."),
        }
    }

    /// The chat-completion tool definition used to register this tool with a model.
    pub fn definition(&self) -> Res<ChatCompletionTool> {
        let function = FunctionObjectArgs::default().name(self.name()).description(self.description()).parameters(self.parameters()).build()?;

        Ok(ChatCompletionToolArgs::default().r#type(ChatCompletionToolType::Function).function(function).build()?)
    }

    /// Run this tool against `toolkit` with JSON-encoded `arguments`.
    #[instrument(skip_all, fields(tool = self.name()))]
    pub async fn invoke(&self, toolkit: &IncidentToolkit, arguments: &str) -> Res<Value> {
        // Models sometimes send an empty string for "no arguments".
        let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };

        match self {
            IncidentTool::ReadIncident => {
                let ReadIncidentArgs { incident_id } = serde_json::from_str(arguments)?;
                let incident = toolkit.read_incident(&incident_id).await?;
                Ok(serde_json::to_value(incident)?)
            }
            IncidentTool::CleanIncident => {
                let IncidentArgs { incident } = serde_json::from_str(arguments)?;
                let incident = toolkit.clean_incident(&incident)?;
                Ok(serde_json::to_value(incident)?)
            }
            IncidentTool::EscalateIncident => {
                let IncidentArgs { incident } = serde_json::from_str(arguments)?;
                let message = toolkit.escalate_incident(&incident).await?;
                Ok(Value::String(message))
            }
        }
    }
}

impl FromStr for IncidentTool {
    type Err = IncidentError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        IncidentTool::ALL.into_iter().find(|tool| tool.name() == name).ok_or_else(|| IncidentError::UnknownTool(name.to_string()))
    }
}

impl std::fmt::Display for IncidentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// Structs.

/// Toolkit of incident operations.
///
/// This is trivially cloneable; every operation is stateless across calls.
#[derive(Clone)]
pub struct IncidentToolkit {
    backend: IncidentBackend,
}

impl IncidentToolkit {
    pub fn new(backend: IncidentBackend) -> Self {
        Self { backend }
    }

    /// Toolkit backed by the stub incident backend.
    pub fn stub() -> Self {
        Self::new(IncidentBackend::stub())
    }

    /// Read an incident by its identifier.
    #[instrument(skip_all)]
    pub async fn read_incident(&self, incident_id: &str) -> Res<Incident> {
        info!("Reading incident `{incident_id}` ...");
        self.backend.lookup(incident_id).await
    }

    /// Return a copy of `incident` with the description trimmed of surrounding whitespace.
    pub fn clean_incident(&self, incident: &Incident) -> Result<Incident, IncidentError> {
        let description = incident.description()?.trim().to_string();

        let mut cleaned = incident.clone();
        cleaned.set(DESCRIPTION, description);

        Ok(cleaned)
    }

    /// Escalate `incident` and return a confirmation message.
    #[instrument(skip_all)]
    pub async fn escalate_incident(&self, incident: &Incident) -> Res<String> {
        let id = incident.id()?;

        info!("Escalating incident `{id}` ...");
        self.backend.escalate(incident).await?;

        Ok(format!("Incident {id} has been escalated."))
    }

    /// The operations this toolkit exposes, for registration with an agent.
    pub fn list_operations(&self) -> Vec<IncidentTool> {
        IncidentTool::ALL.to_vec()
    }

    /// Chat-completion tool definitions for every operation.
    pub fn definitions(&self) -> Res<Vec<ChatCompletionTool>> {
        self.list_operations().iter().map(IncidentTool::definition).collect()
    }

    /// Dispatch a tool call by name.
    pub async fn invoke(&self, name: &str, arguments: &str) -> Res<Value> {
        let tool = name.parse::<IncidentTool>()?;
        tool.invoke(self, arguments).await
    }
}

// Helpers.

/// Schema for tools taking a whole incident.
fn incident_parameters(description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "incident": {
                "type": "object",
                "description": description,
                "properties": {
                    "id": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "severity": { "type": "string" },
                    "status": { "type": "string" },
                },
                "additionalProperties": { "type": "string" }
            },
        },
        "required": ["incident"],
        "additionalProperties": false
    })
}

// Tests.
