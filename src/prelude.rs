pub use crate::base::{
    config::ModelSettings,
    incident::Incident,
    types::{ConfigError, Err, IncidentError, Provider, Res, Void},
};
pub use crate::factory::ModelConfig;
pub use crate::service::{incident::IncidentBackend, llm::ChatModel};
pub use crate::toolkit::{IncidentTool, IncidentToolkit};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
