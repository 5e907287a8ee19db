//! Factory that builds a chat model handle from environment configuration.
//!
//! Construction runs two steps exactly once:
//! 1. locate the configuration file (`.env`, falling back to `.env.azure`);
//! 2. select a provider from the resolved settings and validate what it requires.
//!
//! Provider precedence: when both `OPENAI_API_KEY` and `AZURE_OPENAI_API_KEY`
//! are set, the public OpenAI API is selected and a warning is logged.

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::{
            AZURE_OPENAI_API_KEY, AZURE_OPENAI_API_VERSION, AZURE_OPENAI_DEPLOYMENT, AZURE_OPENAI_ENDPOINT, ModelSettings, OPENAI_API_KEY, OPENAI_MODEL_NAME, locate_env_file,
        },
        types::{ConfigError, Res},
    },
    service::llm::{ChatModel, azure::AzureDeployment},
};

/// Settings the public provider requires.
pub const OPENAI_REQUIRED: [&str; 2] = [OPENAI_API_KEY, OPENAI_MODEL_NAME];

/// Settings the enterprise provider requires.
pub const AZURE_REQUIRED: [&str; 4] = [AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_API_KEY, AZURE_OPENAI_DEPLOYMENT, AZURE_OPENAI_API_VERSION];

/// Model configuration: owns the single chat model handle built at construction.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// The configured chat model.
    pub chat_model: ChatModel,
}

impl ModelConfig {
    /// Locate the configuration file from the current directory, then build the handle.
    pub fn new() -> Res<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover(&cwd)
    }

    /// Locate the configuration file from `start`, then build the handle.
    #[instrument(skip_all)]
    pub fn discover(start: &Path) -> Res<Self> {
        let env_file = locate_env_file(start)?;
        Self::from_env_file(&env_file)
    }

    /// Build the handle using an explicit configuration file.
    #[instrument(skip_all)]
    pub fn from_env_file(env_file: &Path) -> Res<Self> {
        if !env_file.is_file() {
            return Err(ConfigError::ExplicitConfigNotFound(env_file.display().to_string()).into());
        }

        let settings = ModelSettings::load(env_file)?;
        Ok(Self::from_settings(&settings)?)
    }

    /// Build the handle from already resolved settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, ConfigError> {
        let chat_model = create_chat_model(settings)?;
        Ok(Self { chat_model })
    }
}

// Helpers.

/// Select the provider and build its handle.
#[instrument(skip_all)]
pub fn create_chat_model(settings: &ModelSettings) -> Result<ChatModel, ConfigError> {
    let openai_api_key = settings.get(OPENAI_API_KEY);
    let azure_openai_api_key = settings.get(AZURE_OPENAI_API_KEY);

    if let Some(api_key) = openai_api_key {
        if azure_openai_api_key.is_some() {
            warn!("Both {OPENAI_API_KEY} and {AZURE_OPENAI_API_KEY} are set; using OpenAI.");
        }

        require(settings, &OPENAI_REQUIRED)?;

        let model = settings.get(OPENAI_MODEL_NAME).unwrap_or_default();
        info!("Configuring OpenAI chat model `{model}`.");

        return Ok(ChatModel::openai(api_key, model));
    }

    if let Some(api_key) = azure_openai_api_key {
        require(settings, &AZURE_REQUIRED)?;

        let deployment = AzureDeployment {
            endpoint: settings.get(AZURE_OPENAI_ENDPOINT).unwrap_or_default().to_string(),
            api_key: api_key.to_string(),
            deployment: settings.get(AZURE_OPENAI_DEPLOYMENT).unwrap_or_default().to_string(),
            api_version: settings.get(AZURE_OPENAI_API_VERSION).unwrap_or_default().to_string(),
        };
        info!("Configuring Azure OpenAI deployment `{}`.", deployment.deployment);

        return Ok(ChatModel::azure(deployment));
    }

    Err(ConfigError::no_credentials())
}

/// Fail with every absent setting named at once.
fn require(settings: &ModelSettings, required: &[&str]) -> Result<(), ConfigError> {
    let missing = settings.missing(required);

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::missing_settings(missing.as_slice()))
    }
}

// Tests.
