use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Errors raised while locating configuration and selecting a model provider.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Neither .env nor .env.azure files were found")]
    ConfigNotFound,
    #[error("The configuration file `{0}` does not exist")]
    ExplicitConfigNotFound(String),
    /// One or more required settings are absent; the message names them.
    #[error("{0}")]
    MissingConfig(String),
}

impl ConfigError {
    /// Required settings of the selected provider are absent.
    pub fn missing_settings<S: AsRef<str>>(names: &[S]) -> Self {
        let names = names.iter().map(AsRef::as_ref).collect::<Vec<_>>();
        ConfigError::MissingConfig(format!("The following environment variables are missing: {}", names.join(", ")))
    }

    /// No provider credential is set at all.
    pub fn no_credentials() -> Self {
        ConfigError::MissingConfig("Neither OPENAI_API_KEY nor AZURE_OPENAI_API_KEY is set in the environment variables".to_string())
    }

    /// Whether this error reports absent settings (as opposed to an absent file).
    pub fn is_missing_config(&self) -> bool {
        matches!(self, ConfigError::MissingConfig(_))
    }
}

/// Errors raised by the incident tools and their backend.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IncidentError {
    #[error("Incident `{0}` was not found")]
    NotFound(String),
    #[error("Incident is missing the `{0}` field")]
    MissingField(String),
    #[error("Unknown incident tool: `{0}`")]
    UnknownTool(String),
}

/// The chat-model backend selected by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    OpenAi,
    Azure,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Azure => write!(f, "azure"),
        }
    }
}
