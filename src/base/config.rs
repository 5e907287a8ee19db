//! Load model settings via `config` crate, with `.env` file values overriding the process environment.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::types::{ConfigError, Res};

/// Default configuration file, searched for first.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Alternate configuration file, searched for when the default is absent.
pub const ALTERNATE_ENV_FILE: &str = ".env.azure";

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_NAME: &str = "OPENAI_MODEL_NAME";
pub const AZURE_OPENAI_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_OPENAI_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const AZURE_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";

/// Every variable the model settings read; all others are dropped before layering.
pub const MODEL_VARIABLES: [&str; 6] = [OPENAI_API_KEY, OPENAI_MODEL_NAME, AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_DEPLOYMENT, AZURE_OPENAI_API_VERSION];

/// Resolved model settings.
///
/// Every field is optional here; which ones are required depends on the
/// provider selected by [`crate::factory::ModelConfig`]. Empty values are
/// treated the same as absent ones.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ModelSettings {
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI model name (`OPENAI_MODEL_NAME`).
    #[serde(default)]
    pub openai_model_name: Option<String>,
    /// Azure OpenAI API key (`AZURE_OPENAI_API_KEY`).
    #[serde(default)]
    pub azure_openai_api_key: Option<String>,
    /// Azure OpenAI endpoint, e.g. `https://my-resource.openai.azure.com` (`AZURE_OPENAI_ENDPOINT`).
    #[serde(default)]
    pub azure_openai_endpoint: Option<String>,
    /// Azure OpenAI deployment name (`AZURE_OPENAI_DEPLOYMENT`).
    #[serde(default)]
    pub azure_openai_deployment: Option<String>,
    /// Azure OpenAI API version, e.g. `2024-06-01` (`AZURE_OPENAI_API_VERSION`).
    #[serde(default)]
    pub azure_openai_api_version: Option<String>,
}

impl ModelSettings {
    /// Resolve settings from the process environment, with the values in `env_file` taking precedence.
    ///
    /// The process environment itself is never modified.
    #[instrument(skip_all)]
    pub fn load(env_file: &Path) -> Res<Self> {
        let file_vars = read_env_file(env_file)?;

        info!("Loaded {} variables from `{}`.", file_vars.len(), env_file.display());

        Self::from_sources(process_vars(), file_vars)
    }

    /// Resolve settings from two layers of variables; `overrides` wins over `base`.
    ///
    /// Names outside [`MODEL_VARIABLES`] are ignored in both layers.
    pub fn from_sources<B, O>(base: B, overrides: O) -> Res<Self>
    where
        B: IntoIterator<Item = (String, String)>,
        O: IntoIterator<Item = (String, String)>,
    {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().source(Some(model_vars(base).collect())))
            .add_source(config::Environment::default().source(Some(model_vars(overrides).collect())));

        Ok(cfg.build()?.try_deserialize()?)
    }

    /// Resolve settings from a single set of variables.
    pub fn from_vars<I>(vars: I) -> Res<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_sources(vars, std::iter::empty())
    }

    /// Look up a setting by its environment variable name.
    ///
    /// Returns `None` for unknown names, absent values, and empty values.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            OPENAI_API_KEY => &self.openai_api_key,
            OPENAI_MODEL_NAME => &self.openai_model_name,
            AZURE_OPENAI_API_KEY => &self.azure_openai_api_key,
            AZURE_OPENAI_ENDPOINT => &self.azure_openai_endpoint,
            AZURE_OPENAI_DEPLOYMENT => &self.azure_openai_deployment,
            AZURE_OPENAI_API_VERSION => &self.azure_openai_api_version,
            _ => return None,
        };

        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Collect the names in `required` that have no usable value.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required.iter().copied().filter(|name| self.get(name).is_none()).collect()
    }
}

// Helpers.

/// Find the configuration file, searching `start` and its ancestors.
///
/// The default file wins; the alternate is only considered when no default
/// file exists anywhere along the search path.
#[instrument(skip_all)]
pub fn locate_env_file(start: &Path) -> Result<PathBuf, ConfigError> {
    if let Some(path) = find_upwards(start, DEFAULT_ENV_FILE) {
        debug!("Found default configuration at `{}`.", path.display());
        return Ok(path);
    }

    if let Some(path) = find_upwards(start, ALTERNATE_ENV_FILE) {
        debug!("Found alternate configuration at `{}`.", path.display());
        return Ok(path);
    }

    Err(ConfigError::ConfigNotFound)
}

/// Walk from `start` towards the filesystem root looking for a file called `name`.
fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(name)).find(|candidate| candidate.is_file())
}

/// Parse a dotenv-formatted file into key / value pairs.
fn read_env_file(path: &Path) -> Res<Vec<(String, String)>> {
    let vars = dotenvy::from_path_iter(path)?.collect::<Result<Vec<_>, _>>()?;
    Ok(vars)
}

/// Keep only the variables the model settings read.
fn model_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter().filter(|(key, _)| MODEL_VARIABLES.contains(&key.as_str()))
}

/// The process environment, skipping entries that are not valid unicode.
fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

// Tests.
