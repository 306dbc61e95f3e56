use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::ChatConfig;
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::errors::ConfigError;

/// On-disk shape of the configuration. Every field is optional and
/// overlays the defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    system_prompt: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    /// Extra or replacement headers, merged by lowercase name
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

/// Loads a client configuration from a TOML file
///
/// # Arguments
///
/// * `file_path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The TOML content cannot be parsed
pub fn load_config(file_path: impl AsRef<Path>) -> Result<ChatConfig, ConfigError> {
    let file_path = file_path.as_ref();
    let toml_str = fs::read_to_string(file_path)?;
    let config = parse_config(&toml_str)?;
    info!("Loaded chat configuration from {}", file_path.display());
    Ok(config)
}

/// Parses TOML content and overlays it on the default configuration.
pub fn parse_config(toml_str: &str) -> Result<ChatConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(toml_str)?;
    let mut config = ChatConfig::default();

    if let Some(prompt) = file.system_prompt {
        config.system_prompt = prompt;
    }
    if let Some(url) = file.api_url {
        config.api_url = url;
    }
    for (name, value) in file.headers {
        config.headers.insert(name.to_ascii_lowercase(), value);
    }

    Ok(config)
}

/// `<config dir>/qset-chat/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
