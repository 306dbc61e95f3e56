mod parser;

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_HEADERS, DEFAULT_SYSTEM_PROMPT, ENV_API_URL, ENV_SYSTEM_PROMPT,
};
use crate::errors::ConfigError;

pub use parser::{default_config_path, load_config, parse_config};

/// Settings a chat client is built from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// System prompt prepended to every query
    pub system_prompt: String,
    /// Absolute URL of the chat endpoint
    pub api_url: String,
    /// Headers sent with every request, keyed by lowercase name
    pub headers: BTreeMap<String, String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl ChatConfig {
    /// Overrides prompt and URL from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Same as [`ChatConfig::apply_env`] with a custom variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prompt) = lookup(ENV_SYSTEM_PROMPT) {
            self.system_prompt = prompt;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
    }

    /// Parses the endpoint, accepting only absolute http(s) URLs.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Converts the configured headers into a request header map.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}
