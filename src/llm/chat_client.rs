use std::io::{Stdout, Write};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::payload::build_payload;
use super::streaming::{decode_stream, lines_from_bytes};
use crate::config::ChatConfig;
use crate::errors::{ChatError, ConfigError};

/// Something that answers a query with text.
#[async_trait]
pub trait AiChat: Send + Sync {
    /// Sends `query` and returns the full answer. When `stream` is true the
    /// answer is also written to stdout as it arrives.
    async fn send_query(&self, query: &str, stream: bool) -> Result<String, ChatError>;
}

/// Client for the qset.io chat endpoint.
///
/// Configuration is fixed at construction. Each query is one POST whose
/// streamed body is decoded line by line.
#[derive(Debug)]
pub struct QsetChat {
    system_prompt: String,
    api_url: Url,
    headers: HeaderMap,
    http: Client,
}

impl QsetChat {
    /// Creates a client with the default configuration, optionally overriding
    /// the system prompt and endpoint URL.
    ///
    /// # Arguments
    /// * `system_prompt` - Prompt sent as the system turn of every query
    /// * `api_url` - Absolute URL of the chat endpoint
    pub fn new(system_prompt: Option<String>, api_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = ChatConfig::default();
        if let Some(prompt) = system_prompt {
            config.system_prompt = prompt;
        }
        if let Some(url) = api_url {
            config.api_url = url;
        }
        Self::from_config(config)
    }

    /// Creates a client from a complete configuration.
    pub fn from_config(config: ChatConfig) -> Result<Self, ConfigError> {
        let api_url = config.endpoint()?;
        let headers = config.header_map()?;
        let http = Client::builder().build()?;

        debug!(
            "Chat client configured for {} with {} headers",
            api_url,
            headers.len()
        );

        Ok(QsetChat {
            system_prompt: config.system_prompt,
            api_url,
            headers,
            http,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sends `query` and returns the full answer, writing each decoded
    /// fragment to `echo` as it arrives.
    ///
    /// # Errors
    /// * [`ChatError::Request`] if the request cannot be sent, the body read fails,
    ///   or the status is a client or server error
    /// * [`ChatError::Response`] if a line is not UTF-8 or the echo cannot be written
    pub async fn send_query_with_echo<W>(
        &self,
        query: &str,
        echo: Option<&mut W>,
    ) -> Result<String, ChatError>
    where
        W: Write + Send + ?Sized,
    {
        let payload = build_payload(&self.system_prompt, query);

        info!("Sending query to {}", self.api_url);
        let response = self
            .http
            .post(self.api_url.clone())
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await
            .map_err(ChatError::transport)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!("Chat endpoint answered with status {}", status);
            return Err(ChatError::status(status.as_u16()));
        }
        debug!("Chat endpoint answered with status {}", status);

        decode_stream(lines_from_bytes(response.bytes_stream()), echo).await
    }
}

#[async_trait]
impl AiChat for QsetChat {
    async fn send_query(&self, query: &str, stream: bool) -> Result<String, ChatError> {
        if stream {
            let mut stdout = std::io::stdout();
            self.send_query_with_echo(query, Some(&mut stdout)).await
        } else {
            self.send_query_with_echo(query, None::<&mut Stdout>).await
        }
    }
}
