/// Any failure raised while sending a query or reading its answer.
///
/// Match on the variant to tell transport/status failures apart from
/// failures interpreting the response body.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The request could not be sent, or the server answered with a
    /// non-success status. `status` is `None` for transport failures.
    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
    },
    /// The request succeeded but the response body could not be consumed.
    #[error("{message}")]
    Response { message: String },
}

impl ChatError {
    /// Wraps a transport-level failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        ChatError::Request {
            status: None,
            message: format!("An error occurred during the API request: {}", err),
        }
    }

    /// Builds the error for a non-success HTTP status.
    pub fn status(code: u16) -> Self {
        ChatError::Request {
            status: Some(code),
            message: format!("API request failed with status code {}", code),
        }
    }

    /// Wraps a failure that happened while reading the response.
    pub fn response(err: impl std::fmt::Display) -> Self {
        ChatError::Response {
            message: format!("An unexpected error occurred: {}", err),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::Request { status, .. } => *status,
            ChatError::Response { .. } => None,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, ChatError::Request { .. })
    }

    pub fn is_response(&self) -> bool {
        matches!(self, ChatError::Response { .. })
    }
}

/// Errors raised while assembling a client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
