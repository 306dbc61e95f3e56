//! Minimal client for the qset.io conversational AI endpoint.
//!
//! A query is sent together with a fixed system prompt as a JSON payload,
//! and the streamed plain-text answer is reassembled into a single string.
//!
//! ```no_run
//! use qset_chat::{AiChat, QsetChat};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let chat = QsetChat::new(None, None)?;
//! let answer = chat.send_query("what is a neural network?", true).await?;
//! println!("\n\nQsetAI: {}", answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod llm;
pub mod utils;

pub use config::ChatConfig;
pub use errors::{ChatError, ConfigError};
pub use llm::{build_payload, AiChat, ChatMessage, ChatPayload, QsetChat, Role};
