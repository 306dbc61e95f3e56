use serde::Serialize;

use super::message::{ChatMessage, Role};

/// JSON request body: the system turn followed by the user turn.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatPayload {
    pub messages: [ChatMessage; 2],
}

/// Builds the request body for a query.
///
/// The query is trimmed; nothing else is validated, so an empty query
/// yields an empty user message.
pub fn build_payload(system_prompt: &str, query: impl AsRef<str>) -> ChatPayload {
    ChatPayload {
        messages: [
            ChatMessage::new(Role::System, system_prompt),
            ChatMessage::new(Role::User, query.as_ref().trim()),
        ],
    }
}
