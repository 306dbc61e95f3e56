use serde::Serialize;

/// Role of a message sender. Only the roles this client sends are modeled.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// Represents a chat message with a role and content
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    /// Creates a new chat message
    ///
    /// # Arguments
    /// * `role` - Role of the message sender
    /// * `content` - Content/text of the message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
