mod chat_client;
mod message;
mod payload;
mod streaming;

pub use chat_client::*;
pub use message::*;
pub use payload::*;
pub use streaming::*;
