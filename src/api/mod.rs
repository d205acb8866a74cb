pub mod client;
pub mod error;
pub mod events;
pub mod models;

pub use client::ApiClient;
pub use error::ApiError;
pub use events::{EventKind, WebhookEvent};
pub use models::{Conversation, ConversationStatus, Direction, Message};
