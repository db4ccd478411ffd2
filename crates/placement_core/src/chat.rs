//! crates/placement_core/src/chat.rs
//!
//! The communication-practice chat. The transcript is append-only and every
//! message is mirrored to the `ChatStore` in the order it was appended.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::domain::ChatMessage;
use crate::error::{require, GuidanceResult};
use crate::generation::ContentClient;
use crate::ports::ChatStore;

pub struct ChatSession {
    user_id: Uuid,
    transcript: Vec<ChatMessage>,
    store: Arc<dyn ChatStore>,
    content: ContentClient,
}

impl ChatSession {
    pub fn new(user_id: Uuid, store: Arc<dyn ChatStore>, content: ContentClient) -> Self {
        Self {
            user_id,
            transcript: Vec::new(),
            store,
            content,
        }
    }

    /// Replaces the local transcript with the stored history.
    pub async fn load(&mut self) -> GuidanceResult<&[ChatMessage]> {
        let history = self.store.list_messages(self.user_id).await?;
        self.transcript = history.into_iter().map(|m| m.message).collect();
        info!(
            "Loaded {} chat messages for user {}.",
            self.transcript.len(),
            self.user_id
        );
        Ok(&self.transcript)
    }

    /// Sends a user message and waits for the reply. Returns the reply, or `None`
    /// when the generation service produced nothing.
    pub async fn send(&mut self, text: &str) -> GuidanceResult<Option<ChatMessage>> {
        require(text, "Message")?;

        self.append(ChatMessage::user(text.trim())).await;

        let Some(reply) = self.content.chat_reply(&self.transcript).await else {
            return Ok(None);
        };
        let reply = ChatMessage::assistant(reply);
        self.append(reply.clone()).await;
        Ok(Some(reply))
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Persists, then appends locally. A failed write is logged, not surfaced.
    async fn append(&mut self, message: ChatMessage) {
        if let Err(e) = self.store.append_message(self.user_id, &message).await {
            error!(
                "Failed to persist {} chat message for user {}: {}",
                message.role.as_str(),
                self.user_id,
                e
            );
        }
        self.transcript.push(message);
    }
}
