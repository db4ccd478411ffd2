//! crates/placement_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ChatMessage, NewUser, StoredChatMessage, User, UserCategory, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Generation request
//=========================================================================================

/// What is sent to the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationInput {
    /// A single prompt string.
    Prompt(String),
    /// A role-tagged transcript, oldest first.
    Conversation(Vec<ChatMessage>),
}

/// Structured-output hint attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{question: string, options: string[], correctAnswer: string, solution: string, credits: number}`
    Quiz,
}

impl ResponseShape {
    pub fn name(self) -> &'static str {
        match self {
            ResponseShape::Quiz => "quiz_item",
        }
    }

    /// JSON schema for the shape.
    pub fn schema(self) -> serde_json::Value {
        match self {
            ResponseShape::Quiz => serde_json::json!({
                "type": "object",
                "properties": {
                    "question": { "type": "string" },
                    "options": { "type": "array", "items": { "type": "string" } },
                    "correctAnswer": { "type": "string" },
                    "solution": { "type": "string" },
                    "credits": { "type": "number" }
                },
                "required": ["question", "options", "correctAnswer", "solution", "credits"]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub input: GenerationInput,
    pub shape: Option<ResponseShape>,
}

impl GenerationRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            input: GenerationInput::Prompt(text.into()),
            shape: None,
        }
    }

    pub fn conversation(messages: Vec<ChatMessage>) -> Self {
        Self {
            input: GenerationInput::Conversation(messages),
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = Some(shape);
        self
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    // --- Accounts ---
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn save_onboarding(
        &self,
        user_id: Uuid,
        category: UserCategory,
        domains: &[String],
    ) -> PortResult<()>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Appends one message to the user's history.
    async fn append_message(
        &self,
        user_id: Uuid,
        message: &ChatMessage,
    ) -> PortResult<StoredChatMessage>;

    /// Returns the user's full history in creation order.
    async fn list_messages(&self, user_id: Uuid) -> PortResult<Vec<StoredChatMessage>>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Performs one generation call and returns the raw text payload.
    async fn generate(&self, request: GenerationRequest) -> PortResult<String>;
}

/// Salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> PortResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool>;
}
