//! services/api/src/web/chat.rs
//!
//! The communication-practice chat endpoints.

use crate::web::{
    rest::{reject, HandlerError},
    state::AppState,
};
use axum::{extract::State, response::Json, Extension};
use placement_core::{ChatMessage, ChatSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatMessageView {
    /// `user` or `assistant`.
    pub role: String,
    pub text: String,
}

impl From<&ChatMessage> for ChatMessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            text: message.text.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    /// Null when the assistant produced nothing for the last message.
    pub reply: Option<ChatMessageView>,
    pub transcript: Vec<ChatMessageView>,
}

fn transcript_view(session: &ChatSession) -> Vec<ChatMessageView> {
    session.transcript().iter().map(ChatMessageView::from).collect()
}

async fn session(state: &AppState, user_id: Uuid) -> Arc<Mutex<ChatSession>> {
    state
        .workspaces
        .chat(state.chats.clone(), state.content.clone(), user_id)
        .await
}

/// The conversation so far. History is loaded from the store when the
/// session is first opened; later sends keep it current.
#[utoipa::path(
    get,
    path = "/chat",
    responses(
        (status = 200, description = "Transcript in send order", body = ChatResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Json<ChatResponse> {
    let session = session(&state, user_id).await;
    let guard = session.lock().await;

    Json(ChatResponse {
        reply: None,
        transcript: transcript_view(&guard),
    })
}

/// Send a message and wait for the assistant's reply.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and updated transcript", body = ChatResponse),
        (status = 400, description = "Blank message"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn send_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HandlerError> {
    let session = session(&state, user_id).await;
    let mut guard = session.lock().await;
    let reply = guard.send(&req.text).await.map_err(reject)?;

    Ok(Json(ChatResponse {
        reply: reply.as_ref().map(ChatMessageView::from),
        transcript: transcript_view(&guard),
    }))
}
