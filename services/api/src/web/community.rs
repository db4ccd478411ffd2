//! services/api/src/web/community.rs
//!
//! The checklist and the project board. Both belong to the caller's own
//! dashboard, so only the caller sees or likes their projects. They are
//! mutated only through dashboard actions.

use crate::web::{
    rest::{reject, reject_port, workspace, HandlerError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use placement_core::{
    checklist::ChecklistEntry, projects::Project, Action, DashboardState, Outcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ChecklistRequest {
    pub text: String,
    /// Comma-separated key points.
    #[serde(default)]
    pub key_points: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChecklistView {
    pub id: u64,
    pub text: String,
    pub done: bool,
    pub key_points: Vec<String>,
}

impl From<&ChecklistEntry> for ChecklistView {
    fn from(entry: &ChecklistEntry) -> Self {
        Self {
            id: entry.id,
            text: entry.text.clone(),
            done: entry.done,
            key_points: entry.key_points.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub github_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub github_url: String,
    pub likes: u32,
    pub author: String,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            github_url: project.github_url.clone(),
            likes: project.likes,
            author: project.author.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LikeResponse {
    /// False when the caller had already liked the project.
    pub counted: bool,
    pub likes: u32,
}

pub(crate) fn checklist_view(state: &DashboardState) -> Vec<ChecklistView> {
    state
        .checklist()
        .entries()
        .iter()
        .map(ChecklistView::from)
        .collect()
}

pub(crate) fn projects_view(state: &DashboardState) -> Vec<ProjectView> {
    state
        .projects()
        .projects()
        .iter()
        .map(ProjectView::from)
        .collect()
}

//=========================================================================================
// Checklist Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/checklist",
    responses((status = 200, description = "Checklist entries", body = [ChecklistView]))
)]
pub async fn list_checklist_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ChecklistView>>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let guard = dashboard.lock().await;
    Ok(Json(checklist_view(&guard)))
}

#[utoipa::path(
    post,
    path = "/checklist",
    request_body = ChecklistRequest,
    responses(
        (status = 201, description = "Entry added; full checklist returned", body = [ChecklistView]),
        (status = 400, description = "Blank task text")
    )
)]
pub async fn add_checklist_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChecklistRequest>,
) -> Result<(StatusCode, Json<Vec<ChecklistView>>), HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let mut guard = dashboard.lock().await;
    guard
        .dispatch(Action::ChecklistAdded {
            text: req.text,
            key_points: req.key_points,
        })
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(checklist_view(&guard))))
}

#[utoipa::path(
    post,
    path = "/checklist/{id}/toggle",
    params(("id" = u64, Path, description = "Checklist entry id")),
    responses(
        (status = 200, description = "Entry toggled", body = [ChecklistView]),
        (status = 400, description = "Unknown entry")
    )
)]
pub async fn toggle_checklist_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<ChecklistView>>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let mut guard = dashboard.lock().await;
    guard
        .dispatch(Action::ChecklistToggled(id))
        .map_err(reject)?;
    Ok(Json(checklist_view(&guard)))
}

#[utoipa::path(
    delete,
    path = "/checklist/{id}",
    params(("id" = u64, Path, description = "Checklist entry id")),
    responses(
        (status = 200, description = "Entry removed", body = [ChecklistView]),
        (status = 400, description = "Unknown entry")
    )
)]
pub async fn remove_checklist_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<ChecklistView>>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let mut guard = dashboard.lock().await;
    guard
        .dispatch(Action::ChecklistRemoved(id))
        .map_err(reject)?;
    Ok(Json(checklist_view(&guard)))
}

//=========================================================================================
// Project Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/projects",
    responses((status = 200, description = "Published projects", body = [ProjectView]))
)]
pub async fn list_projects_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ProjectView>>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let guard = dashboard.lock().await;
    Ok(Json(projects_view(&guard)))
}

/// Publish a project. The author is the caller's full name.
#[utoipa::path(
    post,
    path = "/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project published", body = [ProjectView]),
        (status = 400, description = "Missing name or description")
    )
)]
pub async fn publish_project_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<Vec<ProjectView>>), HandlerError> {
    let author = state
        .users
        .get_user_by_id(user_id)
        .await
        .map_err(reject_port)?
        .full_name;

    let dashboard = workspace(&state, user_id).await?;
    let mut guard = dashboard.lock().await;
    guard
        .dispatch(Action::ProjectPublished {
            name: req.name,
            description: req.description,
            github_url: req.github_url,
            author,
        })
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(projects_view(&guard))))
}

/// Like a project. Repeated likes from the same user are not counted.
#[utoipa::path(
    post,
    path = "/projects/{id}/like",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Like recorded (or already present)", body = LikeResponse),
        (status = 400, description = "Unknown project")
    )
)]
pub async fn like_project_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<LikeResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let mut guard = dashboard.lock().await;
    let outcome = guard
        .dispatch(Action::ProjectLiked {
            project_id,
            actor: user_id.to_string(),
        })
        .map_err(reject)?;

    let likes = guard
        .projects()
        .projects()
        .iter()
        .find(|p| p.id == project_id)
        .map(|p| p.likes)
        .unwrap_or_default();

    Ok(Json(LikeResponse {
        counted: outcome == Outcome::Updated,
        likes,
    }))
}
