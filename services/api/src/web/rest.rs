//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for onboarding and the dashboard, the shared
//! error mapping, and the master definition for the OpenAPI specification.

use crate::web::{auth, chat, community, state::AppState};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use placement_core::{
    calendar::schedule_calendar, ArtifactKind, CreditFigures, DashboardState, GuidanceError,
    PortError, QuizItem, Stage, UserCategory, CATALOG_DOMAINS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        list_domains_handler,
        onboarding_handler,
        dashboard_handler,
        roadmap_handler,
        schedule_handler,
        courses_handler,
        openings_handler,
        portfolio_handler,
        key_concepts_handler,
        quiz_handler,
        credits_handler,
        calendar_handler,
        chat::history_handler,
        chat::send_handler,
        community::list_checklist_handler,
        community::add_checklist_handler,
        community::toggle_checklist_handler,
        community::remove_checklist_handler,
        community::list_projects_handler,
        community::publish_project_handler,
        community::like_project_handler,
    ),
    components(
        schemas(
            auth::SignupRequest, auth::LoginRequest, auth::AuthResponse,
            DomainsResponse, OnboardingRequest, OnboardingResponse, DashboardView,
            GeneratedResponse, OpeningsRequest, QuizRequest, QuizView, QuizResponse, CreditsRequest,
            chat::ChatRequest, chat::ChatMessageView, chat::ChatResponse,
            community::ChecklistRequest, community::ChecklistView,
            community::ProjectRequest, community::ProjectView, community::LikeResponse,
        )
    ),
    tags(
        (name = "PlacementPro API", description = "Career guidance: onboarding, generated learning content, chat and community.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared helpers
//=========================================================================================

pub type HandlerError = (StatusCode, String);

/// Maps a core error onto an HTTP status and a user-facing message.
pub fn reject(e: GuidanceError) -> HandlerError {
    match e {
        GuidanceError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        GuidanceError::MissingPrerequisite(message) => (StatusCode::CONFLICT, message),
        GuidanceError::Port(e) => reject_port(e),
    }
}

pub fn reject_port(e: PortError) -> HandlerError {
    match e {
        PortError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        PortError::Conflict(message) => (StatusCode::CONFLICT, message),
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Unexpected(message) => {
            error!("Unexpected port error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

/// Fetches (or creates) the caller's dashboard workspace.
pub async fn workspace(
    state: &AppState,
    user_id: Uuid,
) -> Result<Arc<Mutex<DashboardState>>, HandlerError> {
    state
        .workspaces
        .dashboard(state.users.as_ref(), user_id)
        .await
        .map_err(reject_port)
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct DomainsResponse {
    pub domains: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct OnboardingRequest {
    /// `beginner` or `veteran`.
    pub category: String,
    pub domains: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OnboardingResponse {
    pub courses: Option<String>,
    pub topics: Option<String>,
}

/// One generated artifact. `content` is null when nothing was generated.
#[derive(Serialize, ToSchema)]
pub struct GeneratedResponse {
    pub kind: String,
    pub content: Option<String>,
}

impl GeneratedResponse {
    fn new(kind: ArtifactKind, content: Option<String>) -> Json<Self> {
        Json(Self {
            kind: kind.as_str().to_string(),
            content,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct OpeningsRequest {
    pub location: String,
}

#[derive(Deserialize, ToSchema)]
pub struct QuizRequest {
    pub topic: String,
    pub language: String,
    pub level: String,
}

#[derive(Serialize, ToSchema)]
pub struct QuizView {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub solution: String,
    pub credits: f64,
}

impl From<&QuizItem> for QuizView {
    fn from(item: &QuizItem) -> Self {
        Self {
            question: item.question.clone(),
            options: item.options.clone(),
            correct_answer: item.correct_answer.clone(),
            solution: item.solution.clone(),
            credits: item.credits,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct QuizResponse {
    pub quiz: Option<QuizView>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreditsRequest {
    pub project: f64,
    pub contribution: f64,
    pub developer: f64,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardView {
    pub stage: String,
    pub category: Option<String>,
    pub domains: Vec<String>,
    pub sections: Vec<String>,
    pub loading: bool,
    pub artifacts: BTreeMap<String, String>,
    pub quiz: Option<QuizView>,
    pub checklist: Vec<community::ChecklistView>,
    pub projects: Vec<community::ProjectView>,
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        let stage = match state.stage() {
            Stage::AwaitingDomainSelection => "awaiting_domain_selection",
            Stage::Provisioning => "provisioning",
            Stage::Dashboard => "dashboard",
        };
        Self {
            stage: stage.to_string(),
            category: state.category().map(|c| c.as_str().to_string()),
            domains: state.domains().names().to_vec(),
            sections: state
                .category()
                .unwrap_or(UserCategory::Beginner)
                .sections()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            loading: state.is_loading(),
            artifacts: state
                .artifacts()
                .map(|(kind, text)| (kind.as_str().to_string(), text.to_string()))
                .collect(),
            quiz: state.quiz().map(QuizView::from),
            checklist: community::checklist_view(state),
            projects: community::projects_view(state),
        }
    }
}

//=========================================================================================
// Onboarding Handlers
//=========================================================================================

/// List the selectable domains.
#[utoipa::path(
    get,
    path = "/domains",
    responses((status = 200, description = "Domain catalog", body = DomainsResponse))
)]
pub async fn list_domains_handler() -> Json<DomainsResponse> {
    Json(DomainsResponse {
        domains: CATALOG_DOMAINS.iter().map(|d| d.to_string()).collect(),
    })
}

/// Confirm the category and domains, then provision courses and domain topics.
#[utoipa::path(
    post,
    path = "/onboarding",
    request_body = OnboardingRequest,
    responses(
        (status = 200, description = "Provisioning finished", body = OnboardingResponse),
        (status = 400, description = "Unknown category or empty domain selection"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn onboarding_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, HandlerError> {
    let category = UserCategory::parse(&req.category).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown category '{}'", req.category),
        )
    })?;
    let dashboard = workspace(&state, user_id).await?;

    let report = state
        .onboarding
        .provision(&dashboard, category, &req.domains)
        .await
        .map_err(reject)?;

    let domains = dashboard.lock().await.domains().names().to_vec();
    if let Err(e) = state.users.save_onboarding(user_id, category, &domains).await {
        error!("Failed to save onboarding for user {}: {}", user_id, e);
    }

    Ok(Json(OnboardingResponse {
        courses: report.courses,
        topics: report.topics,
    }))
}

//=========================================================================================
// Dashboard Handlers
//=========================================================================================

/// Snapshot of the caller's dashboard.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Current dashboard state", body = DashboardView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<DashboardView>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let view = DashboardView::from(&*dashboard.lock().await);
    Ok(Json(view))
}

/// Generate the roadmap; key concepts are refreshed afterwards.
#[utoipa::path(
    post,
    path = "/dashboard/roadmap",
    responses(
        (status = 200, description = "Roadmap (null content if nothing was generated)", body = GeneratedResponse),
        (status = 400, description = "No domains selected")
    )
)]
pub async fn roadmap_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_roadmap(&dashboard)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::Roadmap, content))
}

/// Generate the study schedule from the stored roadmap.
#[utoipa::path(
    post,
    path = "/dashboard/schedule",
    responses(
        (status = 200, description = "Schedule", body = GeneratedResponse),
        (status = 409, description = "No roadmap generated yet")
    )
)]
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_schedule(&dashboard)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::Schedule, content))
}

#[utoipa::path(
    post,
    path = "/dashboard/courses",
    responses((status = 200, description = "Course list", body = GeneratedResponse))
)]
pub async fn courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_courses(&dashboard)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::Courses, content))
}

#[utoipa::path(
    post,
    path = "/dashboard/openings",
    request_body = OpeningsRequest,
    responses(
        (status = 200, description = "Job openings near the location", body = GeneratedResponse),
        (status = 400, description = "Missing location")
    )
)]
pub async fn openings_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<OpeningsRequest>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_job_openings(&dashboard, &req.location)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::JobOpenings, content))
}

#[utoipa::path(
    post,
    path = "/dashboard/portfolio",
    responses((status = 200, description = "LinkedIn portfolio copy", body = GeneratedResponse))
)]
pub async fn portfolio_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_portfolio(&dashboard)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::Portfolio, content))
}

#[utoipa::path(
    post,
    path = "/dashboard/key-concepts",
    responses((status = 200, description = "Key concepts", body = GeneratedResponse))
)]
pub async fn key_concepts_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let content = state
        .dashboard
        .request_key_concepts(&dashboard)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::KeyConcepts, content))
}

/// Generate one quiz question. Answers are not graded and credits are not applied.
#[utoipa::path(
    post,
    path = "/dashboard/quiz",
    request_body = QuizRequest,
    responses(
        (status = 200, description = "Quiz item (null if nothing was generated)", body = QuizResponse),
        (status = 400, description = "Missing topic, language or level")
    )
)]
pub async fn quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let quiz = state
        .dashboard
        .request_quiz(&dashboard, &req.topic, &req.language, &req.level)
        .await
        .map_err(reject)?;
    Ok(Json(QuizResponse {
        quiz: quiz.as_ref().map(QuizView::from),
    }))
}

#[utoipa::path(
    post,
    path = "/dashboard/credits",
    request_body = CreditsRequest,
    responses((status = 200, description = "Credit standing analysis", body = GeneratedResponse))
)]
pub async fn credits_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreditsRequest>,
) -> Result<Json<GeneratedResponse>, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let figures = CreditFigures {
        project: req.project,
        contribution: req.contribution,
        developer: req.developer,
    };
    let content = state
        .dashboard
        .request_credit_analysis(&dashboard, figures)
        .await
        .map_err(reject)?;
    Ok(GeneratedResponse::new(ArtifactKind::CreditAnalysis, content))
}

/// Download the schedule as an iCalendar file.
#[utoipa::path(
    get,
    path = "/dashboard/schedule.ics",
    responses(
        (status = 200, description = "text/calendar attachment"),
        (status = 409, description = "No schedule generated yet")
    )
)]
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let dashboard = workspace(&state, user_id).await?;
    let ics = {
        let guard = dashboard.lock().await;
        let schedule = guard.artifact(ArtifactKind::Schedule).ok_or_else(|| {
            reject(GuidanceError::MissingPrerequisite(
                "Generate a schedule first".to_string(),
            ))
        })?;
        schedule_calendar(guard.domains(), schedule, Utc::now()).map_err(reject)?
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"schedule.ics\"",
            ),
        ],
        ics,
    ))
}
