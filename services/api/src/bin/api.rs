//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{Argon2Hasher, DbAdapter, OpenAiGenerationAdapter},
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, logout_handler, signup_handler, SESSION_DAYS},
        chat, community,
        rest::{self, ApiDoc},
        require_auth, AppState, WorkspaceRegistry,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use placement_core::{
    Authenticator, ChatStore, ContentClient, DashboardPipeline, OnboardingPipeline,
    TextGenerationService, UserStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let api_key = config
        .gemini_api_key
        .as_ref()
        .ok_or_else(|| ApiError::Internal("GEMINI_API_KEY is required".to_string()))?;
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(&config.generation_api_base);
    let generator: Arc<dyn TextGenerationService> = Arc::new(OpenAiGenerationAdapter::new(
        Client::with_config(openai_config),
        config.generation_model.clone(),
    ));
    info!(
        "Generation model '{}' at {}",
        config.generation_model, config.generation_api_base
    );

    let users: Arc<dyn UserStore> = db_adapter.clone();
    let chats: Arc<dyn ChatStore> = db_adapter;
    let content = ContentClient::new(generator);

    // --- 4. Build the Shared AppState ---
    let workspaces = Arc::new(WorkspaceRegistry::default());
    let app_state = Arc::new(AppState {
        users: users.clone(),
        chats,
        auth: Authenticator::new(users, Arc::new(Argon2Hasher::new())),
        content: content.clone(),
        onboarding: OnboardingPipeline::new(content.clone()),
        dashboard: DashboardPipeline::new(content),
        workspaces: workspaces.clone(),
    });

    // Workspaces idle for longer than a session can live are unreachable.
    workspaces.spawn_sweeper(
        Duration::from_secs(SESSION_DAYS as u64 * 24 * 60 * 60),
        Duration::from_secs(60 * 60),
    );

    // --- 5. CORS ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/domains", get(rest::list_domains_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/onboarding", post(rest::onboarding_handler))
        .route("/dashboard", get(rest::dashboard_handler))
        .route("/dashboard/roadmap", post(rest::roadmap_handler))
        .route("/dashboard/schedule", post(rest::schedule_handler))
        .route("/dashboard/schedule.ics", get(rest::calendar_handler))
        .route("/dashboard/courses", post(rest::courses_handler))
        .route("/dashboard/openings", post(rest::openings_handler))
        .route("/dashboard/portfolio", post(rest::portfolio_handler))
        .route("/dashboard/key-concepts", post(rest::key_concepts_handler))
        .route("/dashboard/quiz", post(rest::quiz_handler))
        .route("/dashboard/credits", post(rest::credits_handler))
        .route(
            "/chat",
            get(chat::history_handler).post(chat::send_handler),
        )
        .route(
            "/checklist",
            get(community::list_checklist_handler).post(community::add_checklist_handler),
        )
        .route(
            "/checklist/{id}/toggle",
            post(community::toggle_checklist_handler),
        )
        .route("/checklist/{id}", delete(community::remove_checklist_handler))
        .route(
            "/projects",
            get(community::list_projects_handler).post(community::publish_project_handler),
        )
        .route("/projects/{id}/like", post(community::like_project_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
