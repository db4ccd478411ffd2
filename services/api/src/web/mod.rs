pub mod auth;
pub mod chat;
pub mod community;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::{AppState, WorkspaceRegistry};
