pub mod auth;
pub mod calendar;
pub mod chat;
pub mod checklist;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod generation;
pub mod onboarding;
pub mod pipeline;
pub mod ports;
pub mod projects;
pub mod prompts;
pub mod quiz;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::Authenticator;
pub use chat::ChatSession;
pub use dashboard::{Action, DashboardState, GenerationToken, Outcome, Stage};
pub use domain::{
    ArtifactKind, ChatMessage, ChatRole, DomainSelection, NewUser,
    StoredChatMessage, User, UserCategory, UserCredentials, CATALOG_DOMAINS,
};
pub use error::{GuidanceError, GuidanceResult};
pub use generation::{ContentClient, CreditFigures};
pub use onboarding::{OnboardingPipeline, ProvisionReport};
pub use pipeline::DashboardPipeline;
pub use ports::{
    ChatStore, GenerationInput, GenerationRequest, PasswordHasher, PortError, PortResult,
    ResponseShape, TextGenerationService, UserStore,
};
pub use quiz::{parse_quiz, QuizItem};
