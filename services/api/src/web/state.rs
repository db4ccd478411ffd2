//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-user workspaces.

use placement_core::{
    Authenticator, ChatSession, ChatStore, ContentClient, DashboardPipeline, DashboardState,
    OnboardingPipeline, PortResult, UserStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub chats: Arc<dyn ChatStore>,
    pub auth: Authenticator,
    pub content: ContentClient,
    pub onboarding: OnboardingPipeline,
    pub dashboard: DashboardPipeline,
    pub workspaces: Arc<WorkspaceRegistry>,
}

//=========================================================================================
// Workspaces (Specific to One User)
//=========================================================================================

struct Slot<T> {
    value: Arc<Mutex<T>>,
    touched: Instant,
}

impl<T> Slot<T> {
    fn new(value: T) -> Self {
        Self {
            value: Arc::new(Mutex::new(value)),
            touched: Instant::now(),
        }
    }

    fn touch(&mut self) -> Arc<Mutex<T>> {
        self.touched = Instant::now();
        self.value.clone()
    }
}

/// In-memory view state for each signed-in user, shared by all of that user's
/// sessions. Dashboards and chat sessions are created on first use and evicted
/// by `sweep` once they have been idle for longer than the configured limit.
#[derive(Default)]
pub struct WorkspaceRegistry {
    dashboards: RwLock<HashMap<Uuid, Slot<DashboardState>>>,
    chats: RwLock<HashMap<Uuid, Slot<ChatSession>>>,
}

impl WorkspaceRegistry {
    /// Returns the user's dashboard, seeding a new one from their stored onboarding choices.
    pub async fn dashboard(
        &self,
        users: &dyn UserStore,
        user_id: Uuid,
    ) -> PortResult<Arc<Mutex<DashboardState>>> {
        if let Some(existing) = self.dashboards.write().await.get_mut(&user_id) {
            return Ok(existing.touch());
        }

        let user = users.get_user_by_id(user_id).await?;
        let mut dashboards = self.dashboards.write().await;
        let slot = dashboards.entry(user_id).or_insert_with(|| {
            info!("Creating dashboard workspace for user {}.", user_id);
            Slot::new(DashboardState::restored(user.category, &user.domains))
        });
        Ok(slot.touch())
    }

    /// Returns the user's chat session, loading the stored history the first time.
    pub async fn chat(
        &self,
        chats: Arc<dyn ChatStore>,
        content: ContentClient,
        user_id: Uuid,
    ) -> Arc<Mutex<ChatSession>> {
        if let Some(existing) = self.chats.write().await.get_mut(&user_id) {
            return existing.touch();
        }

        let mut session = ChatSession::new(user_id, chats, content);
        if let Err(e) = session.load().await {
            warn!("Could not load chat history for user {}: {}", user_id, e);
        }

        let mut sessions = self.chats.write().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Slot::new(session))
            .touch()
    }

    /// Drops every workspace untouched since `now - idle`. Returns how many went.
    pub async fn sweep(&self, idle: Duration, now: Instant) -> usize {
        let fresh = |touched: Instant| now.saturating_duration_since(touched) <= idle;

        let mut dashboards = self.dashboards.write().await;
        let mut chats = self.chats.write().await;
        let before = dashboards.len() + chats.len();
        dashboards.retain(|_, slot| fresh(slot.touched));
        chats.retain(|_, slot| fresh(slot.touched));
        before - dashboards.len() - chats.len()
    }

    /// Sweeps every `every` until the process exits.
    pub fn spawn_sweeper(self: Arc<Self>, idle: Duration, every: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = self.sweep(idle, Instant::now()).await;
                if evicted > 0 {
                    info!("Evicted {} idle workspaces.", evicted);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use placement_core::{
        domain::{NewUser, User, UserCategory, UserCredentials},
        PortError, Stage,
    };

    /// Serves a single onboarded user and counts lookups.
    struct OneUser {
        user: User,
        lookups: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl UserStore for OneUser {
        async fn create_user(&self, _: NewUser) -> PortResult<User> {
            Err(PortError::Unexpected("read-only".into()))
        }
        async fn get_user_by_email(&self, _: &str) -> PortResult<UserCredentials> {
            Err(PortError::Unexpected("read-only".into()))
        }
        async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
            self.lookups
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if user_id == self.user.user_id {
                Ok(self.user.clone())
            } else {
                Err(PortError::NotFound(user_id.to_string()))
            }
        }
        async fn save_onboarding(&self, _: Uuid, _: UserCategory, _: &[String]) -> PortResult<()> {
            Ok(())
        }
        async fn create_auth_session(&self, _: &str, _: Uuid, _: DateTime<Utc>) -> PortResult<()> {
            Ok(())
        }
        async fn validate_auth_session(&self, _: &str) -> PortResult<Uuid> {
            Err(PortError::Unauthorized)
        }
        async fn delete_auth_session(&self, _: &str) -> PortResult<()> {
            Ok(())
        }
    }

    fn onboarded_user() -> OneUser {
        OneUser {
            user: User {
                user_id: Uuid::new_v4(),
                email: "ana@example.com".into(),
                full_name: "Ana".into(),
                category: Some(UserCategory::Beginner),
                domains: vec!["DevOps".into()],
                created_at: Utc::now(),
            },
            lookups: Default::default(),
        }
    }

    #[tokio::test]
    async fn dashboard_is_seeded_once_and_reused() {
        let users = onboarded_user();
        let registry = WorkspaceRegistry::default();

        let first = registry.dashboard(&users, users.user.user_id).await.unwrap();
        let second = registry.dashboard(&users, users.user.user_id).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(users.lookups.load(std::sync::atomic::Ordering::SeqCst), 1);
        let guard = first.lock().await;
        assert_eq!(guard.stage(), Stage::Dashboard);
        assert_eq!(guard.domains().names(), ["DevOps"]);
    }

    #[tokio::test]
    async fn unknown_user_gets_no_dashboard() {
        let users = onboarded_user();
        let registry = WorkspaceRegistry::default();
        assert!(registry.dashboard(&users, Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn idle_workspaces_are_swept() {
        let users = onboarded_user();
        let registry = WorkspaceRegistry::default();
        let first = registry.dashboard(&users, users.user.user_id).await.unwrap();
        let idle = Duration::from_secs(60);

        assert_eq!(registry.sweep(idle, Instant::now()).await, 0);
        let later = Instant::now() + idle + Duration::from_secs(1);
        assert_eq!(registry.sweep(idle, later).await, 1);

        let second = registry.dashboard(&users, users.user.user_id).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(users.lookups.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn recent_use_keeps_a_workspace_alive() {
        let users = onboarded_user();
        let registry = WorkspaceRegistry::default();
        let idle = Duration::from_secs(60);
        let first = registry.dashboard(&users, users.user.user_id).await.unwrap();

        registry.dashboard(&users, users.user.user_id).await.unwrap();
        assert_eq!(registry.sweep(idle, Instant::now() + idle / 2).await, 0);

        let again = registry.dashboard(&users, users.user.user_id).await.unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
}
