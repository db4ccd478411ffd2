//! crates/placement_core/src/testing.rs
//!
//! In-memory implementations of every port, for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    ChatMessage, NewUser, StoredChatMessage, User, UserCategory, UserCredentials,
};
use crate::ports::{
    ChatStore, GenerationInput, GenerationRequest, PasswordHasher, PortError, PortResult,
    TextGenerationService, UserStore,
};

//=========================================================================================
// Generation
//=========================================================================================

type Responder = Box<dyn Fn(&GenerationRequest) -> PortResult<String> + Send + Sync>;

/// Records every request and answers it with a scripted closure.
pub struct ScriptedGenerator {
    respond: Responder,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(
        respond: impl Fn(&GenerationRequest) -> PortResult<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(PortError::Unexpected("service unavailable".to_string())))
    }

    /// Answers with the reply of the first `(needle, reply)` whose needle occurs in the
    /// prompt; fails when none match.
    pub fn by_prompt(rules: &[(&str, &str)]) -> Arc<Self> {
        let rules: Vec<(String, String)> = rules
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect();
        Self::new(move |request| {
            let text = prompt_text(request);
            rules
                .iter()
                .find(|(needle, _)| text.contains(needle.as_str()))
                .map(|(_, reply)| Ok(reply.clone()))
                .unwrap_or_else(|| Err(PortError::Unexpected("no scripted reply".to_string())))
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().iter().map(prompt_text).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn prompt_text(request: &GenerationRequest) -> String {
    match &request.input {
        GenerationInput::Prompt(p) => p.clone(),
        GenerationInput::Conversation(messages) => messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[async_trait]
impl TextGenerationService for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(&request)
    }
}

//=========================================================================================
// Chat store
//=========================================================================================

#[derive(Default)]
pub struct MemoryChatStore {
    messages: Mutex<Vec<StoredChatMessage>>,
    fail_writes: bool,
}

impl MemoryChatStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting_writes() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            fail_writes: true,
        })
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn append_message(
        &self,
        user_id: Uuid,
        message: &ChatMessage,
    ) -> PortResult<StoredChatMessage> {
        if self.fail_writes {
            return Err(PortError::Unexpected("store offline".to_string()));
        }
        let mut messages = self.messages.lock().unwrap();
        // Strictly increasing timestamps so ordering is observable.
        let created_at = Utc::now() + Duration::milliseconds(messages.len() as i64);
        let stored = StoredChatMessage {
            id: Uuid::new_v4(),
            user_id,
            message: message.clone(),
            created_at,
        };
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, user_id: Uuid) -> PortResult<Vec<StoredChatMessage>> {
        let mut found: Vec<StoredChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.created_at);
        Ok(found)
    }
}

//=========================================================================================
// User store
//=========================================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, (User, String)>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl MemoryUserStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|(u, _)| u.email == new_user.email) {
            return Err(PortError::Conflict(new_user.email));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            email: new_user.email,
            full_name: new_user.full_name,
            category: None,
            domains: Vec::new(),
            created_at: Utc::now(),
        };
        users.insert(user.user_id, (user.clone(), new_user.password_hash));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.user_id,
                email: u.email.clone(),
                password_hash: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn save_onboarding(
        &self,
        user_id: Uuid,
        category: UserCategory,
        domains: &[String],
    ) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let (user, _) = users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        user.category = Some(category);
        user.domains = domains.to_vec();
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.sessions.lock().unwrap().get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// Password hashing
//=========================================================================================

/// Reversible "hash" so tests can assert that the stored value is not the password.
pub struct ReversedHasher;

impl PasswordHasher for ReversedHasher {
    fn hash(&self, plain: &str) -> PortResult<String> {
        Ok(format!("rev${}", plain.chars().rev().collect::<String>()))
    }

    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool> {
        let stored = hash
            .strip_prefix("rev$")
            .ok_or_else(|| PortError::Unexpected("malformed hash".to_string()))?;
        Ok(stored.chars().rev().collect::<String>() == plain)
    }
}
