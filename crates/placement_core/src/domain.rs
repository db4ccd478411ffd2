//! crates/placement_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The technology tracks a user can pick during onboarding.
pub const CATALOG_DOMAINS: [&str; 11] = [
    "Web Development",
    "Cyber Security",
    "Block Chain",
    "IOT",
    "Cloud Computing",
    "Machine Learning",
    "Agentic AI",
    "DevOps",
    "Android Development",
    "Data Analytics",
    "Game Development",
];

//=========================================================================================
// Users
//=========================================================================================

/// Whether the user is starting out or already working in tech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserCategory {
    Beginner,
    Veteran,
}

impl UserCategory {
    /// Dashboard sections shown to this category.
    pub fn sections(self) -> &'static [&'static str] {
        match self {
            UserCategory::Beginner => &[
                "roadmap",
                "schedule",
                "checklist",
                "courses",
                "openings",
                "portfolio",
                "communication",
                "quiz",
                "community",
            ],
            UserCategory::Veteran => &["portfolio", "communication", "quiz", "community"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserCategory::Beginner => "beginner",
            UserCategory::Veteran => "veteran",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(UserCategory::Beginner),
            "veteran" => Some(UserCategory::Veteran),
            _ => None,
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub category: Option<UserCategory>,
    pub domains: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// The data needed to insert a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// One line of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// A chat message as persisted for a user.
#[derive(Debug, Clone)]
pub struct StoredChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: ChatMessage,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Domain selection
//=========================================================================================

/// An insertion-ordered set of domain names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSelection {
    names: Vec<String>,
}

impl DomainSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a domain. Returns `false` if the name was blank or already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Adds the domain if absent, removes it otherwise.
    pub fn toggle(&mut self, name: &str) {
        let name = name.trim();
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
        } else {
            self.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Comma-separated display form, e.g. `"Cloud Computing, DevOps"`.
    pub fn joined(&self) -> String {
        self.names.join(", ")
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = DomainSelection::new();
        for name in iter {
            selection.insert(name.as_ref());
        }
        selection
    }
}

//=========================================================================================
// Generated artifacts
//=========================================================================================

/// Each kind of content the generation service produces. One state slot per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Roadmap,
    Schedule,
    Courses,
    JobOpenings,
    Portfolio,
    KeyConcepts,
    DomainTopics,
    CreditAnalysis,
    Quiz,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Roadmap => "roadmap",
            ArtifactKind::Schedule => "schedule",
            ArtifactKind::Courses => "courses",
            ArtifactKind::JobOpenings => "job_openings",
            ArtifactKind::Portfolio => "portfolio",
            ArtifactKind::KeyConcepts => "key_concepts",
            ArtifactKind::DomainTopics => "domain_topics",
            ArtifactKind::CreditAnalysis => "credit_analysis",
            ArtifactKind::Quiz => "quiz",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_ignores_blanks_and_duplicates() {
        let mut selection = DomainSelection::new();
        assert!(selection.insert(" DevOps "));
        assert!(!selection.insert("DevOps"));
        assert!(!selection.insert("   "));
        assert!(selection.insert("IOT"));
        assert_eq!(selection.names(), ["DevOps", "IOT"]);
        assert_eq!(selection.joined(), "DevOps, IOT");
    }

    #[test]
    fn toggle_removes_then_re_adds_at_the_end() {
        let mut selection: DomainSelection = ["A", "B"].into_iter().collect();
        selection.toggle("A");
        assert_eq!(selection.names(), ["B"]);
        selection.toggle("A");
        assert_eq!(selection.names(), ["B", "A"]);
    }

    #[test]
    fn veterans_skip_the_learning_sections() {
        assert!(UserCategory::Beginner.sections().contains(&"roadmap"));
        assert!(!UserCategory::Veteran.sections().contains(&"roadmap"));
        assert_eq!(UserCategory::parse("Veteran"), Some(UserCategory::Veteran));
        assert_eq!(UserCategory::parse("expert"), None);
    }
}
