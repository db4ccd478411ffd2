//! crates/placement_core/src/dashboard.rs
//!
//! The per-user dashboard state container. Every mutation goes through
//! `DashboardState::dispatch` with a typed `Action`.
//!
//! Generation results are guarded by per-kind tokens: requesting a kind issues a
//! new, strictly increasing sequence number, and a result is committed only if it
//! carries the latest number issued for that kind. An older response that arrives
//! after a newer request is dropped, whatever order the network delivers them in.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::checklist::Checklist;
use crate::domain::{ArtifactKind, DomainSelection, UserCategory};
use crate::error::GuidanceResult;
use crate::projects::ProjectBoard;
use crate::quiz::QuizItem;

/// Where the user is in the onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    AwaitingDomainSelection,
    Provisioning,
    Dashboard,
}

/// Identifies one in-flight generation for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken {
    pub kind: ArtifactKind,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub enum Action {
    CategorySelected(UserCategory),
    DomainToggled(String),
    DomainsReplaced(Vec<String>),
    StageChanged(Stage),
    GenerationRequested(ArtifactKind),
    GenerationReceived {
        token: GenerationToken,
        text: Option<String>,
    },
    /// `None` (or an empty record) means nothing was generated.
    QuizReceived {
        token: GenerationToken,
        quiz: Option<QuizItem>,
    },
    ChecklistAdded {
        text: String,
        key_points: String,
    },
    ChecklistToggled(u64),
    ChecklistRemoved(u64),
    ProjectPublished {
        name: String,
        description: String,
        github_url: String,
        author: String,
    },
    ProjectLiked {
        project_id: Uuid,
        actor: String,
    },
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    /// A generation was started; the result must be delivered with this token.
    Issued(GenerationToken),
    /// The result belonged to a superseded request and was dropped.
    Stale,
    /// The action was valid but changed nothing (e.g. a repeated like).
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    stage: Stage,
    category: Option<UserCategory>,
    domains: DomainSelection,
    artifacts: BTreeMap<ArtifactKind, String>,
    quiz: Option<QuizItem>,
    issued: BTreeMap<ArtifactKind, u64>,
    pending: BTreeMap<ArtifactKind, u64>,
    checklist: Checklist,
    projects: ProjectBoard,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the state from a stored onboarding selection. A user who already
    /// picked domains lands directly on the dashboard.
    pub fn restored(category: Option<UserCategory>, domains: &[String]) -> Self {
        let domains: DomainSelection = domains.iter().collect();
        let stage = if domains.is_empty() {
            Stage::AwaitingDomainSelection
        } else {
            Stage::Dashboard
        };
        Self {
            stage,
            category,
            domains,
            ..Self::default()
        }
    }

    pub fn dispatch(&mut self, action: Action) -> GuidanceResult<Outcome> {
        let outcome = match action {
            Action::CategorySelected(category) => {
                self.category = Some(category);
                Outcome::Updated
            }
            Action::DomainToggled(name) => {
                self.domains.toggle(&name);
                Outcome::Updated
            }
            Action::DomainsReplaced(names) => {
                self.domains = names.iter().collect();
                Outcome::Updated
            }
            Action::StageChanged(stage) => {
                self.stage = stage;
                Outcome::Updated
            }
            Action::GenerationRequested(kind) => {
                let seq = self.issued.entry(kind).or_insert(0);
                *seq += 1;
                self.pending.insert(kind, *seq);
                Outcome::Issued(GenerationToken { kind, seq: *seq })
            }
            Action::GenerationReceived { token, text } => {
                if !self.settle(token) {
                    return Ok(Outcome::Stale);
                }
                match text {
                    Some(text) => {
                        self.artifacts.insert(token.kind, text);
                        Outcome::Updated
                    }
                    None => Outcome::Unchanged,
                }
            }
            Action::QuizReceived { token, quiz } => {
                if !self.settle(token) {
                    return Ok(Outcome::Stale);
                }
                match quiz.filter(|q| !q.is_empty()) {
                    Some(quiz) => {
                        self.quiz = Some(quiz);
                        Outcome::Updated
                    }
                    None => Outcome::Unchanged,
                }
            }
            Action::ChecklistAdded { text, key_points } => {
                self.checklist.add(&text, &key_points)?;
                Outcome::Updated
            }
            Action::ChecklistToggled(id) => {
                self.checklist.toggle(id)?;
                Outcome::Updated
            }
            Action::ChecklistRemoved(id) => {
                self.checklist.remove(id)?;
                Outcome::Updated
            }
            Action::ProjectPublished {
                name,
                description,
                github_url,
                author,
            } => {
                self.projects
                    .publish(&name, &description, &github_url, &author)?;
                Outcome::Updated
            }
            Action::ProjectLiked { project_id, actor } => {
                if self.projects.like(project_id, &actor)? {
                    Outcome::Updated
                } else {
                    Outcome::Unchanged
                }
            }
        };
        Ok(outcome)
    }

    /// Clears the pending marker if `token` is the latest for its kind.
    fn settle(&mut self, token: GenerationToken) -> bool {
        if self.issued.get(&token.kind) != Some(&token.seq) {
            return false;
        }
        self.pending.remove(&token.kind);
        true
    }

    /// True while any kind has an outstanding latest request.
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, kind: ArtifactKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn category(&self) -> Option<UserCategory> {
        self.category
    }

    pub fn domains(&self) -> &DomainSelection {
        &self.domains
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&str> {
        self.artifacts.get(&kind).map(String::as_str)
    }

    pub fn artifacts(&self) -> impl Iterator<Item = (ArtifactKind, &str)> {
        self.artifacts.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn quiz(&self) -> Option<&QuizItem> {
        self.quiz.as_ref()
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn projects(&self) -> &ProjectBoard {
        &self.projects
    }
}
