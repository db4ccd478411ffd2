//! crates/placement_core/src/onboarding.rs
//!
//! Provisioning run once the user confirms their domains: the course list is
//! generated first and then handed to the domain-topic call as context.

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::dashboard::{Action, DashboardState, Stage};
use crate::domain::{ArtifactKind, DomainSelection, UserCategory};
use crate::error::{GuidanceError, GuidanceResult};
use crate::generation::ContentClient;
use crate::pipeline::{begin, finish_text};

/// What provisioning produced. Either field is `None` when its call yielded nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub courses: Option<String>,
    pub topics: Option<String>,
}

#[derive(Clone)]
pub struct OnboardingPipeline {
    content: ContentClient,
}

impl OnboardingPipeline {
    pub fn new(content: ContentClient) -> Self {
        Self { content }
    }

    /// Moves the state through `Provisioning` to `Dashboard`. Generation failures
    /// do not stop the transition.
    pub async fn provision(
        &self,
        state: &Mutex<DashboardState>,
        category: UserCategory,
        domains: &[String],
    ) -> GuidanceResult<ProvisionReport> {
        let selection: DomainSelection = domains.iter().collect();
        if selection.is_empty() {
            return Err(GuidanceError::Validation(
                "Select at least one domain".to_string(),
            ));
        }

        {
            let mut guard = state.lock().await;
            guard.dispatch(Action::CategorySelected(category))?;
            guard.dispatch(Action::DomainsReplaced(selection.names().to_vec()))?;
            guard.dispatch(Action::StageChanged(Stage::Provisioning))?;
        }
        info!("Provisioning content for {}.", selection.joined());

        let report = self.generate(state, &selection).await;

        state
            .lock()
            .await
            .dispatch(Action::StageChanged(Stage::Dashboard))?;

        match &report {
            Ok(r) if r.courses.is_none() || r.topics.is_none() => {
                warn!("Onboarding finished with missing content; continuing to the dashboard.");
            }
            Err(e) => warn!("Onboarding generation failed: {}", e),
            Ok(_) => info!("Onboarding content ready."),
        }
        Ok(report.unwrap_or_default())
    }

    async fn generate(
        &self,
        state: &Mutex<DashboardState>,
        selection: &DomainSelection,
    ) -> GuidanceResult<ProvisionReport> {
        let token = begin(state, ArtifactKind::Courses).await?;
        let courses = self.content.courses(selection).await;
        let courses = finish_text(state, token, courses).await?;

        let context = courses.clone().unwrap_or_default();
        let token = begin(state, ArtifactKind::DomainTopics).await?;
        let topics = self.content.domain_topics(selection, &context).await;
        let topics = finish_text(state, token, topics).await?;

        Ok(ProvisionReport { courses, topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GenerationInput;
    use crate::testing::ScriptedGenerator;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn topics_call_receives_the_course_list() {
        let generator = ScriptedGenerator::by_prompt(&[
            ("online courses", "X"),
            ("core topics", "TOPICS"),
        ]);
        let pipeline = OnboardingPipeline::new(ContentClient::new(generator.clone()));
        let state = Mutex::new(DashboardState::new());

        let report = pipeline
            .provision(&state, UserCategory::Beginner, &names(&["Cloud Computing"]))
            .await
            .unwrap();

        assert_eq!(report.courses.as_deref(), Some("X"));
        assert_eq!(report.topics.as_deref(), Some("TOPICS"));

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        match (&requests[0].input, &requests[1].input) {
            (GenerationInput::Prompt(first), GenerationInput::Prompt(second)) => {
                assert!(first.contains("online courses"));
                assert!(second.contains("core topics"));
                assert!(second.contains("X"));
            }
            other => panic!("unexpected inputs: {:?}", other),
        }

        let guard = state.lock().await;
        assert_eq!(guard.stage(), Stage::Dashboard);
        assert_eq!(guard.artifact(ArtifactKind::DomainTopics), Some("TOPICS"));
    }

    #[tokio::test]
    async fn empty_selection_changes_nothing() {
        let generator = ScriptedGenerator::always("x");
        let pipeline = OnboardingPipeline::new(ContentClient::new(generator.clone()));
        let state = Mutex::new(DashboardState::new());

        let err = pipeline
            .provision(&state, UserCategory::Beginner, &names(&["  "]))
            .await
            .unwrap_err();

        assert!(matches!(err, GuidanceError::Validation(_)));
        assert_eq!(generator.call_count(), 0);
        let guard = state.lock().await;
        assert_eq!(guard.stage(), Stage::AwaitingDomainSelection);
        assert!(guard.category().is_none());
    }

    #[tokio::test]
    async fn failures_still_reach_the_dashboard() {
        let generator = ScriptedGenerator::failing();
        let pipeline = OnboardingPipeline::new(ContentClient::new(generator.clone()));
        let state = Mutex::new(DashboardState::new());

        let report = pipeline
            .provision(&state, UserCategory::Veteran, &names(&["DevOps"]))
            .await
            .unwrap();

        assert_eq!(report, ProvisionReport::default());
        assert_eq!(generator.call_count(), 2);
        let guard = state.lock().await;
        assert_eq!(guard.stage(), Stage::Dashboard);
        assert!(!guard.is_loading());
    }
}
