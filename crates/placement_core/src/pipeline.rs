//! crates/placement_core/src/pipeline.rs
//!
//! User-triggered dashboard actions. Each one snapshots its inputs from the
//! state container, releases the lock, performs its generation call(s) and then
//! delivers the result back through a `GenerationToken`.

use tokio::sync::Mutex;
use tracing::info;

use crate::dashboard::{Action, DashboardState, GenerationToken, Outcome};
use crate::domain::{ArtifactKind, DomainSelection, UserCategory};
use crate::error::{require, GuidanceError, GuidanceResult};
use crate::generation::{ContentClient, CreditFigures};
use crate::quiz::QuizItem;

pub const ROADMAP_REQUIRED: &str = "Generate a roadmap first, then build the schedule from it.";

#[derive(Clone)]
pub struct DashboardPipeline {
    content: ContentClient,
}

impl DashboardPipeline {
    pub fn new(content: ContentClient) -> Self {
        Self { content }
    }

    /// Generates the roadmap, then re-derives the key concepts from the current
    /// course list.
    pub async fn request_roadmap(
        &self,
        state: &Mutex<DashboardState>,
    ) -> GuidanceResult<Option<String>> {
        let domains = selected_domains(state).await?;

        let token = begin(state, ArtifactKind::Roadmap).await?;
        let roadmap = self.content.roadmap(&domains).await;
        let roadmap = finish_text(state, token, roadmap).await?;

        self.request_key_concepts(state).await?;
        Ok(roadmap)
    }

    pub async fn request_key_concepts(
        &self,
        state: &Mutex<DashboardState>,
    ) -> GuidanceResult<Option<String>> {
        let (domains, courses) = {
            let guard = state.lock().await;
            let courses = guard
                .artifact(ArtifactKind::Courses)
                .unwrap_or_default()
                .to_string();
            (non_empty(guard.domains())?, courses)
        };

        let token = begin(state, ArtifactKind::KeyConcepts).await?;
        let concepts = self.content.key_concepts(&domains, &courses).await;
        finish_text(state, token, concepts).await
    }

    /// Rejected without any call when no roadmap has been generated yet.
    pub async fn request_schedule(
        &self,
        state: &Mutex<DashboardState>,
    ) -> GuidanceResult<Option<String>> {
        let (domains, roadmap) = {
            let guard = state.lock().await;
            let domains = non_empty(guard.domains())?;
            let roadmap = guard
                .artifact(ArtifactKind::Roadmap)
                .filter(|r| !r.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| GuidanceError::MissingPrerequisite(ROADMAP_REQUIRED.to_string()))?;
            (domains, roadmap)
        };

        let token = begin(state, ArtifactKind::Schedule).await?;
        let schedule = self.content.schedule(&domains, &roadmap).await;
        finish_text(state, token, schedule).await
    }

    pub async fn request_courses(
        &self,
        state: &Mutex<DashboardState>,
    ) -> GuidanceResult<Option<String>> {
        let domains = selected_domains(state).await?;
        let token = begin(state, ArtifactKind::Courses).await?;
        let courses = self.content.courses(&domains).await;
        finish_text(state, token, courses).await
    }

    pub async fn request_job_openings(
        &self,
        state: &Mutex<DashboardState>,
        location: &str,
    ) -> GuidanceResult<Option<String>> {
        require(location, "Location")?;
        let domains = selected_domains(state).await?;
        let token = begin(state, ArtifactKind::JobOpenings).await?;
        let openings = self.content.job_openings(&domains, location).await;
        finish_text(state, token, openings).await
    }

    pub async fn request_portfolio(
        &self,
        state: &Mutex<DashboardState>,
    ) -> GuidanceResult<Option<String>> {
        let (domains, category) = {
            let guard = state.lock().await;
            let category = guard.category().unwrap_or(UserCategory::Beginner);
            (non_empty(guard.domains())?, category)
        };
        let token = begin(state, ArtifactKind::Portfolio).await?;
        let portfolio = self.content.portfolio(category, &domains).await;
        finish_text(state, token, portfolio).await
    }

    /// Returns `None` when nothing was generated or a newer quiz request
    /// superseded this one. The previous quiz stays in state either way.
    pub async fn request_quiz(
        &self,
        state: &Mutex<DashboardState>,
        topic: &str,
        language: &str,
        level: &str,
    ) -> GuidanceResult<Option<QuizItem>> {
        require(topic, "Quiz topic")?;
        require(language, "Language")?;
        require(level, "Level")?;

        let token = begin(state, ArtifactKind::Quiz).await?;
        let quiz = self.content.quiz(topic, language, level).await;
        let outcome = state.lock().await.dispatch(Action::QuizReceived {
            token,
            quiz: Some(quiz.clone()),
        })?;
        Ok(committed(token, outcome, Some(quiz)))
    }

    pub async fn request_credit_analysis(
        &self,
        state: &Mutex<DashboardState>,
        figures: CreditFigures,
    ) -> GuidanceResult<Option<String>> {
        let token = begin(state, ArtifactKind::CreditAnalysis).await?;
        let analysis = self.content.credit_analysis(figures).await;
        finish_text(state, token, analysis).await
    }
}

fn non_empty(domains: &DomainSelection) -> GuidanceResult<DomainSelection> {
    if domains.is_empty() {
        return Err(GuidanceError::Validation(
            "Select at least one domain".to_string(),
        ));
    }
    Ok(domains.clone())
}

async fn selected_domains(state: &Mutex<DashboardState>) -> GuidanceResult<DomainSelection> {
    non_empty(state.lock().await.domains())
}

pub(crate) async fn begin(
    state: &Mutex<DashboardState>,
    kind: ArtifactKind,
) -> GuidanceResult<GenerationToken> {
    match state
        .lock()
        .await
        .dispatch(Action::GenerationRequested(kind))?
    {
        Outcome::Issued(token) => Ok(token),
        other => Err(GuidanceError::Port(crate::ports::PortError::Unexpected(
            format!("generation request for {} was not issued: {:?}", kind.as_str(), other),
        ))),
    }
}

/// Delivers `text` and returns it if it was committed. A superseded or empty
/// response yields `None`; the slot keeps its previous value.
pub(crate) async fn finish_text(
    state: &Mutex<DashboardState>,
    token: GenerationToken,
    text: Option<String>,
) -> GuidanceResult<Option<String>> {
    let outcome = state.lock().await.dispatch(Action::GenerationReceived {
        token,
        text: text.clone(),
    })?;
    Ok(committed(token, outcome, text))
}

fn committed<T>(token: GenerationToken, outcome: Outcome, value: Option<T>) -> Option<T> {
    match outcome {
        Outcome::Updated => value,
        Outcome::Stale => {
            info!(
                "Dropped a superseded {} response (seq {}).",
                token.kind.as_str(),
                token.seq
            );
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use std::sync::Arc;

    fn state_with(domains: &[&str]) -> Mutex<DashboardState> {
        let names: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        Mutex::new(DashboardState::restored(Some(UserCategory::Beginner), &names))
    }

    fn pipeline(generator: &Arc<ScriptedGenerator>) -> DashboardPipeline {
        DashboardPipeline::new(ContentClient::new(generator.clone()))
    }

    #[tokio::test]
    async fn schedule_without_roadmap_is_rejected_before_any_call() {
        let generator = ScriptedGenerator::always("anything");
        let state = state_with(&["DevOps"]);

        let err = pipeline(&generator)
            .request_schedule(&state)
            .await
            .unwrap_err();

        assert!(matches!(err, GuidanceError::MissingPrerequisite(ref m) if m == ROADMAP_REQUIRED));
        assert_eq!(generator.call_count(), 0);
        assert!(!state.lock().await.is_loading());
    }

    #[tokio::test]
    async fn schedule_is_built_from_the_stored_roadmap() {
        let generator = ScriptedGenerator::by_prompt(&[
            ("8-week roadmap", "ROADMAP-TEXT"),
            ("key concepts", "CONCEPTS"),
            ("study schedule", "SCHEDULE-TEXT"),
        ]);
        let state = state_with(&["DevOps"]);
        let pipeline = pipeline(&generator);

        pipeline.request_roadmap(&state).await.unwrap();
        let schedule = pipeline.request_schedule(&state).await.unwrap();

        assert_eq!(schedule.as_deref(), Some("SCHEDULE-TEXT"));
        let prompts = generator.prompts();
        let schedule_prompt = prompts.last().unwrap();
        assert!(schedule_prompt.contains("ROADMAP-TEXT"));
    }

    #[tokio::test]
    async fn roadmap_refreshes_key_concepts_with_course_context() {
        let generator = ScriptedGenerator::by_prompt(&[
            ("8-week roadmap", "ROADMAP"),
            ("key concepts", "CONCEPTS"),
            ("online courses", "COURSE-LIST"),
        ]);
        let state = state_with(&["Machine Learning"]);
        let pipeline = pipeline(&generator);

        pipeline.request_courses(&state).await.unwrap();
        pipeline.request_roadmap(&state).await.unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains("8-week roadmap"));
        assert!(prompts[2].contains("key concepts"));
        assert!(prompts[2].contains("COURSE-LIST"));

        let guard = state.lock().await;
        assert_eq!(guard.artifact(ArtifactKind::Roadmap), Some("ROADMAP"));
        assert_eq!(guard.artifact(ArtifactKind::KeyConcepts), Some("CONCEPTS"));
        assert!(!guard.is_loading());
    }

    #[tokio::test]
    async fn empty_selection_rejects_domain_actions() {
        let generator = ScriptedGenerator::always("x");
        let state = state_with(&[]);
        let pipeline = pipeline(&generator);

        assert!(pipeline.request_roadmap(&state).await.is_err());
        assert!(pipeline.request_courses(&state).await.is_err());
        assert!(pipeline.request_portfolio(&state).await.is_err());
        assert!(pipeline.request_job_openings(&state, "Pune").await.is_err());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_location_is_a_validation_error() {
        let generator = ScriptedGenerator::always("x");
        let state = state_with(&["IOT"]);

        let err = pipeline(&generator)
            .request_job_openings(&state, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, GuidanceError::Validation(_)));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_generation_leaves_nothing_to_display() {
        let generator = ScriptedGenerator::failing();
        let state = state_with(&["IOT"]);

        let courses = pipeline(&generator).request_courses(&state).await.unwrap();

        assert!(courses.is_none());
        assert!(!state.lock().await.is_loading());
    }

    #[tokio::test]
    async fn quiz_is_stored_in_state() {
        let generator = ScriptedGenerator::always(
            r#"Sure! {"question":"Big-O of binary search?","options":["O(n)","O(log n)"],"correctAnswer":"O(log n)","solution":"halves","credits":5}"#,
        );
        let state = state_with(&["IOT"]);

        let quiz = pipeline(&generator)
            .request_quiz(&state, "DSA", "JavaScript", "Intermediate")
            .await
            .unwrap();

        let quiz = quiz.unwrap();
        assert_eq!(quiz.correct_answer, "O(log n)");
        assert_eq!(state.lock().await.quiz(), Some(&quiz));
    }

    #[tokio::test]
    async fn failed_retry_reports_nothing_but_keeps_the_old_courses() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let switch = fail.clone();
        let generator = ScriptedGenerator::new(move |_| {
            if switch.load(std::sync::atomic::Ordering::SeqCst) {
                Err(crate::ports::PortError::Unexpected("down".to_string()))
            } else {
                Ok("OLD-COURSES".to_string())
            }
        });
        let state = state_with(&["IOT"]);
        let pipeline = pipeline(&generator);

        let first = pipeline.request_courses(&state).await.unwrap();
        fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let second = pipeline.request_courses(&state).await.unwrap();

        assert_eq!(first.as_deref(), Some("OLD-COURSES"));
        assert!(second.is_none());
        assert_eq!(
            state.lock().await.artifact(ArtifactKind::Courses),
            Some("OLD-COURSES")
        );
    }

    #[tokio::test]
    async fn superseded_text_is_not_returned() {
        let state = state_with(&["IOT"]);
        let older = begin(&state, ArtifactKind::Roadmap).await.unwrap();
        let newer = begin(&state, ArtifactKind::Roadmap).await.unwrap();

        let late = finish_text(&state, older, Some("late".to_string())).await.unwrap();
        assert!(late.is_none());
        assert_eq!(state.lock().await.artifact(ArtifactKind::Roadmap), None);

        let fresh = finish_text(&state, newer, Some("fresh".to_string())).await.unwrap();
        assert_eq!(fresh.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn failed_quiz_keeps_the_previous_one() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let switch = fail.clone();
        let generator = ScriptedGenerator::new(move |_| {
            if switch.load(std::sync::atomic::Ordering::SeqCst) {
                Ok("no json here".to_string())
            } else {
                Ok(r#"{"question":"Q1","options":["a"],"correctAnswer":"a","solution":"s","credits":2}"#.to_string())
            }
        });
        let state = state_with(&["IOT"]);
        let pipeline = pipeline(&generator);

        let first = pipeline
            .request_quiz(&state, "DSA", "Rust", "Easy")
            .await
            .unwrap();
        fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let second = pipeline
            .request_quiz(&state, "DSA", "Rust", "Easy")
            .await
            .unwrap();

        assert_eq!(first.map(|q| q.question).as_deref(), Some("Q1"));
        assert!(second.is_none());
        let guard = state.lock().await;
        assert_eq!(guard.quiz().map(|q| q.question.as_str()), Some("Q1"));
        assert!(!guard.is_loading());
    }

    #[tokio::test]
    async fn portfolio_uses_the_selected_category() {
        let generator = ScriptedGenerator::always("profile");
        let names = vec!["DevOps".to_string()];
        let state = Mutex::new(DashboardState::restored(Some(UserCategory::Veteran), &names));

        pipeline(&generator).request_portfolio(&state).await.unwrap();

        assert!(generator.prompts()[0].contains("veteran"));
    }
}
