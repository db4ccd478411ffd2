//! crates/placement_core/src/generation.rs
//!
//! The content-generation client. One method per content kind, each turning its
//! inputs into a single call to the `TextGenerationService` port.
//!
//! Failures never propagate from here: a blank required input short-circuits
//! without a call, and a failed or empty remote response becomes `None`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{ArtifactKind, ChatMessage, DomainSelection, UserCategory};
use crate::ports::{GenerationRequest, ResponseShape, TextGenerationService};
use crate::prompts::{self, render};
use crate::quiz::{parse_quiz, QuizItem};

/// Credit figures fed into the standing analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditFigures {
    pub project: f64,
    pub contribution: f64,
    pub developer: f64,
}

#[derive(Clone)]
pub struct ContentClient {
    service: Arc<dyn TextGenerationService>,
}

impl ContentClient {
    pub fn new(service: Arc<dyn TextGenerationService>) -> Self {
        Self { service }
    }

    pub async fn roadmap(&self, domains: &DomainSelection) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let prompt = render(prompts::ROADMAP_TEMPLATE, &[("domains", &domains.joined())]);
        self.text(ArtifactKind::Roadmap, prompt).await
    }

    pub async fn schedule(&self, domains: &DomainSelection, roadmap: &str) -> Option<String> {
        if domains.is_empty() || roadmap.trim().is_empty() {
            return None;
        }
        let prompt = render(
            prompts::SCHEDULE_TEMPLATE,
            &[("domains", &domains.joined()), ("roadmap", roadmap)],
        );
        self.text(ArtifactKind::Schedule, prompt).await
    }

    pub async fn courses(&self, domains: &DomainSelection) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let prompt = render(prompts::COURSES_TEMPLATE, &[("domains", &domains.joined())]);
        self.text(ArtifactKind::Courses, prompt).await
    }

    pub async fn job_openings(&self, domains: &DomainSelection, location: &str) -> Option<String> {
        if domains.is_empty() || location.trim().is_empty() {
            return None;
        }
        let prompt = render(
            prompts::JOB_OPENINGS_TEMPLATE,
            &[("domains", &domains.joined()), ("location", location.trim())],
        );
        self.text(ArtifactKind::JobOpenings, prompt).await
    }

    pub async fn portfolio(
        &self,
        category: UserCategory,
        domains: &DomainSelection,
    ) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let prompt = render(
            prompts::PORTFOLIO_TEMPLATE,
            &[("category", category.as_str()), ("domains", &domains.joined())],
        );
        self.text(ArtifactKind::Portfolio, prompt).await
    }

    /// `courses` may be empty; the concepts are then generated without that context.
    pub async fn key_concepts(&self, domains: &DomainSelection, courses: &str) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let prompt = render(
            prompts::KEY_CONCEPTS_TEMPLATE,
            &[("domains", &domains.joined()), ("courses", courses)],
        );
        self.text(ArtifactKind::KeyConcepts, prompt).await
    }

    pub async fn domain_topics(&self, domains: &DomainSelection, courses: &str) -> Option<String> {
        if domains.is_empty() {
            return None;
        }
        let prompt = render(
            prompts::DOMAIN_TOPICS_TEMPLATE,
            &[("domains", &domains.joined()), ("courses", courses)],
        );
        self.text(ArtifactKind::DomainTopics, prompt).await
    }

    pub async fn credit_analysis(&self, figures: CreditFigures) -> Option<String> {
        let prompt = render(
            prompts::CREDIT_ANALYSIS_TEMPLATE,
            &[
                ("project", &figures.project.to_string()),
                ("contribution", &figures.contribution.to_string()),
                ("developer", &figures.developer.to_string()),
            ],
        );
        self.text(ArtifactKind::CreditAnalysis, prompt).await
    }

    /// Returns an empty `QuizItem` on blank input, remote failure or unparseable output.
    pub async fn quiz(&self, topic: &str, language: &str, level: &str) -> QuizItem {
        if [topic, language, level].iter().any(|v| v.trim().is_empty()) {
            return QuizItem::default();
        }
        let prompt = render(
            prompts::QUIZ_TEMPLATE,
            &[
                ("level", level.trim()),
                ("language", language.trim()),
                ("topic", topic.trim()),
            ],
        );
        let request = GenerationRequest::prompt(prompt).with_shape(ResponseShape::Quiz);
        match self.call(ArtifactKind::Quiz, request).await {
            Some(body) => parse_quiz(&body),
            None => QuizItem::default(),
        }
    }

    /// Sends the whole transcript and returns the assistant's next line.
    pub async fn chat_reply(&self, transcript: &[ChatMessage]) -> Option<String> {
        if transcript.is_empty() {
            return None;
        }
        let request = GenerationRequest::conversation(transcript.to_vec());
        match self.service.generate(request).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!("Chat reply came back empty.");
                None
            }
            Err(e) => {
                warn!("Chat reply generation failed: {}", e);
                None
            }
        }
    }

    async fn text(&self, kind: ArtifactKind, prompt: String) -> Option<String> {
        self.call(kind, GenerationRequest::prompt(prompt)).await
    }

    async fn call(&self, kind: ArtifactKind, request: GenerationRequest) -> Option<String> {
        info!("Requesting {} from the generation service.", kind.as_str());
        match self.service.generate(request).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Generation of {} returned no text.", kind.as_str());
                None
            }
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Generation of {} failed: {}", kind.as_str(), e);
                None
            }
        }
    }
}
