//! crates/placement_core/src/prompts.rs
//!
//! Prompt templates for every content kind. Placeholders in `{braces}` are
//! substituted by `render`.

pub const ROADMAP_TEMPLATE: &str = "Generate a detailed 8-week roadmap for learning {domains}. \
Format it as a week-by-week guide with specific topics and goals for each week. Use Markdown.";

pub const SCHEDULE_TEMPLATE: &str = "Generate a daily 8-week study schedule for {domains}. \
Include morning, afternoon, and evening sessions. Base it on the following roadmap so the \
schedule covers the same topics in the same order.\n\nROADMAP:\n{roadmap}\n\nUse Markdown.";

pub const COURSES_TEMPLATE: &str = "List 5 high-quality, latest online courses for {domains}. \
Include course name, platform, and a brief description. Use Markdown.";

pub const JOB_OPENINGS_TEMPLATE: &str = "Find and list 5 recent job openings for {domains} near {location}. \
If real-time data is limited, provide typical roles and companies in that area. Use Markdown.";

pub const PORTFOLIO_TEMPLATE: &str = "Create a professional LinkedIn portfolio summary and experience \
section for a {category} in {domains}. Make it compelling and keyword-optimized. Use Markdown.";

pub const KEY_CONCEPTS_TEMPLATE: &str = "List the key concepts a learner must master for {domains}. \
Group them by topic and keep each concept to one line. Use the recommended courses below as context \
so the concepts line up with what the learner will study.\n\nCOURSES:\n{courses}\n\nUse Markdown.";

pub const DOMAIN_TOPICS_TEMPLATE: &str = "Break {domains} down into its core topics, from fundamentals \
to advanced. For each topic give a one-sentence description and point to the course below that \
covers it best.\n\nCOURSES:\n{courses}\n\nUse Markdown.";

pub const QUIZ_TEMPLATE: &str = "Generate a {level} level coding question in {language} related to {topic}. \
Include the problem statement, answer options and a hidden solution. Format as JSON with the fields \
question, options, correctAnswer, solution and credits.";

pub const CREDIT_ANALYSIS_TEMPLATE: &str = "Compare these developer metrics: Project Credits ({project}), \
Contribution Credits ({contribution}), Developer Credits ({developer}). Provide a brief analysis of \
the developer's standing.";

/// Placed at the head of every chat transcript.
pub const CHAT_SYSTEM_PREAMBLE: &str = "You are PlacementPro's career coach. Help the user improve \
their communication and interview skills for tech roles. Keep replies short and practical.";

/// Substitutes each `(name, value)` pair into `template`.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn templates_leave_no_placeholders_once_rendered() {
        let out = render(
            SCHEDULE_TEMPLATE,
            &[("domains", "DevOps"), ("roadmap", "Week 1: Linux")],
        );
        assert!(!out.contains('{'));
        assert!(out.contains("Week 1: Linux"));
    }
}
