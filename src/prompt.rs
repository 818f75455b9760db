//! Prompt construction for blueprint generation.
//!
//! The prompt is a plain instruction string. Field order and formatting are
//! fixed so identical requests always produce identical prompts.

use crate::models::GenerationRequest;

/// Sections every generated blueprint is asked to cover, in order.
pub const REQUESTED_SECTIONS: &[&str] = &[
    "Technology Stack",
    "Core Components",
    "Database Design",
    "API Structure",
    "Security Measures",
    "Development Timeline",
    "Technical Challenges and Risks",
];

const PREAMBLE: &str = "You are an expert software architect. Create a detailed markdown \
blueprint for this app idea that is technically precise and actionable for developers. \
Be concise but thorough.";

const CLOSING: &str = "Format the response as a well-structured markdown document with \
headings, subheadings and bullet points. Include code examples where helpful.";

/// Build the instruction string sent to generation providers.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut lines = vec![
        format!("App Idea: {}", request.idea_description()),
        format!("Target Platform: {}", request.platform()),
    ];

    if let Some(audience) = request.target_audience() {
        lines.push(format!("Target Audience: {}", audience));
    }

    let features = request.feature_list();
    if !features.is_empty() {
        lines.push("Required Features:".to_string());
        lines.extend(features.iter().map(|f| format!("- {}", f)));
    }

    lines.push(String::new());
    lines.push(PREAMBLE.to_string());
    lines.push(String::new());
    lines.push("Please provide a blueprint with these sections:".to_string());
    lines.push(String::new());
    lines.extend(
        REQUESTED_SECTIONS
            .iter()
            .enumerate()
            .map(|(i, section)| format!("{}. {}", i + 1, section)),
    );
    lines.push(String::new());
    lines.push(CLOSING.to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn request(audience: Option<&str>, features: Option<&str>) -> GenerationRequest {
        GenerationRequest::new(
            "Todo app",
            Platform::Web,
            audience.map(String::from),
            features.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn states_idea_and_platform_first() {
        let prompt = build_prompt(&request(None, None));
        assert!(prompt.starts_with("App Idea: Todo app\nTarget Platform: web\n"));
    }

    #[test]
    fn omits_audience_line_when_absent() {
        let prompt = build_prompt(&request(None, None));
        assert!(!prompt.contains("Target Audience:"));
        assert!(!prompt.contains("Required Features:"));
    }

    #[test]
    fn includes_audience_verbatim_when_present() {
        let prompt = build_prompt(&request(Some("Busy parents"), None));
        assert!(prompt.contains("\nTarget Audience: Busy parents\n"));
    }

    #[test]
    fn lists_features_as_bullets() {
        let prompt = build_prompt(&request(None, Some("add task, complete task")));
        assert!(prompt.contains("Required Features:\n- add task\n- complete task\n"));
    }

    #[test]
    fn requests_every_section() {
        let prompt = build_prompt(&request(None, None));
        for (i, section) in REQUESTED_SECTIONS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {}", i + 1, section)));
        }
    }

    #[test]
    fn is_deterministic() {
        let a = build_prompt(&request(Some("Teams"), Some("chat\nfiles")));
        let b = build_prompt(&request(Some("Teams"), Some("chat\nfiles")));
        assert_eq!(a, b);
    }
}
