//! AI recommendations — assembles the owner's section content and a job
//! description into a prompt, forwards it to the model, and parses the
//! suggestions out of the reply. Malformed model output is an upstream
//! failure, never a crash.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};

use crate::sections::models::Section;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSuggestion {
    pub section_type: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<SectionSuggestion>,
}

/// Renders sections as compact prompt input, grouped by type, titles and
/// payloads inline.
pub fn render_sections(sections: &[Section]) -> String {
    let mut out = String::new();
    let mut types: Vec<&str> = sections.iter().map(|s| s.section_type.as_str()).collect();
    types.sort_unstable();
    types.dedup();

    for section_type in types {
        out.push_str(&format!("## {section_type}\n"));
        for section in sections.iter().filter(|s| s.section_type == section_type) {
            out.push_str(&format!("- {}: ", section.title));
            out.push_str(
                &serde_json::to_string(&section.data).unwrap_or_else(|_| "{}".to_string()),
            );
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn build_prompt(job_description: &str, sections: &[Section]) -> String {
    prompts::RECOMMEND_PROMPT
        .replace("{job_description}", job_description)
        .replace("{sections}", &render_sections(sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn section(section_type: &str, title: &str) -> Section {
        Section::new(
            Uuid::new_v4(),
            None,
            section_type.to_string(),
            title.to_string(),
            vec![],
            json!([{ "company": "Acme" }]),
        )
    }

    #[test]
    fn test_render_groups_by_type() {
        let rendered = render_sections(&[
            section("experience", "Acme years"),
            section("education", "Uni"),
            section("experience", "Beta years"),
        ]);
        let exp_pos = rendered.find("## experience").unwrap();
        let edu_pos = rendered.find("## education").unwrap();
        assert!(edu_pos < exp_pos); // sorted type order
        assert!(rendered.contains("- Acme years:"));
        assert!(rendered.contains("- Beta years:"));
    }

    #[test]
    fn test_build_prompt_substitutes_placeholders() {
        let prompt = build_prompt("Senior Rust engineer", &[section("experience", "Acme")]);
        assert!(prompt.contains("Senior Rust engineer"));
        assert!(prompt.contains("## experience"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{sections}"));
    }

    #[test]
    fn test_recommendations_parse_with_missing_optional_fields() {
        let parsed: Recommendations =
            serde_json::from_str(r#"{ "summary": "looks fine" }"#).unwrap();
        assert!(parsed.keywords.is_empty());
        assert!(parsed.suggestions.is_empty());
    }
}
