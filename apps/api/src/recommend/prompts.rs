// Recommendation prompt templates.

pub const RECOMMEND_SYSTEM: &str = "\
You are a resume improvement assistant. \
You compare a candidate's resume sections against a target job description \
and suggest concrete, section-level improvements. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Never invent experience the candidate does not have.";

pub const RECOMMEND_PROMPT: &str = r#"Compare the resume content below against the job description and suggest improvements.

JOB DESCRIPTION:
{job_description}

RESUME CONTENT (grouped by section type):
{sections}

OUTPUT SCHEMA (return exactly this structure):
{
  "summary": "one-paragraph overall assessment",
  "keywords": ["missing or under-represented keywords from the job description"],
  "suggestions": [
    {
      "section_type": "experience" | "education" | "skills" | "projects" | "certifications" | "links" | "personal_info",
      "suggestion": "specific, actionable change for this section"
    }
  ]
}

RULES:
1. Every suggestion must reference content that already exists or a gap the job description exposes.
2. Do not fabricate employers, dates, or credentials.
3. Return ONLY the JSON object — nothing else."#;
