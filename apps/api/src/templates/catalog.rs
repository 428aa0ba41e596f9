//! Built-in section schema catalog.
//!
//! The default `SectionSchema` for each well-known section type. Section
//! validation resolves schemas here by `section_type`; template records
//! additionally persist an `input_data_schema` describing what sections a
//! given template expects, but that copy is for clients and rendering, not
//! for validation.

use crate::schema::{FieldSpec, FieldType, SchemaKind, SectionSchema};

pub const PERSONAL_INFO: &str = "personal_info";
pub const EXPERIENCE: &str = "experience";
pub const EDUCATION: &str = "education";
pub const SKILLS: &str = "skills";
pub const PROJECTS: &str = "projects";
pub const CERTIFICATIONS: &str = "certifications";
pub const LINKS: &str = "links";

pub fn known_section_types() -> &'static [&'static str] {
    &[
        PERSONAL_INFO,
        EXPERIENCE,
        EDUCATION,
        SKILLS,
        PROJECTS,
        CERTIFICATIONS,
        LINKS,
    ]
}

/// Returns the default schema for a section type, or `None` for types the
/// catalog does not know.
pub fn default_schema(section_type: &str) -> Option<SectionSchema> {
    match section_type {
        PERSONAL_INFO => Some(SectionSchema::singleton(vec![
            FieldSpec::new("name", "Full Name", FieldType::String).required(),
            FieldSpec::new("email", "Email", FieldType::String),
            FieldSpec::new("phone", "Phone", FieldType::String),
            FieldSpec::new("location", "Location", FieldType::String),
            FieldSpec::new("summary", "Summary", FieldType::LongText),
            FieldSpec::new("links", "Links", FieldType::StringArray),
            FieldSpec::new("photo", "Photo", FieldType::Image),
        ])),
        EXPERIENCE => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("company", "Company", FieldType::String).required(),
                FieldSpec::new("title", "Job Title", FieldType::String).required(),
                FieldSpec::new("location", "Location", FieldType::String),
                FieldSpec::new("start_date", "Start Date", FieldType::Date),
                FieldSpec::new("end_date", "End Date", FieldType::Date),
                FieldSpec::new("current", "Current Role", FieldType::Boolean),
                FieldSpec::new("summary", "Summary", FieldType::LongText),
                FieldSpec::new("highlights", "Highlights", FieldType::StringArray),
                FieldSpec::new("url", "Company URL", FieldType::Url),
            ],
            0,
            20,
        )),
        EDUCATION => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("institution", "Institution", FieldType::String).required(),
                FieldSpec::new("degree", "Degree", FieldType::String).required(),
                FieldSpec::new("field", "Field of Study", FieldType::String),
                FieldSpec::new("start_date", "Start Date", FieldType::Date),
                FieldSpec::new("end_date", "End Date", FieldType::Date),
                FieldSpec::new("gpa", "GPA", FieldType::Number),
                FieldSpec::new("honors", "Honors", FieldType::StringArray),
            ],
            0,
            10,
        )),
        SKILLS => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("category", "Category", FieldType::String).required(),
                FieldSpec::new("items", "Skills", FieldType::StringArray).required(),
                FieldSpec::new("proficiency", "Proficiency", FieldType::String),
            ],
            0,
            30,
        )),
        PROJECTS => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("name", "Project Name", FieldType::String).required(),
                FieldSpec::new("description", "Description", FieldType::LongText),
                FieldSpec::new("technologies", "Technologies", FieldType::StringArray),
                FieldSpec::new("url", "Project URL", FieldType::Url),
                FieldSpec::new("start_date", "Start Date", FieldType::Date),
                FieldSpec::new("end_date", "End Date", FieldType::Date),
            ],
            0,
            15,
        )),
        CERTIFICATIONS => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("name", "Certification", FieldType::String).required(),
                FieldSpec::new("issuer", "Issuer", FieldType::String).required(),
                FieldSpec::new("issue_date", "Issue Date", FieldType::Date),
                FieldSpec::new("expiry_date", "Expiry Date", FieldType::Date),
                FieldSpec::new("credential_id", "Credential ID", FieldType::String),
                FieldSpec::new("url", "Credential URL", FieldType::Url),
            ],
            0,
            15,
        )),
        LINKS => Some(SectionSchema::repeatable(
            vec![
                FieldSpec::new("label", "Label", FieldType::String).required(),
                FieldSpec::new("url", "URL", FieldType::Url).required(),
            ],
            0,
            10,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_type_has_a_schema() {
        for section_type in known_section_types() {
            assert!(
                default_schema(section_type).is_some(),
                "no schema for {section_type}"
            );
        }
    }

    #[test]
    fn test_unknown_type_has_no_schema() {
        assert!(default_schema("hobbies_3000").is_none());
    }

    #[test]
    fn test_field_names_unique_in_every_schema() {
        for section_type in known_section_types() {
            let schema = default_schema(section_type).unwrap();
            assert!(
                schema.has_unique_field_names(),
                "duplicate field in {section_type}"
            );
        }
    }

    #[test]
    fn test_personal_info_is_singleton_rest_repeatable() {
        assert_eq!(
            default_schema(PERSONAL_INFO).unwrap().kind,
            SchemaKind::Singleton
        );
        for section_type in known_section_types()
            .iter()
            .copied()
            .filter(|t| *t != PERSONAL_INFO)
        {
            assert_eq!(
                default_schema(section_type).unwrap().kind,
                SchemaKind::Repeatable,
                "{section_type} should be repeatable"
            );
        }
    }

    #[test]
    fn test_repeatable_schemas_have_bounds() {
        let schema = default_schema(EXPERIENCE).unwrap();
        assert_eq!(schema.min_items, Some(0));
        assert_eq!(schema.max_items, Some(20));
    }
}
