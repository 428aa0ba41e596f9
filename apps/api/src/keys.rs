//! Key Mapper — the single place where storage keys are constructed.
//!
//! ARCHITECTURAL RULE: no other module may build a `pk`/`sk` string by hand.
//! All key construction and all prefix derivation for range scans goes
//! through these functions, so the single-table layout can be read in one
//! file.

use uuid::Uuid;

/// Separator between tags inside the canonical tag key. Written after
/// every tag (not just between them) so that a prefix query for `{a}`
/// matches `[a]` and `[a, b]` but never `[ab]`.
pub const TAG_DELIM: char = '|';

/// Sort-key token standing in for "no document" on unassigned sections.
pub const UNASSIGNED_DOC: &str = "UNASSIGNED";

/// Partition key for every row owned by one account.
pub fn owner_pk(owner_id: Uuid) -> String {
    format!("OWNER#{owner_id}")
}

fn doc_segment(document_id: Option<Uuid>) -> String {
    match document_id {
        Some(id) => format!("DOC#{id}"),
        None => format!("DOC#{UNASSIGNED_DOC}"),
    }
}

/// Primary sort key for a section: `DOC#{doc}#TYPE#{type}#SEC#{id}`.
///
/// Embedding document and type first makes "all sections of a document"
/// and "all sections of a document + type" contiguous range scans.
pub fn section_sk(document_id: Option<Uuid>, section_type: &str, section_id: Uuid) -> String {
    format!(
        "{}#TYPE#{section_type}#SEC#{section_id}",
        doc_segment(document_id)
    )
}

/// Sort-key prefix covering every section of one document.
pub fn section_sk_document_prefix(document_id: Option<Uuid>) -> String {
    format!("{}#", doc_segment(document_id))
}

/// Canonical string form of a tag set: tags sorted lexicographically,
/// each followed by the tag delimiter. `[b, a]` and `[a, b]` canonicalize
/// identically; duplicates collapse.
pub fn canonical_tag_key(tags: &[String]) -> String {
    let mut sorted: Vec<&str> = tags.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut key = String::new();
    for tag in sorted {
        key.push_str(tag);
        key.push(TAG_DELIM);
    }
    key
}

/// Tag-index sort key: `TAG#{canonical}SEC#{id}`. The trailing id keeps
/// the key unique per section without disturbing the tag prefix.
pub fn tag_sk(tags: &[String], section_id: Uuid) -> String {
    format!("TAG#{}SEC#{section_id}", canonical_tag_key(tags))
}

/// Prefix for a tag-index query: matches every section whose sorted tag
/// set starts with the queried (sorted) tags.
pub fn tag_sk_prefix(tags: &[String]) -> String {
    format!("TAG#{}", canonical_tag_key(tags))
}

/// Type-index partition key: `DOC#{doc}#TYPE#{type}`. Rows under it are
/// sorted by creation time descending at query time.
pub fn type_pk(document_id: Option<Uuid>, section_type: &str) -> String {
    format!("{}#TYPE#{section_type}", doc_segment(document_id))
}

/// Sort key for a document (resume) record.
pub fn document_sk(document_id: Uuid) -> String {
    format!("RESUME#{document_id}")
}

/// Sort key for the one profile record per owner.
pub fn profile_sk() -> String {
    "PROFILE".to_string()
}

/// Templates live in a single shared partition: they are a global,
/// immutable catalog, not owner data.
pub fn template_pk() -> String {
    "TEMPLATE".to_string()
}

pub fn template_sk(template_id: Uuid) -> String {
    format!("TEMPLATE#{template_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonical_tag_key_sorts() {
        assert_eq!(canonical_tag_key(&tags(&["b", "a"])), "a|b|");
        assert_eq!(canonical_tag_key(&tags(&["a", "b"])), "a|b|");
    }

    #[test]
    fn test_canonical_tag_key_idempotent_under_shuffle() {
        let orderings = [
            tags(&["go", "backend", "infra"]),
            tags(&["infra", "go", "backend"]),
            tags(&["backend", "infra", "go"]),
        ];
        let first = canonical_tag_key(&orderings[0]);
        for t in &orderings {
            assert_eq!(canonical_tag_key(t), first);
        }
    }

    #[test]
    fn test_canonical_tag_key_dedupes() {
        assert_eq!(canonical_tag_key(&tags(&["a", "a", "b"])), "a|b|");
    }

    #[test]
    fn test_canonical_tag_key_empty() {
        assert_eq!(canonical_tag_key(&[]), "");
    }

    #[test]
    fn test_tag_prefix_matches_supersets_only() {
        let id = Uuid::new_v4();
        let prefix = tag_sk_prefix(&tags(&["a"]));

        // exact set and supersets (sorted after "a") match
        assert!(tag_sk(&tags(&["a"]), id).starts_with(&prefix));
        assert!(tag_sk(&tags(&["a", "b"]), id).starts_with(&prefix));

        // a different tag sharing the first letter must not match
        assert!(!tag_sk(&tags(&["ab"]), id).starts_with(&prefix));
    }

    #[test]
    fn test_section_sk_embeds_document_and_type() {
        let doc = Uuid::new_v4();
        let sec = Uuid::new_v4();
        let sk = section_sk(Some(doc), "experience", sec);
        assert_eq!(sk, format!("DOC#{doc}#TYPE#experience#SEC#{sec}"));
        assert!(sk.starts_with(&section_sk_document_prefix(Some(doc))));
    }

    #[test]
    fn test_unassigned_sections_share_a_prefix() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let prefix = section_sk_document_prefix(None);
        assert!(section_sk(None, "experience", a).starts_with(&prefix));
        assert!(section_sk(None, "education", b).starts_with(&prefix));
    }

    #[test]
    fn test_type_pk_is_a_section_sk_prefix() {
        let doc = Uuid::new_v4();
        let sec = Uuid::new_v4();
        let sk = section_sk(Some(doc), "education", sec);
        assert!(sk.starts_with(&type_pk(Some(doc), "education")));
    }
}
