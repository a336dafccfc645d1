//! Front-matter contract consumed by the routing evaluator
//!
//! Documents opt in or out of syncing through `---` fenced YAML at the top
//! of the file. The field contract accepts both the singular spelling and
//! the legacy plural one (`include`/`includes`, `exclude`/`excludes`);
//! singular wins when both are present.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Matches a fenced front-matter block at the start of a document. The
/// optional newline before the closing fence admits empty blocks.
static FRONTMATTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---[ \t]*\n(.*?)\n?---[ \t]*\n?").unwrap());

/// Sync-relevant front-matter fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Target globs this document should sync to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    /// Legacy plural spelling of `include`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,
    /// Target globs this document must never sync to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Legacy plural spelling of `exclude`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Vec<String>>,
}

impl FrontMatter {
    /// Effective include list; singular takes precedence over the legacy
    /// plural spelling.
    pub fn include_targets(&self) -> &[String] {
        self.include
            .as_deref()
            .or(self.includes.as_deref())
            .unwrap_or(&[])
    }

    /// Effective exclude list, with the same precedence.
    pub fn exclude_targets(&self) -> &[String] {
        self.exclude
            .as_deref()
            .or(self.excludes.as_deref())
            .unwrap_or(&[])
    }
}

/// A document split into front matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Parsed front-matter fields, when a block was present
    pub front_matter: Option<FrontMatter>,
    /// Document text with the front-matter block removed
    pub body: String,
}

/// Extract and parse front matter from document text.
///
/// A document without a fence parses to `front_matter: None` with the text
/// untouched.
///
/// # Errors
///
/// Returns [`Error::Frontmatter`] when a fence exists but its YAML does
/// not parse as a mapping.
pub fn parse_document(text: &str) -> Result<ParsedDocument> {
    let Some(captures) = FRONTMATTER_PATTERN.captures(text) else {
        return Ok(ParsedDocument {
            front_matter: None,
            body: text.to_string(),
        });
    };

    let raw = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = text[captures.get(0).map(|m| m.end()).unwrap_or(0)..].to_string();

    if raw.trim().is_empty() {
        return Ok(ParsedDocument {
            front_matter: Some(FrontMatter::default()),
            body,
        });
    }

    let front_matter: FrontMatter =
        serde_yaml::from_str(raw).map_err(|e| Error::Frontmatter {
            message: e.to_string(),
        })?;

    Ok(ParsedDocument {
        front_matter: Some(front_matter),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_without_fence_is_untouched() {
        let parsed = parse_document("# Title\n\nBody text\n").unwrap();
        assert_eq!(parsed.front_matter, None);
        assert_eq!(parsed.body, "# Title\n\nBody text\n");
    }

    #[test]
    fn parses_include_and_exclude_lists() {
        let text = "---\ninclude:\n  - api\n  - web-*\nexclude:\n  - internal-*\n---\n# Doc\n";
        let parsed = parse_document(text).unwrap();
        let fm = parsed.front_matter.unwrap();
        assert_eq!(fm.include_targets(), ["api".to_string(), "web-*".to_string()]);
        assert_eq!(fm.exclude_targets(), ["internal-*".to_string()]);
        assert_eq!(parsed.body, "# Doc\n");
    }

    #[test]
    fn singular_wins_over_legacy_plural() {
        let text = "---\ninclude: [api]\nincludes: [legacy]\n---\nbody";
        let fm = parse_document(text).unwrap().front_matter.unwrap();
        assert_eq!(fm.include_targets(), ["api".to_string()]);
    }

    #[test]
    fn legacy_plural_is_still_honored_alone() {
        let text = "---\nincludes: [legacy]\nexcludes: [old]\n---\nbody";
        let fm = parse_document(text).unwrap().front_matter.unwrap();
        assert_eq!(fm.include_targets(), ["legacy".to_string()]);
        assert_eq!(fm.exclude_targets(), ["old".to_string()]);
    }

    #[test]
    fn empty_front_matter_parses_to_defaults() {
        let parsed = parse_document("---\n---\nbody").unwrap();
        let fm = parsed.front_matter.unwrap();
        assert!(fm.include_targets().is_empty());
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn invalid_yaml_is_surfaced() {
        let err = parse_document("---\ninclude: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, Error::Frontmatter { .. }));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let text = "---\ntitle: My Doc\nauthor: someone\ninclude: ['*']\n---\nbody";
        let fm = parse_document(text).unwrap().front_matter.unwrap();
        assert_eq!(fm.include_targets(), ["*".to_string()]);
    }
}
