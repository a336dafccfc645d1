//! Parsing and resolution of `codex://` references
//!
//! A [`Reference`] is the parsed logical address of a document
//! (`organization/project/path`) before any filesystem or network
//! resolution. A [`ResolvedReference`] adds the deterministic cache path and
//! the local path when the reference points into the ambient project.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::ProjectContext;
use crate::error::{Error, Result};
use crate::path::{sanitize_path, validate_path};

/// URI scheme prefix for codex references
pub const URI_PREFIX: &str = "codex://";

/// Legacy reference prefix still accepted on input
pub const LEGACY_REF_PREFIX: &str = "$ref:";

/// Organization and project segments: alphanumeric start, then
/// alphanumerics, dots, underscores, or hyphens, at most 100 characters.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,99}$").unwrap());

/// A parsed codex reference.
///
/// Immutable once constructed; discarded after the fetch or sync call that
/// created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The normalized URI this reference was parsed from
    pub uri: String,
    /// Organization segment
    pub organization: String,
    /// Project segment
    pub project: String,
    /// Optional document path within the project
    pub path: Option<String>,
}

impl Reference {
    /// Parse a `codex://` URI (or legacy `$ref:` spelling) into a reference.
    ///
    /// Legacy input has its path sanitized rather than rejected; URI input
    /// is validated strictly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedUri`] when the scheme, organization, or
    /// project segment is missing, [`Error::InvalidName`] when a segment
    /// fails name validation, and [`Error::UnsafePath`] for hazardous paths.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();

        if let Some(rest) = uri.strip_prefix(LEGACY_REF_PREFIX) {
            return Self::parse_legacy(rest);
        }

        let Some(rest) = uri.strip_prefix(URI_PREFIX) else {
            return Err(Error::malformed(
                uri,
                format!("expected '{URI_PREFIX}' scheme"),
            ));
        };

        let mut segments = rest.splitn(3, '/');
        let organization = segments.next().unwrap_or_default();
        let project = segments.next().unwrap_or_default();
        let path = segments.next();

        if organization.is_empty() || project.is_empty() {
            return Err(Error::malformed(
                uri,
                "expected codex://organization/project[/path]",
            ));
        }

        validate_name("organization", organization)?;
        validate_name("project", project)?;

        let path = match path {
            Some(p) if !p.is_empty() => {
                validate_path(p)?;
                Some(p.to_string())
            }
            _ => None,
        };

        Ok(Self {
            uri: build_uri(organization, project, path.as_deref()),
            organization: organization.to_string(),
            project: project.to_string(),
            path,
        })
    }

    /// Parse the body of a legacy `$ref:org/project/path` reference.
    fn parse_legacy(body: &str) -> Result<Self> {
        let mut segments = body.splitn(3, '/');
        let organization = segments.next().unwrap_or_default();
        let project = segments.next().unwrap_or_default();
        let path = segments.next();

        if organization.is_empty() || project.is_empty() {
            return Err(Error::malformed(
                format!("{LEGACY_REF_PREFIX}{body}"),
                "expected $ref:organization/project[/path]",
            ));
        }

        validate_name("organization", organization)?;
        validate_name("project", project)?;

        let path = path.map(sanitize_path).filter(|p| !p.is_empty());

        Ok(Self {
            uri: build_uri(organization, project, path.as_deref()),
            organization: organization.to_string(),
            project: project.to_string(),
            path,
        })
    }

    /// Whether this reference addresses the given ambient project.
    ///
    /// Comparison is case-insensitive: hosting platforms treat org and
    /// repository names that way.
    pub fn matches_project(&self, ctx: &ProjectContext) -> bool {
        self.organization.eq_ignore_ascii_case(&ctx.organization)
            && self.project.eq_ignore_ascii_case(&ctx.project)
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Build a `codex://` URI from components.
pub fn build_uri(organization: &str, project: &str, path: Option<&str>) -> String {
    match path {
        Some(path) => format!("{URI_PREFIX}{organization}/{project}/{path}"),
        None => format!("{URI_PREFIX}{organization}/{project}"),
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if NAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            field,
            value: value.to_string(),
        })
    }
}

/// A reference resolved against the cache root and ambient project context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// The parsed reference
    pub reference: Reference,
    /// Deterministic location of this document in the cache:
    /// `{cache_root}/{organization}/{project}/{path}`
    pub cache_path: PathBuf,
    /// Whether the reference addresses the ambient project
    pub is_current_project: bool,
    /// Local filesystem path, set only when the reference addresses the
    /// ambient project and carries a path
    pub local_path: Option<PathBuf>,
}

/// Resolves references against a cache root and an injected project context.
///
/// The resolver never inspects the environment itself; ambient identity is
/// supplied by the caller (see [`crate::context::detect_project_context`]).
#[derive(Debug, Clone)]
pub struct Resolver {
    cache_root: PathBuf,
}

impl Resolver {
    /// Create a resolver rooted at the given cache directory.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    /// The cache root this resolver joins cache paths under.
    pub fn cache_root(&self) -> &PathBuf {
        &self.cache_root
    }

    /// Resolve a URI, returning `None` when it does not parse.
    pub fn resolve(&self, uri: &str, ctx: Option<&ProjectContext>) -> Option<ResolvedReference> {
        let reference = Reference::parse(uri).ok()?;
        Some(self.resolve_reference(reference, ctx))
    }

    /// Resolve an already-parsed reference.
    pub fn resolve_reference(
        &self,
        reference: Reference,
        ctx: Option<&ProjectContext>,
    ) -> ResolvedReference {
        let mut cache_path = self
            .cache_root
            .join(&reference.organization)
            .join(&reference.project);
        if let Some(path) = &reference.path {
            for segment in path.split('/') {
                cache_path.push(segment);
            }
        }

        let is_current_project = ctx.is_some_and(|ctx| reference.matches_project(ctx));

        let local_path = match (&reference.path, ctx) {
            (Some(path), Some(ctx)) if is_current_project => {
                let mut local = ctx.root_path.clone();
                for segment in path.split('/') {
                    local.push(segment);
                }
                Some(local)
            }
            _ => None,
        };

        ResolvedReference {
            reference,
            cache_path,
            is_current_project,
            local_path,
        }
    }
}
