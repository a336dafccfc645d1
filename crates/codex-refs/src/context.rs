//! Ambient project-context detection
//!
//! Resolution itself is pure: the resolver takes a [`ProjectContext`] as an
//! argument. This module is the narrow collaborator that produces one by
//! inspecting the enclosing git checkout, for callers that want ambient
//! detection. Nothing in this crate calls it implicitly.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// SSH remotes: `git@host:org/project.git`
static SSH_REMOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^git@[^:]+:([^/]+)/(.+?)(?:\.git)?$").unwrap());

/// HTTP(S) remotes: `https://host/org/project.git`
static HTTPS_REMOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^/]+/([^/]+)/(.+?)(?:\.git)?/?$").unwrap());

/// Identity of the project the caller is operating in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Organization name
    pub organization: String,
    /// Project name
    pub project: String,
    /// Root of the project checkout
    pub root_path: PathBuf,
    /// Origin remote URL, when one was found
    pub remote_url: Option<String>,
}

/// Detect the ambient project from the git checkout enclosing `start_dir`.
///
/// Walks up from `start_dir` to the repository root and derives org/project
/// from the `origin` remote. A repository without a usable remote falls back
/// to organization `"local"` and the checkout directory name. Returns `None`
/// outside a git repository.
pub fn detect_project_context(start_dir: &Path) -> Option<ProjectContext> {
    let repo = git2::Repository::discover(start_dir).ok()?;
    let root_path = repo.workdir()?.to_path_buf();

    let remote_url = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(str::to_string));

    match remote_url.as_deref().and_then(parse_remote_url) {
        Some((organization, project)) => Some(ProjectContext {
            organization,
            project,
            root_path,
            remote_url,
        }),
        None => {
            let project = root_path.file_name()?.to_string_lossy().to_string();
            tracing::debug!(%project, "no usable origin remote, using directory name");
            Some(ProjectContext {
                organization: "local".to_string(),
                project,
                root_path,
                remote_url,
            })
        }
    }
}

/// Extract `(organization, project)` from a git remote URL.
///
/// Understands SSH (`git@host:org/project.git`) and HTTP(S) forms; nested
/// group paths keep everything after the host's first segment as the
/// project.
pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
    let captures = SSH_REMOTE
        .captures(url)
        .or_else(|| HTTPS_REMOTE.captures(url))?;
    let organization = captures.get(1)?.as_str().to_string();
    let project = captures.get(2)?.as_str().trim_end_matches('/').to_string();
    Some((organization, project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("git@github.com:acme/widgets.git", "acme", "widgets")]
    #[case("git@github.com:acme/widgets", "acme", "widgets")]
    #[case("https://github.com/acme/widgets.git", "acme", "widgets")]
    #[case("https://gitlab.com/acme/widgets", "acme", "widgets")]
    #[case("http://bitbucket.org/acme/widgets/", "acme", "widgets")]
    fn parses_remote_urls(#[case] url: &str, #[case] org: &str, #[case] project: &str) {
        let (o, p) = parse_remote_url(url).unwrap();
        assert_eq!(o, org);
        assert_eq!(p, project);
    }

    #[test]
    fn rejects_unrecognized_remotes() {
        assert_eq!(parse_remote_url("not a url"), None);
        assert_eq!(parse_remote_url("ftp://host/org/project"), None);
    }

    #[test]
    fn detects_nothing_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_project_context(dir.path()), None);
    }

    #[test]
    fn falls_back_to_directory_name_without_remote() {
        let dir = tempfile::tempdir().unwrap();
        let checkout = dir.path().join("myproject");
        std::fs::create_dir(&checkout).unwrap();
        git2::Repository::init(&checkout).unwrap();

        let ctx = detect_project_context(&checkout).unwrap();
        assert_eq!(ctx.organization, "local");
        assert_eq!(ctx.project, "myproject");
        assert_eq!(ctx.remote_url, None);
    }

    #[test]
    fn reads_origin_remote() {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.remote("origin", "git@github.com:acme/widgets.git")
            .unwrap();

        let ctx = detect_project_context(dir.path()).unwrap();
        assert_eq!(ctx.organization, "acme");
        assert_eq!(ctx.project, "widgets");
    }
}
