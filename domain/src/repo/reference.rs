//! Repository reference — `owner/repo@branch` plus GitHub URL parsing.

use thiserror::Error;

/// Error parsing a repository reference.
#[derive(Debug, Error)]
pub enum RepoRefError {
    #[error("not a GitHub repository reference: {0}")]
    Invalid(String),
}

/// Identifies one GitHub repository and the branch to sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoRef {
    /// Create a reference on the default `main` branch.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".to_string(),
        }
    }

    /// Override the branch (builder style).
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Browser URL of the repository root.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// Browser URL of a file blob on the referenced branch.
    pub fn blob_url(&self, path: &str) -> String {
        format!("{}/blob/{}/{}", self.html_url(), self.branch, path)
    }

    /// Parse either a GitHub URL (`https://github.com/owner/repo`, with an
    /// optional `/tree/<branch>/...` suffix) or an `owner/repo` shorthand.
    pub fn parse(input: &str) -> Result<Self, RepoRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RepoRefError::Invalid(input.to_string()));
        }

        let path = match strip_github_host(input) {
            Some(path) => path,
            // No host: only the bare `owner/repo` shorthand is accepted.
            None if !input.contains("://") && !input.starts_with("github.com") => input,
            None => return Err(RepoRefError::Invalid(input.to_string())),
        };

        let parts: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() < 2 {
            return Err(RepoRefError::Invalid(input.to_string()));
        }

        let owner = parts[0].to_string();
        let repo = parts[1].trim_end_matches(".git").to_string();

        // `/tree/<branch>/...` selects a branch; everything else keeps main.
        let branch = if parts.len() > 3 && parts[2] == "tree" {
            parts[3].to_string()
        } else {
            "main".to_string()
        };

        Ok(Self {
            owner,
            repo,
            branch,
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

/// Strip scheme + GitHub host, returning the URL path, or `None` when the
/// input is not a github.com URL.
fn strip_github_host(input: &str) -> Option<&str> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);

    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    if host == "github.com" || host.ends_with(".github.com") {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_repo_url() {
        let r = RepoRef::parse("https://github.com/acme/widgets").unwrap();
        assert_eq!(r.owner, "acme");
        assert_eq!(r.repo, "widgets");
        assert_eq!(r.branch, "main");
    }

    #[test]
    fn parses_tree_branch_url() {
        let r = RepoRef::parse("https://github.com/acme/widgets/tree/develop/docs").unwrap();
        assert_eq!(r.branch, "develop");
        assert_eq!(r.full_name(), "acme/widgets");
    }

    #[test]
    fn parses_shorthand() {
        let r = RepoRef::parse("acme/widgets").unwrap();
        assert_eq!(r.owner, "acme");
        assert_eq!(r.repo, "widgets");
    }

    #[test]
    fn strips_dot_git_suffix() {
        let r = RepoRef::parse("https://github.com/acme/widgets.git").unwrap();
        assert_eq!(r.repo, "widgets");
    }

    #[test]
    fn rejects_non_github_urls() {
        assert!(RepoRef::parse("https://gitlab.com/acme/widgets").is_err());
        assert!(RepoRef::parse("https://github.com/acme").is_err());
        assert!(RepoRef::parse("").is_err());
    }

    #[test]
    fn blob_url_includes_branch() {
        let r = RepoRef::new("acme", "widgets").with_branch("dev");
        assert_eq!(
            r.blob_url("README.md"),
            "https://github.com/acme/widgets/blob/dev/README.md"
        );
    }
}
