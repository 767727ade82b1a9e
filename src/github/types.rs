use serde::{Deserialize, Serialize};

/// One entry of the "list pull request files" response.
/// GitHub omits `patch` for binary files and for diffs it considers too large.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub patch: Option<String>,
}

/// Body of the "create issue comment" request.
#[derive(Debug, Serialize)]
pub struct CreateComment<'a> {
    pub body: &'a str,
}

/// An `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse `owner/name`. Both halves must be non-empty and there must be
    /// exactly one slash.
    pub fn parse(slug: &str) -> Option<RepoSlug> {
        let (owner, name) = slug.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(RepoSlug {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The pull request the bot is reviewing.
#[derive(Debug, Clone)]
pub struct PullRequestRef {
    pub repo: RepoSlug,
    pub pr_number: u64,
}
