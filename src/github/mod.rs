pub mod diff;
pub mod types;

pub use types::{ChangedFile, PullRequestRef, RepoSlug};

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::comment::format_comment;
use crate::config::GitHubConfig;
use types::CreateComment;

const USER_AGENT: &str = concat!("glm-review-bot/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed GitHub response: {0}")]
    MalformedResponse(String),
}

/// Thin client over the two GitHub REST endpoints the bot uses.
pub struct GitHubClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    /// List the files changed by the pull request.
    ///
    /// Only the first page GitHub returns is read.
    #[instrument(skip(self), fields(repo = %target.repo, pr = target.pr_number))]
    pub async fn list_files(&self, target: &PullRequestRef) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.api_base, target.repo.owner, target.repo.name, target.pr_number
        );

        debug!("fetching changed files from GitHub API");
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GitHubError::Status { status, body });
        }

        // A rate-limited or otherwise odd reply is an object, not a list.
        let files: Vec<ChangedFile> = serde_json::from_str(&body).map_err(|e| {
            GitHubError::MalformedResponse(format!("expected a list of changed files: {}", e))
        })?;
        debug!(files = files.len(), "received changed files");
        Ok(files)
    }

    /// Fetch the pull request's changed files and join their patches.
    /// Returns an empty string when no file carries a textual patch.
    pub async fn fetch_diff(&self, target: &PullRequestRef) -> Result<String, GitHubError> {
        let files = self.list_files(target).await?;
        let bundle = diff::build_diff_bundle(&files);
        debug!(diff_bytes = bundle.len(), "built diff bundle");
        Ok(bundle)
    }

    /// Post `message` under the bot header as a new comment on the
    /// pull request's conversation.
    #[instrument(skip(self, message), fields(repo = %target.repo, pr = target.pr_number))]
    pub async fn post_comment(&self, target: &PullRequestRef, message: &str) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, target.repo.owner, target.repo.name, target.pr_number
        );
        let body = format_comment(message);

        debug!(comment_bytes = body.len(), "posting comment to GitHub API");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", GITHUB_ACCEPT)
            .json(&CreateComment { body: &body })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, body });
        }
        debug!(%status, "comment created");
        Ok(())
    }
}
