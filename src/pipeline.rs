use colored::Colorize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::comment::format_comment;
use crate::config::Config;
use crate::github::{GitHubClient, GitHubError};
use crate::review::{ReviewError, Reviewer};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch pull request diff: {0}")]
    Fetch(#[from] GitHubError),

    #[error("Failed to get review from model: {0}")]
    Review(#[from] ReviewError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the comment instead of posting it.
    pub dry_run: bool,
}

/// How a run ended. Everything here is a normal exit.
#[derive(Debug)]
pub enum Outcome {
    /// No changed file carried a textual patch; nothing was reviewed.
    NoDiff,
    /// The review was posted to the pull request.
    Commented,
    /// The review was produced but posting it failed.
    CommentFailed(GitHubError),
    /// Dry run: the comment body that would have been posted.
    DryRun(String),
}

/// Fetch the diff, ask the model for a review and post it.
///
/// The three calls run strictly one after another. An empty diff stops the
/// run before the model is called. Fetch and review failures abort the run;
/// a failed comment post does not.
#[instrument(skip_all, fields(repo = %config.target.repo, pr = config.target.pr_number, model = reviewer.model()))]
pub async fn run(
    config: &Config,
    github: &GitHubClient,
    reviewer: &dyn Reviewer,
    options: RunOptions,
) -> Result<Outcome, PipelineError> {
    let target = &config.target;

    println!("Fetching PR diff...");
    let diff = github.fetch_diff(target).await?;

    if diff.is_empty() {
        println!("{}", "No diff found or diff is too large.".yellow());
        info!("no textual patch in pull request, skipping review");
        return Ok(Outcome::NoDiff);
    }
    info!(diff_bytes = diff.len(), "fetched diff");

    println!("Sending to GLM...");
    let review = reviewer.request_review(&diff).await?;
    info!(review_bytes = review.len(), "received review");

    if options.dry_run {
        let body = format_comment(&review);
        println!("{}", body);
        info!("dry run, comment not posted");
        return Ok(Outcome::DryRun(body));
    }

    println!("Posting comment to GitHub...");
    let outcome = match github.post_comment(target, &review).await {
        Ok(()) => {
            info!("comment posted");
            Outcome::Commented
        }
        Err(err) => Outcome::CommentFailed(err),
    };
    println!("{}", "Done!".green());

    Ok(outcome)
}
