mod comment;
mod config;
mod github;
mod pipeline;
mod review;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// GLM Review Bot: reviews a GitHub Pull Request with Zhipu GLM and posts
/// the result as a PR comment.
///
/// Reads ZHIPU_API_KEY, GH_PAT, PR_NUMBER and REPO (owner/name) from the
/// environment.
#[derive(Parser, Debug)]
#[command(name = "glm-review-bot", version, about)]
struct Cli {
    /// TOML config file with endpoint and model overrides
    /// (defaults to .glm-review.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model identifier to request, overriding the config file
    #[arg(short, long)]
    model: Option<String>,

    /// Print the review comment instead of posting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?.with_model(cli.model);
    debug!(github = ?config.github, llm = ?config.llm, "loaded configuration");

    let _main_span = info_span!(
        "glm_review",
        repo = %config.target.repo,
        pr = config.target.pr_number
    )
    .entered();

    let github_client = github::GitHubClient::new(&config.github)?;
    let reviewer = review::GlmClient::new(&config.llm)?;

    let options = pipeline::RunOptions {
        dry_run: cli.dry_run,
    };
    match pipeline::run(&config, &github_client, &reviewer, options).await? {
        pipeline::Outcome::NoDiff => info!("nothing to review"),
        pipeline::Outcome::Commented => info!("review posted"),
        pipeline::Outcome::CommentFailed(err) => {
            warn!(error = %err, "review was produced but the comment could not be posted")
        }
        pipeline::Outcome::DryRun(body) => info!(comment_bytes = body.len(), "dry run finished"),
    }

    Ok(())
}
