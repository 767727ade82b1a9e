use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::{PullRequestRef, RepoSlug};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".glm-review.toml";

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GLM_ENDPOINT: &str = "https://api.z.ai/api/coding/paas/v4/chat/completions";
pub const DEFAULT_GLM_MODEL: &str = "glm-4.7";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("PR_NUMBER is not a pull request number: {0}")]
    InvalidPrNumber(String),

    #[error("REPO must look like owner/name, got: {0}")]
    InvalidRepo(String),
}

/// Optional settings read from the TOML config file.
/// Every field has a default, so the bot runs with no file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSettings {
    /// REST API base, without trailing slash.
    #[serde(default = "default_github_api")]
    pub api_base: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: default_github_api(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Full URL of the chat-completion endpoint.
    #[serde(default = "default_glm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_glm_model")]
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_glm_endpoint(),
            model: default_glm_model(),
        }
    }
}

fn default_github_api() -> String {
    DEFAULT_GITHUB_API.to_string()
}

fn default_glm_endpoint() -> String {
    DEFAULT_GLM_ENDPOINT.to_string()
}

fn default_glm_model() -> String {
    DEFAULT_GLM_MODEL.to_string()
}

/// GitHub connection settings plus the `GH_PAT` token.
#[derive(Clone)]
pub struct GitHubConfig {
    pub api_base: String,
    pub token: String,
}

/// GLM connection settings plus the `ZHIPU_API_KEY` credential.
#[derive(Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

// Hand-written so credentials never reach the logs.
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Everything the bot needs for one run. Built once in `main` and passed
/// down by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub target: PullRequestRef,
}

impl Config {
    /// Load the optional config file and the required environment variables.
    ///
    /// With `path == None` the default file is used if it exists; an
    /// explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        Self::load_with(path, Path::new(DEFAULT_CONFIG_FILE), |name| {
            std::env::var(name).ok()
        })
    }

    /// `load` with the default file location and environment lookup injected.
    pub fn load_with<F>(path: Option<&Path>, default: &Path, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => Self::load_file(path)?,
            None if default.exists() => Self::load_file(default)?,
            None => FileConfig::default(),
        };

        Self::from_parts(file, env)
    }

    /// Replace the configured model when one is given on the command line.
    pub fn with_model(mut self, model: Option<String>) -> Config {
        if let Some(model) = model {
            self.llm.model = model;
        }
        self
    }

    /// Parse a config file (useful for testing).
    pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let file = toml::from_str(&contents)?;
        Ok(file)
    }

    /// Combine file settings with values from an environment lookup.
    pub fn from_parts<F>(file: FileConfig, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| env(name).ok_or(ConfigError::MissingEnv(name));

        let api_key = require("ZHIPU_API_KEY")?;
        let token = require("GH_PAT")?;

        let raw_pr = require("PR_NUMBER")?;
        let pr_number = raw_pr
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidPrNumber(raw_pr.clone()))?;

        let raw_repo = require("REPO")?;
        let repo = RepoSlug::parse(raw_repo.trim())
            .ok_or_else(|| ConfigError::InvalidRepo(raw_repo.clone()))?;

        Ok(Config {
            github: GitHubConfig {
                api_base: file.github.api_base.trim_end_matches('/').to_string(),
                token,
            },
            llm: LlmConfig {
                endpoint: file.llm.endpoint,
                model: file.llm.model,
                api_key,
            },
            target: PullRequestRef { repo, pr_number },
        })
    }
}
