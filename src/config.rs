use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assistant::Assistant;
use crate::error::AssistantError;
use crate::terraform::TerraformRunner;
use crate::terraform::locate::TERRAFORM_BINARY;
use crate::terraform::runner::DEFAULT_TIMEOUT;
use crate::workspace::{resolve_workspace, validate_workspace};

pub const LOG_FILE_NAME: &str = "tfa.log";

/// Load a `.env` file: `path` if given, otherwise the nearest one above the
/// current directory. A missing file is `Ok(None)`.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project_root: PathBuf,
    pub workspace: PathBuf,
    pub terraform_bin: Option<PathBuf>,
    pub timeout: Duration,
    pub read_only: bool,
}

impl Config {
    /// `project_root` defaults to the current directory; `workspace` is
    /// discovered under the project root when not given.
    pub fn resolve(
        project_root: Option<PathBuf>,
        workspace: Option<PathBuf>,
    ) -> Result<Self, AssistantError> {
        let project_root = match project_root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        tracing::info!(path = %project_root.display(), "project root");

        let workspace = match workspace {
            Some(ws) => {
                tracing::info!(path = %ws.display(), "using configured terraform workspace");
                ws
            }
            None => resolve_workspace(&project_root),
        };

        Ok(Self {
            project_root,
            workspace,
            terraform_bin: None,
            timeout: DEFAULT_TIMEOUT,
            read_only: false,
        })
    }

    pub fn with_terraform_bin(mut self, bin: Option<PathBuf>) -> Self {
        self.terraform_bin = bin;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Result<Self, AssistantError> {
        if secs == 0 {
            return Err(AssistantError::Config(
                "command timeout must be greater than zero".to_string(),
            ));
        }
        self.timeout = Duration::from_secs(secs);
        Ok(self)
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Validate the workspace, find Terraform and wire up an [`Assistant`].
    pub async fn build_assistant(&self) -> Result<Assistant, AssistantError> {
        validate_workspace(&self.workspace)?;

        let runner = TerraformRunner::discover(self.terraform_bin.as_deref(), &self.workspace)
            .await?
            .with_timeout(self.timeout);

        tracing::info!(
            workspace = %self.workspace.display(),
            read_only = self.read_only,
            "terraform assistant ready"
        );

        Ok(Assistant::new(runner, &self.project_root).read_only(self.read_only))
    }

    /// Like [`Config::build_assistant`], but problems are collected instead of
    /// returned early. A missing binary falls back to the bare `terraform`
    /// name so diagnostics can still run.
    pub async fn diagnostic_assistant(&self) -> (Assistant, Vec<AssistantError>) {
        let mut problems = Vec::new();

        if let Err(e) = validate_workspace(&self.workspace) {
            problems.push(e);
        }

        let runner =
            match TerraformRunner::discover(self.terraform_bin.as_deref(), &self.workspace).await {
                Ok(runner) => runner,
                Err(e) => {
                    problems.push(e);
                    TerraformRunner::new(TERRAFORM_BINARY, &self.workspace)
                }
            };

        let assistant = Assistant::new(runner.with_timeout(self.timeout), &self.project_root)
            .read_only(self.read_only);
        (assistant, problems)
    }
}
