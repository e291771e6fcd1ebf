use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AssistantError;
use crate::process::{CommandOutput, Invocation};

use super::locate::{TERRAFORM_BINARY, locate_terraform};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
pub const CONSOLE_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_PLAN_FILE: &str = "tfplan";

/// Runs `terraform` subcommands inside a single workspace directory.
#[derive(Debug, Clone)]
pub struct TerraformRunner {
    binary: PathBuf,
    workspace: PathBuf,
    env: BTreeMap<String, String>,
    timeout: Duration,
}

impl TerraformRunner {
    pub fn new(binary: impl Into<PathBuf>, workspace: impl Into<PathBuf>) -> Self {
        let mut env = BTreeMap::new();
        // Never block on interactive prompts; the caller has no terminal.
        env.insert("TF_IN_AUTOMATION".to_string(), "1".to_string());
        env.insert("TF_INPUT".to_string(), "0".to_string());

        Self {
            binary: binary.into(),
            workspace: workspace.into(),
            env,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Locate the binary and confirm it runs.
    pub async fn discover(
        explicit: Option<&Path>,
        workspace: impl Into<PathBuf>,
    ) -> Result<Self, AssistantError> {
        let workspace = workspace.into();

        if let Some(binary) = locate_terraform(explicit) {
            tracing::info!(binary = %binary.display(), "using terraform");
            return Ok(Self::new(binary, workspace));
        }

        // Last resort: let the OS resolve it, e.g. through a shell shim.
        let probe = Self::new(TERRAFORM_BINARY, workspace);
        match probe.version().await {
            Ok(version) => {
                tracing::info!(%version, "terraform resolved by the OS");
                Ok(probe)
            }
            Err(e) => Err(AssistantError::ToolNotInstalled {
                tool: TERRAFORM_BINARY.to_string(),
                hint: format!(
                    "Install it from https://developer.hashicorp.com/terraform/install ({})",
                    e
                ),
            }),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new(&self.binary, &self.workspace)
            .args(args.iter().copied())
            .env(&self.env)
            .timeout(self.timeout)
    }

    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput, AssistantError> {
        self.invocation(args).run().await
    }

    pub async fn run_checked(&self, args: &[&str]) -> Result<CommandOutput, AssistantError> {
        self.invocation(args).run_checked().await
    }

    pub async fn version(&self) -> Result<String, AssistantError> {
        let output = self.run_checked(&["version"]).await?;
        Ok(output.stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    pub async fn init(&self) -> Result<CommandOutput, AssistantError> {
        self.run_checked(&["init"]).await
    }

    pub async fn plan(&self, out_file: &str) -> Result<CommandOutput, AssistantError> {
        let out = format!("-out={}", out_file);
        self.run_checked(&["plan", &out]).await
    }

    /// Exit code 0 means no changes, 2 means changes; both are returned as-is.
    pub async fn plan_detailed_exitcode(&self) -> Result<CommandOutput, AssistantError> {
        self.run(&["plan", "-detailed-exitcode"]).await
    }

    pub async fn apply(&self, auto_approve: bool) -> Result<CommandOutput, AssistantError> {
        if auto_approve {
            self.run_checked(&["apply", "-auto-approve"]).await
        } else {
            self.run_checked(&["apply"]).await
        }
    }

    pub async fn destroy(&self, auto_approve: bool) -> Result<CommandOutput, AssistantError> {
        if auto_approve {
            self.run_checked(&["destroy", "-auto-approve"]).await
        } else {
            self.run_checked(&["destroy"]).await
        }
    }

    pub async fn state_list(&self) -> Result<Vec<String>, AssistantError> {
        let output = self.run_checked(&["state", "list"]).await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn show(&self) -> Result<CommandOutput, AssistantError> {
        self.run_checked(&["show"]).await
    }

    pub async fn output_json(&self) -> Result<String, AssistantError> {
        Ok(self.run_checked(&["output", "-json"]).await?.stdout)
    }

    pub async fn providers(&self) -> Result<String, AssistantError> {
        Ok(self.run_checked(&["providers"]).await?.stdout)
    }

    /// DOT source for the graph of a saved plan.
    pub async fn graph_plan(&self, plan_file: &str) -> Result<String, AssistantError> {
        let graph_type = "-type=plan";
        let plan = format!("-plan={}", plan_file);
        Ok(self.run_checked(&["graph", graph_type, &plan]).await?.stdout)
    }

    /// Evaluate one expression with `terraform console`.
    pub async fn console_eval(&self, expression: &str) -> Result<String, AssistantError> {
        let output = self
            .invocation(&["console"])
            .stdin(format!("{}\n", expression))
            .timeout(CONSOLE_TIMEOUT)
            .run_checked()
            .await?;
        Ok(output.stdout.trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::{TempDir, tempdir};

    /// A fake `terraform` that echoes its arguments and honours a few
    /// subcommands the runner cares about.
    fn fake_terraform(dir: &TempDir) -> PathBuf {
        let script = r#"#!/bin/sh
case "$1" in
  version) echo "Terraform v1.9.0"; echo "on linux_amd64" ;;
  state) printf 'aws_instance.web\n\nmodule.vpc.aws_subnet.a\n' ;;
  console) read expr; echo "\"value-of-$expr\"" ;;
  plan)
    if [ "$2" = "-detailed-exitcode" ]; then echo "drifted"; exit 2; fi
    echo "args: $*" ;;
  fail) echo "bad things" >&2; exit 1 ;;
  *) echo "args: $*" ;;
esac
"#;
        let path = dir.path().join("terraform");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_version_first_line() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        assert_eq!(runner.version().await.unwrap(), "Terraform v1.9.0");
    }

    #[tokio::test]
    async fn test_plan_passes_out_file() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let output = runner.plan("tfplan").await.unwrap();
        assert_eq!(output.stdout.trim(), "args: plan -out=tfplan");
    }

    #[tokio::test]
    async fn test_detailed_exitcode_is_not_an_error() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let output = runner.plan_detailed_exitcode().await.unwrap();
        assert_eq!(output.status, Some(2));
    }

    #[tokio::test]
    async fn test_apply_auto_approve_flag() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let output = runner.apply(true).await.unwrap();
        assert_eq!(output.stdout.trim(), "args: apply -auto-approve");
        let output = runner.destroy(false).await.unwrap();
        assert_eq!(output.stdout.trim(), "args: destroy");
    }

    #[tokio::test]
    async fn test_state_list_skips_blank_lines() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let resources = runner.state_list().await.unwrap();
        assert_eq!(resources, vec!["aws_instance.web", "module.vpc.aws_subnet.a"]);
    }

    #[tokio::test]
    async fn test_console_eval_reads_stdin() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let value = runner.console_eval("var.region").await.unwrap();
        assert_eq!(value, "\"value-of-var.region\"");
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let temp = tempdir().unwrap();
        let runner = TerraformRunner::new(fake_terraform(&temp), temp.path());
        let err = runner.run_checked(&["fail"]).await.unwrap_err();
        assert_eq!(err.detail(), "bad things");
    }

    #[test]
    fn test_default_env_disables_prompts() {
        let runner = TerraformRunner::new("terraform", "/tmp").with_env("TF_LOG", "WARN");
        assert_eq!(runner.env().get("TF_INPUT").map(String::as_str), Some("0"));
        assert_eq!(runner.env().get("TF_LOG").map(String::as_str), Some("WARN"));
        assert_eq!(runner.timeout(), DEFAULT_TIMEOUT);
    }
}
