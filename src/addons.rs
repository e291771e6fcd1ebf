pub mod graphviz;
pub mod infracost;
pub mod tfsec;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::process::{Invocation, find_on_path};
use crate::terraform::TerraformRunner;

pub use graphviz::Graphviz;
pub use infracost::Infracost;
pub use tfsec::{ScanOutcome, Tfsec};

#[derive(Debug, Error)]
pub enum AddonError {
    #[error("unknown addon: {0}")]
    UnknownTool(String),
    #[error(
        "Error: '{binary}' is required for {purpose} but was not found. Please install it from {url}"
    )]
    NotInstalled {
        binary: String,
        purpose: String,
        url: String,
    },
}

/// Where and how auxiliary tools run; shared with the Terraform runner so
/// they see the same directory and environment.
#[derive(Debug, Clone)]
pub struct AddonContext {
    pub dir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl AddonContext {
    pub fn from_runner(runner: &TerraformRunner) -> Self {
        Self {
            dir: runner.workspace().to_path_buf(),
            env: runner.env().clone(),
            timeout: runner.timeout(),
        }
    }

    pub fn invocation(&self, binary: &str) -> Invocation {
        Invocation::new(binary, &self.dir)
            .env(&self.env)
            .timeout(self.timeout)
    }
}

/// An optional external program the assistant can shell out to.
#[async_trait]
pub trait Addon: Send + Sync {
    fn name(&self) -> &str;
    fn binary(&self) -> &str;
    fn purpose(&self) -> &str;
    fn install_url(&self) -> &str;

    fn version_args(&self) -> &[&str] {
        &["--version"]
    }

    async fn is_installed(&self, ctx: &AddonContext) -> bool {
        check_tool_installed(self.binary(), self.version_args(), ctx).await
    }

    async fn ensure_installed(&self, ctx: &AddonContext) -> Result<(), AddonError> {
        if self.is_installed(ctx).await {
            return Ok(());
        }
        Err(AddonError::NotInstalled {
            binary: self.binary().to_string(),
            purpose: self.purpose().to_string(),
            url: self.install_url().to_string(),
        })
    }
}

pub const ADDON_NAMES: &[&str] = &["graphviz", "infracost", "tfsec"];

pub fn get_addon(name: &str) -> Result<Box<dyn Addon>, AddonError> {
    match name {
        "graphviz" | "dot" => Ok(Box::new(Graphviz)),
        "infracost" => Ok(Box::new(Infracost)),
        "tfsec" => Ok(Box::new(Tfsec)),
        other => Err(AddonError::UnknownTool(other.to_string())),
    }
}

/// `PATH` lookup first; failing that, see whether the binary answers a
/// version query (covers shims the OS resolves on its own).
pub async fn check_tool_installed(binary: &str, version_args: &[&str], ctx: &AddonContext) -> bool {
    if let Some(path) = find_on_path(binary) {
        tracing::debug!(binary, path = %path.display(), "tool found on PATH");
        return true;
    }

    let probe = ctx
        .invocation(binary)
        .args(version_args.iter().copied())
        .timeout(Duration::from_secs(10))
        .run_checked()
        .await;

    match probe {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(binary, error = %e, "tool is not installed");
            false
        }
    }
}
