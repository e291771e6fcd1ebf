use async_trait::async_trait;

use super::{Addon, AddonContext};
use crate::error::AssistantError;

/// tfsec static security analysis.
pub struct Tfsec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Exit code 0; the report may still carry informational text.
    Clean(String),
    /// Non-zero exit with a report on stdout.
    Findings(String),
}

impl Tfsec {
    pub async fn scan(&self, ctx: &AddonContext) -> Result<ScanOutcome, AssistantError> {
        let output = ctx.invocation(self.binary()).args(["."]).run().await?;

        if output.success() {
            return Ok(ScanOutcome::Clean(output.stdout.trim().to_string()));
        }

        let report = output.stdout.trim();
        if report.is_empty() {
            return Err(AssistantError::CommandFailed {
                command: "tfsec .".to_string(),
                code: output.code(),
                stderr: output.stderr,
            });
        }

        tracing::info!(code = output.code(), "tfsec reported findings");
        Ok(ScanOutcome::Findings(report.to_string()))
    }
}

#[async_trait]
impl Addon for Tfsec {
    fn name(&self) -> &str {
        "tfsec"
    }

    fn binary(&self) -> &str {
        "tfsec"
    }

    fn purpose(&self) -> &str {
        "security analysis"
    }

    fn install_url(&self) -> &str {
        "https://github.com/aquasecurity/tfsec"
    }
}
