//! Executes parsed intents against a workspace and phrases the results for a
//! conversational client.

use std::path::{Path, PathBuf};

use crate::addons::{
    ADDON_NAMES, Addon, AddonContext, Graphviz, Infracost, ScanOutcome, Tfsec, get_addon,
};
use crate::error::AssistantError;
use crate::format::{
    MAX_OUTPUT_CHARS, ToolStatusRow, bullet_list, format_output, render_module_tree,
    render_outputs, truncate,
};
use crate::intent::Intent;
use crate::terraform::runner::DEFAULT_PLAN_FILE;
use crate::terraform::state::group_by_module;
use crate::terraform::{
    DriftStatus, PlanSummary, TerraformRunner, modules_from_state, parse_outputs,
};
use crate::workspace::{find_providers, find_variables, tf_files};

pub const PLAN_GRAPH_FILE: &str = "terraform_plan.png";

const REPHRASE_HINT: &str = "I couldn't determine the specific Terraform operation you want to perform. \
Please try queries related to plan visualization, state inspection, cost estimation, \
security analysis, drift detection, module documentation, or use explicit commands like \
'terraform init', 'terraform apply', or 'terraform destroy'.";

/// Text returned to the client, flagged when it describes a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    pub fn ok(text: impl AsRef<str>) -> Self {
        Self {
            text: truncate(text.as_ref(), MAX_OUTPUT_CHARS),
            is_error: false,
        }
    }

    pub fn error(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        tracing::warn!(summary = %text.lines().next().unwrap_or_default(), "tool reported an error");
        Self {
            text: truncate(text, MAX_OUTPUT_CHARS),
            is_error: true,
        }
    }
}

pub struct Assistant {
    runner: TerraformRunner,
    project_root: PathBuf,
    allow_destructive: bool,
}

impl Assistant {
    pub fn new(runner: TerraformRunner, project_root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            project_root: project_root.into(),
            allow_destructive: true,
        }
    }

    /// In read-only mode apply and destroy are refused.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.allow_destructive = !read_only;
        self
    }

    pub fn runner(&self) -> &TerraformRunner {
        &self.runner
    }

    pub fn workspace(&self) -> &Path {
        self.runner.workspace()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    fn addon_context(&self) -> AddonContext {
        AddonContext::from_runner(&self.runner)
    }

    pub async fn handle_query(&self, query: &str) -> ToolReply {
        let intent = Intent::parse(query);
        tracing::info!(%intent, "handling query");
        self.execute(intent).await
    }

    pub async fn execute(&self, intent: Intent) -> ToolReply {
        if intent.is_destructive() && !self.allow_destructive {
            return ToolReply::error(format!(
                "Refusing to run terraform {}: the assistant is running in read-only mode. \
                 Restart it without --read-only to allow changes.",
                intent
            ));
        }

        match intent {
            Intent::Plan => self.plan().await,
            Intent::StateList => self.state_list().await,
            Intent::Cost => self.cost().await,
            Intent::Security => self.security().await,
            Intent::Drift => self.drift().await,
            Intent::Show => self.show().await,
            Intent::Apply => self.apply().await,
            Intent::Destroy => self.destroy().await,
            Intent::Init => self.init().await,
            Intent::Raw(args) => self.raw(&args).await,
            Intent::Unknown => ToolReply::ok(format!(
                "I couldn't determine which Terraform operation to perform. Please be more specific.\n\n{}",
                REPHRASE_HINT
            )),
        }
    }

    pub fn check_access(&self) -> ToolReply {
        let root = &self.project_root;
        if !root.is_dir() {
            return ToolReply::error(format!(
                "Project directory not found or not set: {}",
                root.display()
            ));
        }

        let mut entries: Vec<String> = match std::fs::read_dir(root) {
            Ok(dir) => dir
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(e) => {
                return ToolReply::error(format!("Error accessing project directory: {}", e));
            }
        };
        entries.sort();

        let mut text = format!(
            "Server has access to the project directory at: {}\nTerraform workspace: {}",
            root.display(),
            self.workspace().display()
        );
        text.push_str("\n\n");
        text.push_str(&bullet_list("Contents:", &entries));
        ToolReply::ok(text)
    }

    pub async fn init(&self) -> ToolReply {
        match self.runner.init().await {
            Ok(out) => ToolReply::ok(format_output(&out.stdout, &out.stderr)),
            Err(e) => ToolReply::error(format!("Error during terraform init: {}", e.detail())),
        }
    }

    pub async fn plan(&self) -> ToolReply {
        let out = match self.runner.plan(DEFAULT_PLAN_FILE).await {
            Ok(out) => out,
            Err(e) => return ToolReply::error(format!("Error generating plan: {}", e.detail())),
        };

        let mut text = String::new();
        if let Some(summary) = PlanSummary::parse(&out.stdout) {
            text.push_str(&summary.to_string());
            text.push_str("\n\n");
        }
        text.push_str(&format_output(&out.stdout, &out.stderr));

        let ctx = self.addon_context();
        if Graphviz.is_installed(&ctx).await {
            match self.visualize_plan(&ctx).await {
                Ok(()) => {
                    text.push_str(&format!("\n\nPlan visualization saved as {}", PLAN_GRAPH_FILE))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "plan visualization failed");
                    text.push_str("\n\nNote: Plan visualization failed");
                }
            }
        }

        ToolReply::ok(text)
    }

    async fn visualize_plan(&self, ctx: &AddonContext) -> Result<(), AssistantError> {
        let dot = self.runner.graph_plan(DEFAULT_PLAN_FILE).await?;
        Graphviz
            .render_png(ctx, &dot, Path::new(PLAN_GRAPH_FILE))
            .await
    }

    pub async fn state_list(&self) -> ToolReply {
        match self.runner.state_list().await {
            Ok(resources) if resources.is_empty() => {
                ToolReply::ok("No resources found in the current state.")
            }
            Ok(resources) => ToolReply::ok(format!(
                "Current Terraform-managed resources:\n{}",
                resources.join("\n")
            )),
            Err(e) => ToolReply::error(format!("Error listing state resources: {}", e.detail())),
        }
    }

    pub async fn cost(&self) -> ToolReply {
        let ctx = self.addon_context();
        if let Err(e) = Infracost.ensure_installed(&ctx).await {
            return ToolReply::error(e.to_string());
        }
        match Infracost.breakdown(&ctx).await {
            Ok(report) => ToolReply::ok(format!("Cost estimation:\n\n{}", report.trim())),
            Err(e) => ToolReply::error(format!("Error estimating costs: {}", e.detail())),
        }
    }

    pub async fn security(&self) -> ToolReply {
        let ctx = self.addon_context();
        if let Err(e) = Tfsec.ensure_installed(&ctx).await {
            return ToolReply::error(e.to_string());
        }
        match Tfsec.scan(&ctx).await {
            Ok(ScanOutcome::Clean(report)) if report.is_empty() => {
                ToolReply::ok("No security issues found in the configuration.")
            }
            Ok(ScanOutcome::Clean(report)) => {
                ToolReply::ok(format!("Security analysis results:\n\n{}", report))
            }
            Ok(ScanOutcome::Findings(report)) => {
                ToolReply::ok(format!("Security issues detected:\n\n{}", report))
            }
            Err(e) => ToolReply::error(format!("Error running security analysis: {}", e.detail())),
        }
    }

    pub async fn drift(&self) -> ToolReply {
        let out = match self.runner.plan_detailed_exitcode().await {
            Ok(out) => out,
            Err(e) => return ToolReply::error(format!("Error checking for drift: {}", e.detail())),
        };

        match DriftStatus::from_exit_code(out.code()) {
            DriftStatus::InSync => {
                ToolReply::ok("No drift detected. The infrastructure matches the configuration.")
            }
            DriftStatus::Drifted => ToolReply::ok(format!(
                "Drift detected! The current infrastructure state differs from the configuration:\n\n{}",
                out.stdout.trim()
            )),
            DriftStatus::Failed(code) => {
                tracing::debug!(code, "drift check failed");
                ToolReply::error(format!("Error checking for drift: {}", out.stderr.trim()))
            }
        }
    }

    pub async fn show(&self) -> ToolReply {
        match self.runner.show().await {
            Ok(out) => ToolReply::ok(format!(
                "Current Terraform configuration details:\n\n{}",
                out.stdout.trim()
            )),
            Err(e) => ToolReply::error(format!("Error showing configuration: {}", e.detail())),
        }
    }

    pub async fn apply(&self) -> ToolReply {
        match self.runner.apply(true).await {
            Ok(out) => ToolReply::ok(format!(
                "Terraform apply executed successfully:\n\n{}",
                out.stdout.trim()
            )),
            Err(e) => ToolReply::error(format!("Error during terraform apply: {}", e.detail())),
        }
    }

    pub async fn destroy(&self) -> ToolReply {
        match self.runner.destroy(true).await {
            Ok(out) => ToolReply::ok(format!(
                "Terraform destroy executed successfully:\n\n{}",
                out.stdout.trim()
            )),
            Err(e) => ToolReply::error(format!("Error during terraform destroy: {}", e.detail())),
        }
    }

    pub async fn raw(&self, args: &[String]) -> ToolReply {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match self.runner.run_checked(&args).await {
            Ok(out) => ToolReply::ok(format!("Command output:\n\n{}", out.stdout.trim())),
            Err(e) => ToolReply::error(format!(
                "Error executing command: {}\n\n{}",
                e.detail(),
                REPHRASE_HINT
            )),
        }
    }

    pub async fn modules(&self) -> String {
        match self.runner.state_list().await {
            Ok(resources) => {
                let modules = modules_from_state(&resources);
                if modules.is_empty() {
                    "No modules found in the current Terraform state.".to_string()
                } else {
                    bullet_list("Terraform modules in use:", &modules)
                }
            }
            Err(e) => format!("Error listing Terraform modules: {}", e.detail()),
        }
    }

    pub async fn state_tree(&self) -> String {
        match self.runner.state_list().await {
            Ok(resources) if resources.is_empty() => {
                "No resources found in the current state.".to_string()
            }
            Ok(resources) => {
                let label = self
                    .workspace()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| ".".to_string());
                render_module_tree(&label, &group_by_module(&resources))
            }
            Err(e) => format!("Error listing state resources: {}", e.detail()),
        }
    }

    pub async fn variables(&self) -> String {
        let files = match tf_files(self.workspace()) {
            Ok(files) => files,
            Err(e) => return format!("Error retrieving Terraform variables: {}", e),
        };
        if files.is_empty() {
            return "No Terraform (.tf) files found in the current directory.".to_string();
        }

        let variables = match find_variables(&files) {
            Ok(vars) => vars,
            Err(e) => return format!("Error retrieving Terraform variables: {}", e),
        };
        if variables.is_empty() {
            return "No variables found in the Terraform configuration files.".to_string();
        }

        let mut text = String::from("Terraform variables defined in the project:\n");
        for var in &variables {
            // Values are best effort; unset or unevaluable variables are listed bare.
            match self.runner.console_eval(&format!("var.{}", var)).await {
                Ok(value) if !value.is_empty() => {
                    text.push_str(&format!("- {} = {}\n", var, value))
                }
                Ok(_) => text.push_str(&format!("- {}\n", var)),
                Err(e) => {
                    tracing::debug!(variable = %var, error = %e, "could not evaluate variable");
                    text.push_str(&format!("- {}\n", var));
                }
            }
        }
        text
    }

    pub async fn outputs(&self) -> String {
        let raw = match self.runner.output_json().await {
            Ok(raw) => raw,
            Err(e) => return format!("Error retrieving Terraform outputs: {}", e.detail()),
        };
        if raw.trim().is_empty() {
            return "No outputs found in the Terraform state.".to_string();
        }

        match parse_outputs(&raw) {
            Ok(outputs) if outputs.is_empty() => {
                "No outputs found in the Terraform state.".to_string()
            }
            Ok(outputs) => render_outputs(&outputs),
            Err(e) => {
                tracing::debug!(error = %e, "terraform output -json was not valid JSON");
                format!(
                    "Error parsing Terraform outputs: Invalid JSON format\n\nRaw output:\n{}",
                    raw
                )
            }
        }
    }

    pub async fn providers(&self) -> String {
        let err = match self.runner.providers().await {
            Ok(out) if out.trim().is_empty() => {
                return "No provider information available.".to_string();
            }
            Ok(out) => return format!("Terraform providers:\n\n{}", out.trim()),
            Err(e) => e,
        };

        tracing::info!("terraform providers failed, scanning configuration files");
        let fallback = tf_files(self.workspace()).and_then(|files| {
            if files.is_empty() {
                return Ok(None);
            }
            find_providers(&files).map(Some)
        });

        match fallback {
            Ok(None) => "No Terraform (.tf) files found in the current directory.".to_string(),
            Ok(Some(providers)) if providers.is_empty() => {
                "No providers found in the Terraform configuration files.".to_string()
            }
            Ok(Some(providers)) => bullet_list("Terraform providers in use:", &providers),
            Err(fallback_err) => format!(
                "Error retrieving Terraform providers: {}\nFallback method also failed: {}",
                err.detail(),
                fallback_err
            ),
        }
    }

    /// Availability of Terraform and every addon, for diagnostics.
    pub async fn tool_status(&self) -> Vec<ToolStatusRow> {
        let terraform = match self.runner.version().await {
            Ok(version) => version,
            Err(_) => "no".to_string(),
        };
        let mut rows = vec![ToolStatusRow {
            tool: "terraform".to_string(),
            purpose: "infrastructure as code".to_string(),
            installed: terraform,
        }];

        let ctx = self.addon_context();
        for name in ADDON_NAMES {
            let Ok(addon) = get_addon(name) else { continue };
            let installed = if addon.is_installed(&ctx).await { "yes" } else { "no" };
            rows.push(ToolStatusRow {
                tool: addon.binary().to_string(),
                purpose: addon.purpose().to_string(),
                installed: installed.to_string(),
            });
        }
        rows
    }
}
