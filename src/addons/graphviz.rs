use std::path::Path;

use async_trait::async_trait;

use super::{Addon, AddonContext};
use crate::error::AssistantError;

/// Graphviz `dot`, used to render Terraform's plan graph.
pub struct Graphviz;

impl Graphviz {
    /// Pipe DOT source into `dot -Tpng`, writing `out_path` (relative paths
    /// resolve against the workspace).
    pub async fn render_png(
        &self,
        ctx: &AddonContext,
        dot_source: &str,
        out_path: &Path,
    ) -> Result<(), AssistantError> {
        let out = format!("-o{}", out_path.display());
        ctx.invocation(self.binary())
            .args(["-Tpng".to_string(), out])
            .stdin(dot_source)
            .run_checked()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Addon for Graphviz {
    fn name(&self) -> &str {
        "graphviz"
    }

    fn binary(&self) -> &str {
        "dot"
    }

    fn purpose(&self) -> &str {
        "plan visualization"
    }

    fn install_url(&self) -> &str {
        "https://graphviz.org/download/"
    }

    fn version_args(&self) -> &[&str] {
        &["-V"]
    }
}
