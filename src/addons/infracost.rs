use async_trait::async_trait;

use super::{Addon, AddonContext};
use crate::error::AssistantError;

/// Infracost cost estimation.
pub struct Infracost;

impl Infracost {
    pub async fn breakdown(&self, ctx: &AddonContext) -> Result<String, AssistantError> {
        let output = ctx
            .invocation(self.binary())
            .args(["breakdown", "--path", "."])
            .run_checked()
            .await?;
        Ok(output.stdout)
    }
}

#[async_trait]
impl Addon for Infracost {
    fn name(&self) -> &str {
        "infracost"
    }

    fn binary(&self) -> &str {
        "infracost"
    }

    fn purpose(&self) -> &str {
        "cost estimation"
    }

    fn install_url(&self) -> &str {
        "https://www.infracost.io/docs/"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infracost_metadata() {
        assert_eq!(Infracost.name(), "infracost");
        assert_eq!(Infracost.version_args(), &["--version"]);
        assert!(Infracost.install_url().starts_with("https://www.infracost.io"));
    }
}
