//! `terraform://` resources.

use super::protocol::Resource;
use crate::assistant::Assistant;

pub const MODULES_URI: &str = "terraform://modules";
pub const VARIABLES_URI: &str = "terraform://variables";
pub const OUTPUTS_URI: &str = "terraform://outputs";
pub const PROVIDERS_URI: &str = "terraform://providers";
pub const STATE_URI: &str = "terraform://state";

fn resource(uri: &str, name: &str, description: &str) -> Resource {
    Resource {
        uri: uri.into(),
        name: name.into(),
        description: description.into(),
        mime_type: "text/plain".into(),
    }
}

pub fn get_resources() -> Vec<Resource> {
    vec![
        resource(
            MODULES_URI,
            "modules",
            "All Terraform modules used in the current state.",
        ),
        resource(
            VARIABLES_URI,
            "variables",
            "Variables declared in the workspace's .tf files, with current values where they can be evaluated.",
        ),
        resource(
            OUTPUTS_URI,
            "outputs",
            "Output values from the Terraform state; sensitive values are masked.",
        ),
        resource(
            PROVIDERS_URI,
            "providers",
            "Providers required by the configuration.",
        ),
        resource(
            STATE_URI,
            "state",
            "Managed resources as a tree grouped by module.",
        ),
    ]
}

/// Text for `uri`, or `None` for an unknown resource.
pub async fn read_resource(assistant: &Assistant, uri: &str) -> Option<String> {
    tracing::info!(uri, "reading resource");
    let text = match uri {
        MODULES_URI => assistant.modules().await,
        VARIABLES_URI => assistant.variables().await,
        OUTPUTS_URI => assistant.outputs().await,
        PROVIDERS_URI => assistant.providers().await,
        STATE_URI => assistant.state_tree().await,
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terraform::TerraformRunner;
    use tempfile::tempdir;

    #[test]
    fn test_resource_uris_are_unique() {
        let mut uris: Vec<String> = get_resources().into_iter().map(|r| r.uri).collect();
        let total = uris.len();
        uris.sort();
        uris.dedup();
        assert_eq!(uris.len(), total);
        assert!(uris.iter().all(|u| u.starts_with("terraform://")));
    }

    #[tokio::test]
    async fn test_unknown_resource() {
        let temp = tempdir().unwrap();
        let assistant = Assistant::new(TerraformRunner::new("terraform", temp.path()), temp.path());
        assert!(read_resource(&assistant, "terraform://secrets").await.is_none());
    }
}
