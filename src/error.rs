use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    Workspace(String),

    #[error("{tool} is not installed or not found in PATH. {hint}")]
    ToolNotInstalled { tool: String, hint: String },

    #[error("`{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error(transparent)]
    Addon(#[from] crate::addons::AddonError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AssistantError {
    /// The most useful text to show a user: the failing command's stderr when
    /// there is one, otherwise the full error.
    pub fn detail(&self) -> String {
        match self {
            AssistantError::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_workspace_error_display() {
        let err = AssistantError::Workspace("Invalid Terraform workspace: /tmp/x".to_string());
        assert_eq!(err.to_string(), "Invalid Terraform workspace: /tmp/x");
    }

    #[test]
    fn test_command_failed_display() {
        let err = AssistantError::CommandFailed {
            command: "terraform plan".to_string(),
            code: 1,
            stderr: "no configuration files".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`terraform plan` exited with code 1: no configuration files"
        );
    }

    #[test]
    fn test_detail_prefers_stderr() {
        let err = AssistantError::CommandFailed {
            command: "terraform init".to_string(),
            code: 1,
            stderr: "  backend error\n".to_string(),
        };
        assert_eq!(err.detail(), "backend error");
    }

    #[test]
    fn test_detail_falls_back_to_display() {
        let err = AssistantError::Timeout {
            command: "terraform apply".to_string(),
            seconds: 5,
        };
        assert_eq!(err.detail(), "`terraform apply` timed out after 5s");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: AssistantError = io_err.into();
        assert!(matches!(err, AssistantError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_addon_error_from_conversion() {
        let addon_err = crate::addons::AddonError::UnknownTool("checkov".to_string());
        let err: AssistantError = addon_err.into();
        assert!(matches!(err, AssistantError::Addon(_)));
        assert!(err.to_string().contains("unknown addon: checkov"));
    }
}
