//! Locating and inspecting the Terraform configuration directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::error::AssistantError;

static VARIABLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"variable\s+"([^"]+)"\s*\{"#).expect("variable regex is valid")
});

static PROVIDER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"provider\s+"([^"]+)"\s*\{"#).expect("provider regex is valid")
});

/// Conventional location of a bundled sample configuration.
pub const SAMPLE_WORKSPACE: &str = "examples/sample_terraform";

/// Pick the workspace to run in when none was configured.
///
/// Prefers the bundled sample directory, then the directory of the first
/// `main.tf` under the project root, then the project root itself.
pub fn resolve_workspace(project_root: &Path) -> PathBuf {
    let sample = project_root.join(SAMPLE_WORKSPACE);
    if sample.is_dir() {
        tracing::info!(path = %sample.display(), "found sample terraform directory");
        return sample;
    }

    let first_main = WalkDir::new(project_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_or_cache(entry.file_name()))
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == "main.tf");

    if let Some(parent) = first_main.as_ref().and_then(|entry| entry.path().parent()) {
        tracing::info!(path = %parent.display(), "found main.tf");
        return parent.to_path_buf();
    }

    tracing::info!(
        path = %project_root.display(),
        "no terraform directory found, using project root"
    );
    project_root.to_path_buf()
}

fn is_hidden_or_cache(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

/// A workspace is valid when it is a directory holding `*.tf` files, or its
/// parent directory does.
pub fn validate_workspace(path: &Path) -> Result<(), AssistantError> {
    let invalid = || AssistantError::Workspace(format!("Invalid Terraform workspace: {}", path.display()));

    if !path.exists() {
        tracing::warn!(path = %path.display(), "workspace directory does not exist");
        return Err(invalid());
    }
    if !path.is_dir() {
        tracing::warn!(path = %path.display(), "workspace path is not a directory");
        return Err(invalid());
    }

    let count = tf_files(path)?.len();
    tracing::debug!(count, "found .tf files in workspace");
    if count > 0 {
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| p.is_dir()) {
        let parent_count = tf_files(parent)?.len();
        if parent_count > 0 {
            tracing::debug!(count = parent_count, "found .tf files in parent directory");
            return Ok(());
        }
    }

    Err(invalid())
}

/// `*.tf` files directly inside `dir`, sorted by name.
pub fn tf_files(dir: &Path) -> Result<Vec<PathBuf>, AssistantError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "tf"))
        .collect();
    files.sort();
    Ok(files)
}

fn block_names(files: &[PathBuf], pattern: &Regex) -> Result<Vec<String>, AssistantError> {
    let mut names = Vec::new();
    for file in files {
        let content = std::fs::read_to_string(file)?;
        names.extend(
            pattern
                .captures_iter(&content)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        );
    }
    Ok(names)
}

/// Names of `variable "..." {` blocks, sorted and deduplicated.
pub fn find_variables(files: &[PathBuf]) -> Result<Vec<String>, AssistantError> {
    let mut names = block_names(files, &VARIABLE_BLOCK)?;
    names.sort();
    names.dedup();
    Ok(names)
}

/// Names of `provider "..." {` blocks, sorted and deduplicated.
pub fn find_providers(files: &[PathBuf]) -> Result<Vec<String>, AssistantError> {
    let mut names = block_names(files, &PROVIDER_BLOCK)?;
    names.sort();
    names.dedup();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MAIN_TF: &str = r#"
resource "null_resource" "example" {
  triggers = {
    always_run = "${timestamp()}"
  }
}
"#;

    const VARIABLES_TF: &str = r#"
provider "aws" {
  region = var.region
}

provider "aws" {
  alias  = "east"
  region = "us-east-1"
}

provider "random" {}

variable "region" {
  default = "eu-west-1"
}

variable  "instance_count"  {
  type = number
}
"#;

    #[test]
    fn test_validate_workspace_valid() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("main.tf"), MAIN_TF).unwrap();
        assert!(validate_workspace(temp.path()).is_ok());
    }

    #[test]
    fn test_validate_workspace_empty_dir() {
        let temp = tempdir().unwrap();
        let empty = temp.path().join("empty");
        std::fs::create_dir(&empty).unwrap();

        let err = validate_workspace(&empty).unwrap_err();
        assert!(err.to_string().starts_with("Invalid Terraform workspace"));
    }

    #[test]
    fn test_validate_workspace_parent_has_tf() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("main.tf"), MAIN_TF).unwrap();
        let child = temp.path().join("modules");
        std::fs::create_dir(&child).unwrap();
        assert!(validate_workspace(&child).is_ok());
    }

    #[test]
    fn test_validate_workspace_missing_and_file() {
        let temp = tempdir().unwrap();
        assert!(validate_workspace(&temp.path().join("nope")).is_err());

        let file = temp.path().join("main.tf");
        std::fs::write(&file, MAIN_TF).unwrap();
        assert!(validate_workspace(&file).is_err());
    }

    #[test]
    fn test_resolve_prefers_sample_directory() {
        let temp = tempdir().unwrap();
        let sample = temp.path().join("examples").join("sample_terraform");
        std::fs::create_dir_all(&sample).unwrap();
        std::fs::create_dir_all(temp.path().join("infra")).unwrap();
        std::fs::write(temp.path().join("infra").join("main.tf"), MAIN_TF).unwrap();

        assert_eq!(resolve_workspace(temp.path()), sample);
    }

    #[test]
    fn test_resolve_finds_main_tf() {
        let temp = tempdir().unwrap();
        let infra = temp.path().join("infra").join("prod");
        std::fs::create_dir_all(&infra).unwrap();
        std::fs::write(infra.join("main.tf"), MAIN_TF).unwrap();
        let cache = temp.path().join(".terraform").join("modules");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("main.tf"), MAIN_TF).unwrap();

        assert_eq!(resolve_workspace(temp.path()), infra);
    }

    #[test]
    fn test_resolve_falls_back_to_root() {
        let temp = tempdir().unwrap();
        assert_eq!(resolve_workspace(temp.path()), temp.path());
    }

    #[test]
    fn test_tf_files_sorted_and_filtered() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("variables.tf"), "").unwrap();
        std::fs::write(temp.path().join("main.tf"), "").unwrap();
        std::fs::write(temp.path().join("terraform.tfvars"), "").unwrap();

        let files = tf_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["main.tf", "variables.tf"]);
    }

    #[test]
    fn test_find_variables_and_providers() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("main.tf"), MAIN_TF).unwrap();
        std::fs::write(temp.path().join("variables.tf"), VARIABLES_TF).unwrap();
        let files = tf_files(temp.path()).unwrap();

        assert_eq!(
            find_variables(&files).unwrap(),
            vec!["instance_count", "region"]
        );
        assert_eq!(find_providers(&files).unwrap(), vec!["aws", "random"]);
    }
}
