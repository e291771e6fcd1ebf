use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::process::{executable_in, find_in_search_path};

pub const TERRAFORM_BINARY: &str = "terraform";

/// Install locations checked when `terraform` is not on `PATH`.
pub fn fallback_dirs() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Some(program_files) = std::env::var_os("ProgramFiles") {
        dirs_to_check.push(PathBuf::from(program_files).join("terraform"));
    }
    if let Some(program_files_x86) = std::env::var_os("ProgramFiles(x86)") {
        dirs_to_check.push(PathBuf::from(program_files_x86).join("terraform"));
    }
    if let Some(local) = dirs::data_local_dir() {
        dirs_to_check.push(local.join("Programs").join("terraform"));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".local").join("bin"));
    }

    dirs_to_check
}

/// Resolve the Terraform executable: an explicit path wins, then `PATH`, then
/// the well-known install directories.
pub fn locate_terraform(explicit: Option<&Path>) -> Option<PathBuf> {
    locate_in(explicit, std::env::var_os("PATH").as_deref())
}

fn locate_in(explicit: Option<&Path>, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured terraform binary does not exist");
    }

    let binary = OsStr::new(TERRAFORM_BINARY);
    if let Some(found) = search_path.and_then(|p| find_in_search_path(binary, p)) {
        return Some(found);
    }

    let found = fallback_dirs()
        .iter()
        .find_map(|dir| executable_in(dir, binary));
    if let Some(path) = &found {
        tracing::info!(path = %path.display(), "found terraform outside PATH");
    }
    found
}
