use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

use tfa::config::LOG_FILE_NAME;
use tfa::{AssistantError, Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Natural-language Terraform assistant speaking MCP over stdio")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory; defaults to the current directory
    #[arg(long, env = "PROJECT_ROOT", global = true)]
    pub project_root: Option<PathBuf>,

    /// Terraform configuration directory; discovered under the project root if unset
    #[arg(long, env = "TERRAFORM_WORKSPACE", global = true)]
    pub workspace: Option<PathBuf>,

    #[arg(long, env = "TERRAFORM_BIN", global = true)]
    pub terraform_bin: Option<PathBuf>,

    /// Also append logs to tfa.log in this directory
    #[arg(long, env = "LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Per-command timeout in seconds
    #[arg(long, env = "TFA_COMMAND_TIMEOUT", default_value_t = 600, global = true)]
    pub timeout: u64,

    /// Refuse apply and destroy
    #[arg(
        long,
        env = "TFA_READ_ONLY",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub read_only: bool,
}

impl GlobalArgs {
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }

    pub fn to_config(&self) -> Result<Config, AssistantError> {
        Ok(
            Config::resolve(self.project_root.clone(), self.workspace.clone())?
                .with_terraform_bin(self.terraform_bin.clone())
                .with_timeout_secs(self.timeout)?
                .with_read_only(self.read_only),
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve MCP on stdin/stdout (the default)
    Serve,
    /// Answer one natural-language request and exit
    Ask(AskArgs),
    /// Print a terraform:// resource
    Resource(ResourceArgs),
    /// Show managed resources as a table
    State,
    /// Check workspace access and tool availability
    Check,
}

#[derive(clap::Args, Debug)]
pub struct AskArgs {
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl AskArgs {
    pub fn query(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(clap::Args, Debug)]
pub struct ResourceArgs {
    /// e.g. terraform://outputs
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    fn clear_env() -> Vec<(&'static str, Option<String>)> {
        let keys = [
            "PROJECT_ROOT",
            "TERRAFORM_WORKSPACE",
            "TERRAFORM_BIN",
            "LOG_DIR",
            "TFA_COMMAND_TIMEOUT",
            "TFA_READ_ONLY",
        ];
        let backup = keys
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();
        unsafe {
            for k in keys {
                std::env::remove_var(k);
            }
        }
        backup
    }

    fn restore_env(backup: Vec<(&'static str, Option<String>)>) {
        unsafe {
            for (k, v) in backup {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_no_subcommand_defaults() {
        let backup = clear_env();
        let cli = Cli::parse_from(["tfa"]);
        restore_env(backup);

        assert!(cli.command.is_none());
        assert_eq!(cli.global.timeout, 600);
        assert!(!cli.global.read_only);
        assert!(cli.global.workspace.is_none());
        assert!(cli.global.log_file().is_none());
    }

    #[test]
    #[serial]
    fn test_log_file_in_log_dir() {
        let backup = clear_env();
        let cli = Cli::parse_from(["tfa", "--log-dir=/var/log/tfa"]);
        restore_env(backup);

        assert_eq!(
            cli.global.log_file(),
            Some(PathBuf::from("/var/log/tfa/tfa.log"))
        );
    }

    #[test]
    #[serial]
    fn test_ask_joins_words() {
        let backup = clear_env();
        let cli = Cli::parse_from(["tfa", "ask", "check", "for", "drift"]);
        restore_env(backup);

        if let Some(Command::Ask(args)) = cli.command {
            assert_eq!(args.query(), "check for drift");
        } else {
            panic!("Expected Ask command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["tfa", "ask"]).is_err());
    }

    #[test]
    #[serial]
    fn test_global_flags_after_subcommand() {
        let backup = clear_env();
        let cli = Cli::parse_from([
            "tfa",
            "resource",
            "terraform://outputs",
            "--workspace=/srv/infra",
            "--timeout=30",
            "--read-only",
        ]);
        restore_env(backup);

        assert_eq!(cli.global.workspace, Some(PathBuf::from("/srv/infra")));
        assert_eq!(cli.global.timeout, 30);
        assert!(cli.global.read_only);
        if let Some(Command::Resource(args)) = cli.command {
            assert_eq!(args.uri, "terraform://outputs");
        } else {
            panic!("Expected Resource command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_workspace_from_env_var_fallback() {
        let backup = clear_env();
        unsafe {
            std::env::set_var("TERRAFORM_WORKSPACE", "/env/workspace");
            std::env::set_var("TFA_READ_ONLY", "yes");
        }

        let cli = Cli::parse_from(["tfa", "serve"]);
        restore_env(backup);

        assert_eq!(cli.global.workspace, Some(PathBuf::from("/env/workspace")));
        assert!(cli.global.read_only);
    }

    #[test]
    #[serial]
    fn test_cli_flag_takes_precedence_over_env() {
        let backup = clear_env();
        unsafe {
            std::env::set_var("PROJECT_ROOT", "/env/root");
        }

        let cli = Cli::parse_from(["tfa", "check", "--project-root=/cli/root"]);
        restore_env(backup);

        assert_eq!(cli.global.project_root, Some(PathBuf::from("/cli/root")));
    }

    #[test]
    #[serial]
    fn test_to_config_rejects_zero_timeout() {
        let backup = clear_env();
        let temp = tempfile::tempdir().unwrap();
        let root = format!("--project-root={}", temp.path().display());
        let cli = Cli::parse_from(["tfa", root.as_str(), "--timeout=0"]);
        restore_env(backup);

        assert!(cli.global.to_config().is_err());
    }
}
