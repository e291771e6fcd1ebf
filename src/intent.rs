//! Keyword-based mapping from conversational requests to Terraform operations.

use std::fmt;

/// Terraform subcommands that may be passed through verbatim when a request
/// matches no known intent.
pub const PASSTHROUGH_SUBCOMMANDS: &[&str] = &[
    "validate",
    "fmt",
    "version",
    "providers",
    "output",
    "graph",
    "workspace",
    "state",
    "console",
    "get",
    "refresh",
    "test",
    "show",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Plan,
    StateList,
    Cost,
    Security,
    Drift,
    Show,
    Apply,
    Destroy,
    Init,
    /// Explicit Terraform arguments, without the leading `terraform`.
    Raw(Vec<String>),
    Unknown,
}

// Order matters: the first table whose keywords occur in the request wins.
const KEYWORDS: &[(&[&str], Intent)] = &[
    (
        &["plan", "what will change", "execution plan", "visualize"],
        Intent::Plan,
    ),
    (
        &[
            "state list",
            "resources exist",
            "current state",
            "list all resources",
        ],
        Intent::StateList,
    ),
    (
        &["cost", "expense", "price", "pricing", "how much"],
        Intent::Cost,
    ),
    (
        &["security", "vulnerabilit", "secure", "issues"],
        Intent::Security,
    ),
    (&["drift", "changed since", "consistent"], Intent::Drift),
    (
        &["explain", "documentation", "what does", "show"],
        Intent::Show,
    ),
    (&["apply", "deploy", "create resources"], Intent::Apply),
    (&["destroy", "tear down", "remove"], Intent::Destroy),
    (&["init", "initialize"], Intent::Init),
];

impl Intent {
    pub fn parse(query: &str) -> Intent {
        let normalized = query.trim().to_lowercase();

        for (keywords, intent) in KEYWORDS {
            if keywords.iter().any(|k| normalized.contains(k)) {
                tracing::debug!(?intent, "matched intent keywords");
                return intent.clone();
            }
        }

        // Arguments keep their original case; resource addresses are case-sensitive.
        let mut args: Vec<String> = query
            .split_whitespace()
            .filter(|word| !word.eq_ignore_ascii_case("terraform"))
            .map(str::to_string)
            .collect();

        let Some(sub) = args.first_mut() else {
            return Intent::Unknown;
        };
        *sub = sub.to_lowercase();

        if PASSTHROUGH_SUBCOMMANDS.contains(&sub.as_str()) {
            Intent::Raw(args)
        } else {
            Intent::Unknown
        }
    }

    /// True for anything that can change infrastructure, state or files on disk.
    pub fn is_destructive(&self) -> bool {
        match self {
            Intent::Apply | Intent::Destroy => true,
            Intent::Raw(args) => raw_mutates(args),
            _ => false,
        }
    }
}

fn raw_mutates(args: &[String]) -> bool {
    let action = args.get(1).map(String::as_str);
    match args.first().map(String::as_str) {
        Some("state") => !matches!(action, Some("list" | "show" | "pull")),
        Some("workspace") => !matches!(action, Some("list" | "show")),
        Some("providers") => matches!(action, Some("lock" | "mirror")),
        Some("fmt") => !args
            .iter()
            .any(|arg| arg.starts_with("-check") || arg == "-write=false"),
        // `terraform test` applies real infrastructure unless every run uses plan.
        Some("refresh") | Some("test") => true,
        _ => false,
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Plan => write!(f, "plan"),
            Intent::StateList => write!(f, "state list"),
            Intent::Cost => write!(f, "cost estimation"),
            Intent::Security => write!(f, "security analysis"),
            Intent::Drift => write!(f, "drift detection"),
            Intent::Show => write!(f, "show"),
            Intent::Apply => write!(f, "apply"),
            Intent::Destroy => write!(f, "destroy"),
            Intent::Init => write!(f, "init"),
            Intent::Raw(args) => write!(f, "{}", args.join(" ")),
            Intent::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_queries() {
        assert_eq!(Intent::parse("What will change if I apply?"), Intent::Plan);
        assert_eq!(Intent::parse("Show me the execution plan"), Intent::Plan);
        assert_eq!(Intent::parse("visualize my infra"), Intent::Plan);
    }

    #[test]
    fn test_plan_wins_over_apply() {
        assert_eq!(Intent::parse("Apply the execution plan"), Intent::Plan);
    }

    #[test]
    fn test_state_queries() {
        assert_eq!(
            Intent::parse("What resources exist right now?"),
            Intent::StateList
        );
        assert_eq!(Intent::parse("LIST ALL RESOURCES"), Intent::StateList);
        assert_eq!(Intent::parse("terraform state list"), Intent::StateList);
    }

    #[test]
    fn test_current_state_beats_show() {
        assert_eq!(Intent::parse("Show me the current state"), Intent::StateList);
    }

    #[test]
    fn test_cost_queries() {
        assert_eq!(Intent::parse("How much will this cost?"), Intent::Cost);
        assert_eq!(Intent::parse("Estimate monthly expenses"), Intent::Cost);
        assert_eq!(Intent::parse("what's the pricing impact"), Intent::Cost);
    }

    #[test]
    fn test_security_queries() {
        assert_eq!(
            Intent::parse("Are there any security issues?"),
            Intent::Security
        );
        assert_eq!(Intent::parse("Check for vulnerabilities"), Intent::Security);
        assert_eq!(
            Intent::parse("Is my configuration secure?"),
            Intent::Security
        );
    }

    #[test]
    fn test_drift_queries() {
        assert_eq!(Intent::parse("Check for drift"), Intent::Drift);
        assert_eq!(
            Intent::parse("Has anything changed since last apply?"),
            Intent::Drift
        );
    }

    #[test]
    fn test_show_queries() {
        assert_eq!(Intent::parse("Explain this module"), Intent::Show);
        assert_eq!(
            Intent::parse("What does this configuration do?"),
            Intent::Show
        );
    }

    #[test]
    fn test_apply_destroy_init() {
        assert_eq!(Intent::parse("Deploy the infrastructure"), Intent::Apply);
        assert_eq!(Intent::parse("Tear down my resources"), Intent::Destroy);
        assert_eq!(Intent::parse("Destroy the infrastructure"), Intent::Destroy);
        assert_eq!(Intent::parse("Initialize my project"), Intent::Init);
    }

    #[test]
    fn test_raw_passthrough() {
        assert_eq!(
            Intent::parse("terraform validate -json"),
            Intent::Raw(vec!["validate".to_string(), "-json".to_string()])
        );
        assert_eq!(
            Intent::parse("  VERSION "),
            Intent::Raw(vec!["version".to_string()])
        );
    }

    #[test]
    fn test_unknown_queries() {
        assert_eq!(Intent::parse(""), Intent::Unknown);
        assert_eq!(Intent::parse("terraform"), Intent::Unknown);
        assert_eq!(Intent::parse("make me a sandwich"), Intent::Unknown);
    }

    #[test]
    fn test_is_destructive() {
        assert!(Intent::Apply.is_destructive());
        assert!(Intent::Destroy.is_destructive());
        assert!(!Intent::Plan.is_destructive());
    }

    fn raw(query: &str) -> Intent {
        let intent = Intent::parse(query);
        assert!(matches!(intent, Intent::Raw(_)), "{} parsed as {:?}", query, intent);
        intent
    }

    #[test]
    fn test_raw_state_changes_are_destructive() {
        assert!(raw("terraform state rm aws_instance.web").is_destructive());
        assert!(raw("terraform state mv a.b c.d").is_destructive());
        assert!(raw("terraform state push backup.tfstate").is_destructive());
        assert!(raw("terraform state").is_destructive());
        assert!(raw("terraform workspace delete prod").is_destructive());
        assert!(raw("terraform workspace select prod").is_destructive());
        assert!(raw("terraform refresh").is_destructive());
        assert!(raw("terraform fmt").is_destructive());
        assert!(raw("terraform fmt -recursive").is_destructive());
        assert!(raw("terraform providers lock").is_destructive());
        assert!(raw("terraform test").is_destructive());
    }

    #[test]
    fn test_raw_reads_are_not_destructive() {
        assert!(!raw("terraform state pull").is_destructive());
        assert!(!raw("terraform workspace list").is_destructive());
        assert!(!raw("terraform fmt -check").is_destructive());
        assert!(!raw("terraform fmt -check=true -diff").is_destructive());
        assert!(!raw("terraform fmt -write=false").is_destructive());
        assert!(!raw("terraform validate").is_destructive());
        assert!(!raw("terraform output -json").is_destructive());
        assert!(!raw("terraform providers").is_destructive());
        assert!(!raw("terraform version").is_destructive());
    }

    #[test]
    fn test_raw_keeps_argument_case() {
        assert_eq!(
            Intent::parse("Terraform OUTPUT Vpc_Id"),
            Intent::Raw(vec!["output".to_string(), "Vpc_Id".to_string()])
        );
        assert_eq!(
            Intent::parse("terraform state pull module.VPC"),
            Intent::Raw(vec![
                "state".to_string(),
                "pull".to_string(),
                "module.VPC".to_string()
            ])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Intent::Drift.to_string(), "drift detection");
        assert_eq!(
            Intent::Raw(vec!["fmt".to_string(), "-check".to_string()]).to_string(),
            "fmt -check"
        );
    }
}
