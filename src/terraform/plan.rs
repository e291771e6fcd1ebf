use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static PLAN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Plan: (?:(\d+) to import, )?(\d+) to add, (\d+) to change, (\d+) to destroy",
    )
    .expect("plan summary regex is valid")
});

/// Resource counts from the `Plan: ...` line Terraform prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub import: u32,
    pub add: u32,
    pub change: u32,
    pub destroy: u32,
}

impl PlanSummary {
    /// Returns `None` when the text holds neither a plan line nor a
    /// "No changes." notice.
    pub fn parse(text: &str) -> Option<PlanSummary> {
        if let Some(caps) = PLAN_LINE.captures(text) {
            let count = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0)
            };
            return Some(PlanSummary {
                import: count(1),
                add: count(2),
                change: count(3),
                destroy: count(4),
            });
        }

        if text.contains("No changes.") {
            return Some(PlanSummary::default());
        }

        None
    }

    pub fn has_changes(&self) -> bool {
        self.import + self.add + self.change + self.destroy > 0
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "No changes. Infrastructure matches the configuration.");
        }
        write!(f, "Plan: ")?;
        if self.import > 0 {
            write!(f, "{} to import, ", self.import)?;
        }
        write!(
            f,
            "{} to add, {} to change, {} to destroy.",
            self.add, self.change, self.destroy
        )
    }
}

/// Meaning of `terraform plan -detailed-exitcode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftStatus {
    InSync,
    Drifted,
    Failed(i32),
}

impl DriftStatus {
    pub fn from_exit_code(code: i32) -> DriftStatus {
        match code {
            0 => DriftStatus::InSync,
            2 => DriftStatus::Drifted,
            other => DriftStatus::Failed(other),
        }
    }
}
