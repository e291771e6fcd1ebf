//! Thin wrappers around the `terraform` executable and the text it prints.

pub mod locate;
pub mod outputs;
pub mod plan;
pub mod runner;
pub mod state;

pub use locate::locate_terraform;
pub use outputs::{OutputValue, parse_outputs};
pub use plan::{DriftStatus, PlanSummary};
pub use runner::TerraformRunner;
pub use state::{StateAddress, modules_from_state};
