//! TFA - Terraform Assistant
//!
//! Maps conversational requests onto Terraform CLI invocations and serves them
//! to assistants over the Model Context Protocol.

pub mod addons;
pub mod assistant;
pub mod config;
pub mod format;
pub mod intent;
pub mod mcp;
pub mod process;
pub mod terraform;
pub mod workspace;

mod error;

pub use assistant::{Assistant, ToolReply};
pub use config::Config;
pub use error::AssistantError;
pub use intent::Intent;
pub use mcp::McpServer;
pub use terraform::TerraformRunner;
