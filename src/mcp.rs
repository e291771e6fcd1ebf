//! Model Context Protocol server: JSON-RPC 2.0, one message per line on
//! stdin/stdout.
//!
//! ```text
//!   MCP client ──stdio──▶ McpServer ──▶ Assistant ──▶ terraform / dot / infracost / tfsec
//! ```
//!
//! Tools: `test`, `init_terraform`, `handle_terraform_query`.
//! Resources: `terraform://modules`, `terraform://variables`,
//! `terraform://outputs`, `terraform://providers`, `terraform://state`.
//! Prompts: `help_prompt`.

pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use server::McpServer;
