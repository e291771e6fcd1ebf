//! Turning raw command output into text suited for a chat reply.

use std::collections::BTreeMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::terraform::{OutputValue, StateAddress};

pub const MAX_OUTPUT_CHARS: usize = 30_000;

pub fn format_output(stdout: &str, stderr: &str) -> String {
    let mut sections = Vec::new();
    let stdout = stdout.trim();
    let stderr = stderr.trim();

    if !stdout.is_empty() {
        sections.push(stdout.to_string());
    }
    if !stderr.is_empty() {
        sections.push(format!("Errors/Warnings:\n{}", stderr));
    }

    if sections.is_empty() {
        "No output".to_string()
    } else {
        sections.join("\n\n")
    }
}

/// Cap `text` at `max` characters, noting the original length.
pub fn truncate(text: &str, max: usize) -> String {
    let total = text.chars().count();
    if total <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{}...\n[truncated, {} chars total]", kept, total)
}

/// `title` followed by one `- item` line per entry.
pub fn bullet_list<S: AsRef<str>>(title: &str, items: &[S]) -> String {
    let mut out = String::from(title);
    for item in items {
        out.push_str("\n- ");
        out.push_str(item.as_ref());
    }
    out
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

pub fn render_outputs(outputs: &BTreeMap<String, OutputValue>) -> String {
    let mut text = String::from("Terraform outputs:\n");
    for (name, output) in outputs {
        let value = if output.sensitive {
            "(sensitive)".to_string()
        } else {
            display_value(&output.value)
        };
        text.push_str(&format!("- {} = {}\n", name, value));
    }
    text
}

/// Tree of modules and their resources, with root resources at the top level.
pub fn render_module_tree(root_label: &str, groups: &BTreeMap<String, Vec<String>>) -> String {
    let mut tree = Tree::new(root_label.to_string());

    if let Some(root_resources) = groups.get("") {
        for resource in root_resources {
            tree.push(Tree::new(resource.clone()));
        }
    }

    for (module, resources) in groups.iter().filter(|(m, _)| !m.is_empty()) {
        let leaves = resources.iter().map(|address| {
            let label = StateAddress::parse(address)
                .map(|addr| {
                    let nested = addr.module_path.get(1..).unwrap_or_default();
                    if nested.is_empty() {
                        addr.local_address()
                    } else {
                        format!("module.{}.{}", nested.join(".module."), addr.local_address())
                    }
                })
                .unwrap_or_else(|| address.clone());
            Tree::new(label)
        });
        tree.push(Tree::new(format!("module.{}", module)).with_leaves(leaves));
    }

    tree.to_string()
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn render_state_table<S: AsRef<str>>(lines: &[S]) -> String {
    let rows: Vec<StateRow> = lines
        .iter()
        .filter_map(|line| StateAddress::parse(line.as_ref()))
        .map(|addr| StateRow {
            module: if addr.module_path.is_empty() {
                "(root)".to_string()
            } else {
                addr.module_path.join(".")
            },
            resource_type: if addr.data {
                format!("data.{}", addr.resource_type)
            } else {
                addr.resource_type
            },
            name: addr.name,
        })
        .collect();

    Table::new(rows).with(Style::modern()).to_string()
}

#[derive(Tabled)]
pub struct ToolStatusRow {
    #[tabled(rename = "Tool")]
    pub tool: String,
    #[tabled(rename = "Purpose")]
    pub purpose: String,
    #[tabled(rename = "Installed")]
    pub installed: String,
}

pub fn render_tool_table(rows: Vec<ToolStatusRow>) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}
