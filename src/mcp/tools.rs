//! Tool definitions and dispatch.

use serde_json::{Value, json};

use super::protocol::{Tool, ToolCallResult};
use crate::assistant::{Assistant, ToolReply};

fn query_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"]
    })
}

pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "test".into(),
            description: "Test if this server has access to the project directory by listing its contents."
                .into(),
            input_schema: query_schema("Free-form text; ignored"),
        },
        Tool {
            name: "init_terraform".into(),
            description: "Initialize the Terraform project (terraform init).".into(),
            input_schema: query_schema("Free-form text; ignored"),
        },
        Tool {
            name: "handle_terraform_query".into(),
            description: "Process a natural language Terraform query and execute the appropriate command. \
Supports execution plans with graph visualization, state inspection, cost estimation (infracost), \
security analysis (tfsec), drift detection, configuration display, init, apply and destroy. \
Queries that name an explicit read-only subcommand, e.g. 'terraform validate', are run as given."
                .into(),
            input_schema: query_schema(
                "What to do, e.g. 'What will change if I apply?' or 'Check for drift'",
            ),
        },
    ]
}

pub async fn call_tool(assistant: &Assistant, name: &str, arguments: &Value) -> ToolCallResult {
    tracing::info!(tool = name, "calling tool");
    let query = arguments
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let reply = match name {
        "test" => assistant.check_access(),
        "init_terraform" => assistant.init().await,
        "handle_terraform_query" => {
            if query.trim().is_empty() {
                ToolReply::error("query is required")
            } else {
                assistant.handle_query(query).await
            }
        }
        other => ToolReply::error(format!("Unknown tool: {}", other)),
    };

    ToolCallResult::text(reply.text, reply.is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terraform::TerraformRunner;
    use tempfile::tempdir;

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["test", "init_terraform", "handle_terraform_query"]);
    }

    #[test]
    fn test_tools_require_query() {
        for tool in get_tools() {
            assert_eq!(tool.input_schema["required"], json!(["query"]));
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let temp = tempdir().unwrap();
        let assistant = Assistant::new(TerraformRunner::new("terraform", temp.path()), temp.path());
        let result = call_tool(&assistant, "format_disk", &json!({})).await;

        assert!(result.is_error);
        assert_eq!(result.content[0].text, "Unknown tool: format_disk");
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let temp = tempdir().unwrap();
        let assistant = Assistant::new(TerraformRunner::new("terraform", temp.path()), temp.path());
        let result = call_tool(&assistant, "handle_terraform_query", &json!({"query": "  "})).await;

        assert!(result.is_error);
        assert_eq!(result.content[0].text, "query is required");
    }
}
