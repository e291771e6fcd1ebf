use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::prompts::{get_prompt, get_prompts};
use super::protocol::*;
use super::resources::{get_resources, read_resource};
use super::tools::{call_tool, get_tools};
use crate::assistant::Assistant;
use crate::error::AssistantError;

pub const SERVER_NAME: &str = "Terraform Assistant";

const PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

fn respond<T: Serialize>(id: Value, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}

pub struct McpServer {
    assistant: Assistant,
}

impl McpServer {
    pub fn new(assistant: Assistant) -> Self {
        Self { assistant }
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub async fn run_stdio(&self) -> Result<(), AssistantError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC until `reader` reaches EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), AssistantError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(workspace = %self.assistant.workspace().display(), "MCP server started");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            tracing::debug!(line = %preview(line), "<-");

            let Some(response) = self.handle(line).await else {
                continue;
            };

            let out = serde_json::to_string(&response)?;
            tracing::debug!(line = %preview(&out), "->");
            writer.write_all(out.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        tracing::info!("MCP server shutting down");
        Ok(())
    }

    /// Handle one message; notifications yield `None`.
    pub async fn handle(&self, msg: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(msg) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, e.to_string()));
            }
        };

        let req: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    INVALID_REQUEST,
                    e.to_string(),
                ));
            }
        };

        let Some(id) = req.id.clone() else {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        };

        if req.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version: {}", req.jsonrpc),
            ));
        }

        Some(self.dispatch(id, req).await)
    }

    async fn dispatch(&self, id: Value, req: JsonRpcRequest) -> JsonRpcResponse {
        match req.method.as_str() {
            "initialize" => respond(
                id,
                InitializeResult {
                    protocol_version: PROTOCOL_VERSION.into(),
                    capabilities: ServerCapabilities {
                        tools: ListChanged { list_changed: false },
                        resources: ResourcesCapability {
                            subscribe: false,
                            list_changed: false,
                        },
                        prompts: ListChanged { list_changed: false },
                    },
                    server_info: ServerInfo {
                        name: SERVER_NAME.into(),
                        version: env!("CARGO_PKG_VERSION").into(),
                    },
                    instructions: Some(
                        "Ask Terraform questions in plain language through handle_terraform_query."
                            .into(),
                    ),
                },
            ),

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => respond(id, ToolsListResult { tools: get_tools() }),

            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
                };
                let result = call_tool(&self.assistant, &params.name, &params.arguments).await;
                respond(id, result)
            }

            "resources/list" => respond(
                id,
                ResourcesListResult {
                    resources: get_resources(),
                },
            ),

            "resources/read" => {
                let params: ResourceReadParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
                };
                match read_resource(&self.assistant, &params.uri).await {
                    Some(text) => respond(
                        id,
                        ResourceReadResult {
                            contents: vec![ResourceContents {
                                uri: params.uri,
                                mime_type: "text/plain".into(),
                                text,
                            }],
                        },
                    ),
                    None => JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Unknown resource: {}", params.uri),
                    ),
                }
            }

            "prompts/list" => respond(
                id,
                PromptsListResult {
                    prompts: get_prompts(),
                },
            ),

            "prompts/get" => {
                let params: PromptGetParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
                };
                match get_prompt(&params.name) {
                    Some(prompt) => respond(id, prompt),
                    None => JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Unknown prompt: {}", params.name),
                    ),
                }
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        }
    }
}
