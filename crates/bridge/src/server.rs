//! `BridgeServer`: rmcp `ServerHandler` backed by an `OpenApiToolSource`.
//!
//! All sessions share one tool source. Refreshes swap the source's tool set in place, so every
//! session sees the new tools on its next `tools/list`.

use openapi_mcp_tools::{OpenApiToolSource, OpenApiToolsError};
use parking_lot::Mutex;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::{NotificationContext, Peer, RequestContext, RoleServer};
use std::sync::Arc;

/// Connected client peers, for tools-list-changed broadcasts.
#[derive(Default)]
pub struct PeerSet {
    peers: Mutex<Vec<Peer<RoleServer>>>,
}

impl PeerSet {
    pub fn observe(&self, peer: Peer<RoleServer>) {
        self.peers.lock().push(peer);
    }

    pub fn len(&self) -> usize {
        self.peers.lock().len()
    }

    /// Send `notifications/tools/list_changed` to every peer. Peers whose transport is gone are
    /// dropped.
    pub async fn notify_tool_list_changed(&self) {
        let peers: Vec<Peer<RoleServer>> = self.peers.lock().clone();
        if peers.is_empty() {
            return;
        }

        let mut live = Vec::with_capacity(peers.len());
        for peer in peers {
            match peer.notify_tool_list_changed().await {
                Ok(()) => live.push(peer),
                Err(e) => {
                    tracing::debug!(error = %e, "pruning stale peer after tools list_changed error");
                }
            }
        }
        *self.peers.lock() = live;
    }
}

#[derive(Clone)]
pub struct BridgeServer {
    source: OpenApiToolSource,
    peers: Arc<PeerSet>,
}

impl BridgeServer {
    #[must_use]
    pub fn new(source: OpenApiToolSource) -> Self {
        Self {
            source,
            peers: Arc::new(PeerSet::default()),
        }
    }

    /// Handle shared with the refresh task.
    #[must_use]
    pub fn peers(&self) -> Arc<PeerSet> {
        Arc::clone(&self.peers)
    }

    /// Run one tool call and map source errors onto MCP results.
    ///
    /// Bad tool names and arguments are protocol errors. Upstream failures are tool results with
    /// `is_error` set so the assistant can read them.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .source
            .call_tool(name, arguments.unwrap_or_default())
            .await
        {
            Ok(result) => Ok(result),
            Err(e @ (OpenApiToolsError::UnknownTool(_) | OpenApiToolsError::InvalidArguments(_))) => {
                Err(McpError::invalid_params(e.to_string(), None))
            }
            Err(
                e @ (OpenApiToolsError::Http(_)
                | OpenApiToolsError::Request(_)
                | OpenApiToolsError::RateLimited { .. }),
            ) => {
                tracing::debug!(tool = %name, error = %e, "tool call failed upstream");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                Err(McpError::internal_error(e.to_string(), None))
            }
        }
    }
}

impl ServerHandler for BridgeServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = match self.source.spec_title() {
            Some(title) => format!("Tools generated from the '{title}' OpenAPI description."),
            None => "Tools generated from an OpenAPI description.".to_string(),
        };

        ServerInfo {
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: self.source.spec_title(),
                ..Default::default()
            },
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.source.list_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments).await
    }

    async fn on_initialized(&self, context: NotificationContext<RoleServer>) {
        tracing::info!("MCP client initialized");
        self.peers.observe(context.peer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::routing::get;
    use openapi_mcp_tools::ApiSourceConfig;
    use rmcp::model::ErrorCode;
    use serde_json::json;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/pets/{petId}",
                get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                    axum::Json(json!({ "id": id, "name": "Rex" }))
                }),
            )
            .route(
                "/pets",
                get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn write_spec(base_url: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
openapi: 3.0.0
info:
  title: Pet Store
  version: "1"
servers:
  - url: {base_url}
paths:
  /pets:
    get:
      summary: List pets
      responses:
        "200":
          description: ok
  /pets/{{petId}}:
    get:
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: ok
"#
        )
        .unwrap();
        file
    }

    async fn started_server(spec: &NamedTempFile) -> BridgeServer {
        let source = OpenApiToolSource::new(ApiSourceConfig::new(
            spec.path().to_str().unwrap().to_string(),
        ));
        source.start().await.unwrap();
        BridgeServer::new(source)
    }

    fn args(value: serde_json::Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn get_info_advertises_tools() {
        let upstream = spawn_upstream().await;
        let spec = write_spec(&upstream);
        let server = started_server(&spec).await;

        let info = server.get_info();
        assert_eq!(info.server_info.name, "openapi-mcp-bridge");
        assert_eq!(info.server_info.title.as_deref(), Some("Pet Store"));
        let tools = info.capabilities.tools.expect("tools capability");
        assert_eq!(tools.list_changed, Some(true));
        assert!(info.instructions.unwrap().contains("Pet Store"));
    }

    #[tokio::test]
    async fn dispatch_forwards_to_upstream() {
        let upstream = spawn_upstream().await;
        let spec = write_spec(&upstream);
        let server = started_server(&spec).await;

        let result = server
            .dispatch("get_pet", args(json!({ "petId": "42" })))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        let text = result.content[0].as_text().unwrap().text.clone();
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["id"], "42");
    }

    #[tokio::test]
    async fn unknown_tool_and_missing_argument_are_invalid_params() {
        let upstream = spawn_upstream().await;
        let spec = write_spec(&upstream);
        let server = started_server(&spec).await;

        let err = server.dispatch("no_such_tool", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = server.dispatch("get_pet", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("petId"));
    }

    #[tokio::test]
    async fn upstream_failure_is_a_tool_error() {
        let upstream = spawn_upstream().await;
        let spec = write_spec(&upstream);
        let server = started_server(&spec).await;

        let result = server.dispatch("list_pets", None).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        let text = &result.content[0].as_text().unwrap().text;
        assert!(text.contains("503"), "{text}");
    }

    #[tokio::test]
    async fn peers_handle_is_shared() {
        let upstream = spawn_upstream().await;
        let spec = write_spec(&upstream);
        let server = started_server(&spec).await;
        let clone = server.clone();

        assert!(Arc::ptr_eq(&server.peers(), &clone.peers()));
        assert_eq!(server.peers().len(), 0);
        server.peers().notify_tool_list_changed().await;
    }
}
