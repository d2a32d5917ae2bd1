//! `OpenAPI` tool source runtime.
//!
//! Loads a spec, turns its operations into named MCP tools, and forwards `tools/call` requests to
//! the upstream HTTP API. Every load or refresh is a full pass from an empty name registry; the
//! resulting tool set replaces the previous one wholesale.

use crate::config::{ApiSourceConfig, AuthConfig, is_http_url};
use crate::discovery::{
    ArgLocation, MethodOrder, ToolArgument, discover_operations, is_json_media_type,
};
use crate::error::{OpenApiToolsError, Result};
use crate::ratelimit::SlidingWindowLimiter;
use crate::semantics::annotations_for_method;
use openapi_mcp_naming::{HttpMethod, ToolNamer};
use openapiv3::{OpenAPI, Server};
use parking_lot::RwLock;
use reqwest::Client;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// `OpenAPI` tool source that exposes HTTP API endpoints as MCP tools.
#[derive(Clone)]
pub struct OpenApiToolSource {
    config: Arc<ApiSourceConfig>,
    namer: ToolNamer,
    client: Client,
    limiter: Option<Arc<SlidingWindowLimiter>>,
    loaded: Arc<RwLock<Option<Arc<LoadedSpec>>>>,
}

/// Result of one load pass.
#[derive(Debug)]
struct LoadedSpec {
    title: String,
    base_url: Url,
    tools: Vec<GeneratedTool>,
}

#[derive(Debug, Clone, PartialEq)]
struct GeneratedTool {
    name: String,
    description: String,
    summary: Option<String>,
    method: HttpMethod,
    path: String,
    arguments: Vec<ToolArgument>,
    input_schema: Arc<JsonObject>,
    body_content_type: Option<String>,
}

#[derive(Default)]
struct RequestParts {
    path_values: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body_fields: Map<String, Value>,
    body: Option<Value>,
}

impl OpenApiToolSource {
    /// Create a tool source. Nothing is fetched until [`Self::start`].
    #[must_use]
    pub fn new(config: ApiSourceConfig) -> Self {
        let namer = ToolNamer::from_config(&config.naming);
        let limiter = config
            .rate_limit
            .as_ref()
            .map(|rl| Arc::new(SlidingWindowLimiter::from_config(rl)));

        Self {
            config: Arc::new(config),
            namer,
            client: Client::new(),
            limiter,
            loaded: Arc::new(RwLock::new(None)),
        }
    }

    /// Load the spec and register its tools.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec cannot be fetched or parsed, or no base URL can be determined.
    pub async fn start(&self) -> Result<()> {
        let loaded = self.load().await?;
        tracing::info!(
            spec = %self.config.spec,
            title = %loaded.title,
            base_url = %loaded.base_url,
            tools = loaded.tools.len(),
            "OpenAPI tool source started"
        );
        *self.loaded.write() = Some(Arc::new(loaded));
        Ok(())
    }

    /// Re-run the whole load pass and replace the tool set.
    ///
    /// Returns whether the advertised tools changed. On error the previous tool set stays active.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start`].
    pub async fn refresh(&self) -> Result<bool> {
        let fresh = self.load().await?;

        let mut slot = self.loaded.write();
        let changed = slot.as_ref().is_none_or(|prev| prev.tools != fresh.tools);
        if changed {
            tracing::info!(
                spec = %self.config.spec,
                tools = fresh.tools.len(),
                "OpenAPI tool set changed"
            );
        }
        *slot = Some(Arc::new(fresh));
        Ok(changed)
    }

    /// Tools from the most recent successful load. Empty before [`Self::start`].
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        let Some(loaded) = self.snapshot() else {
            return Vec::new();
        };

        loaded
            .tools
            .iter()
            .map(|t| {
                let mut tool = Tool::new(
                    t.name.clone(),
                    t.description.clone(),
                    Arc::clone(&t.input_schema),
                );
                tool.annotations = Some(annotations_for_method(&t.method, t.summary.clone()));
                tool
            })
            .collect()
    }

    /// Names of the registered tools, in registration order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        self.snapshot()
            .map(|l| l.tools.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Forward a tool call to the upstream API.
    ///
    /// # Errors
    ///
    /// - [`OpenApiToolsError::UnknownTool`] if `name` is not registered
    /// - [`OpenApiToolsError::InvalidArguments`] if required arguments are missing
    /// - [`OpenApiToolsError::RateLimited`] if the local budget is exhausted
    /// - [`OpenApiToolsError::Request`] / [`OpenApiToolsError::Http`] for transport failures and
    ///   non-success responses
    pub async fn call_tool(&self, name: &str, arguments: JsonObject) -> Result<CallToolResult> {
        let loaded = self
            .snapshot()
            .ok_or_else(|| OpenApiToolsError::Runtime("tool source not started".to_string()))?;
        let tool = loaded
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| OpenApiToolsError::UnknownTool(name.to_string()))?;

        let parts = build_request_parts(tool, &arguments)?;

        if let Some(limiter) = &self.limiter {
            limiter
                .try_acquire()
                .map_err(|retry_after| OpenApiToolsError::RateLimited { retry_after })?;
        }

        let url = self.build_url(&loaded.base_url, &tool.path, &parts)?;
        let method = reqwest::Method::from_bytes(tool.method.to_string().as_bytes())
            .map_err(|e| OpenApiToolsError::Runtime(format!("invalid HTTP method: {e}")))?;

        tracing::debug!(tool = %tool.name, method = %method, path = %tool.path, "forwarding tool call");

        let mut request = self.client.request(method, url);
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }
        for (key, value) in &parts.headers {
            request = request.header(key, value);
        }
        request = match &self.config.auth {
            Some(AuthConfig::Bearer { token }) => request.bearer_auth(token),
            Some(AuthConfig::Header { name, value }) => request.header(name, value),
            Some(AuthConfig::Query { .. }) | None => request,
        };
        request = apply_body(request, tool.body_content_type.as_deref(), parts);
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OpenApiToolsError::Request(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OpenApiToolsError::Request(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::debug!(tool = %tool.name, status = status.as_u16(), "upstream error response");
            return Err(OpenApiToolsError::Http(format!("API returned {status}: {body}")));
        }

        let text = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// `info.title` of the loaded spec.
    #[must_use]
    pub fn spec_title(&self) -> Option<String> {
        self.snapshot().map(|l| l.title.clone())
    }

    /// Base URL upstream calls are sent to.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.snapshot().map(|l| l.base_url.to_string())
    }

    fn snapshot(&self) -> Option<Arc<LoadedSpec>> {
        self.loaded.read().clone()
    }

    async fn load(&self) -> Result<LoadedSpec> {
        let (spec, order) = self.load_spec().await?;
        let base_url = self.resolve_base_url(&spec)?;

        let discovered = discover_operations(&spec, &order, &self.config.auto_discover)?;
        let operations: Vec<_> = discovered.iter().map(|d| d.operation.clone()).collect();
        let names = self.namer.assign_names(&operations);

        let mut tools = Vec::with_capacity(discovered.len());
        for (found, name) in discovered.into_iter().zip(names) {
            let Some(name) = name else {
                tracing::warn!(
                    method = %found.operation.method,
                    path = %found.operation.path_template,
                    "operation has no usable tool name; skipping"
                );
                continue;
            };

            let body_content_type = found.body_content_type().map(str::to_string);
            let input_schema = match found.input_schema {
                Value::Object(obj) => obj,
                _ => JsonObject::new(),
            };
            tools.push(GeneratedTool {
                description: self.namer.describe(&found.operation),
                summary: found.operation.summary.clone(),
                body_content_type,
                name,
                method: found.operation.method,
                path: found.operation.path_template,
                arguments: found.arguments,
                input_schema: Arc::new(input_schema),
            });
        }

        Ok(LoadedSpec {
            title: spec.info.title.clone(),
            base_url,
            tools,
        })
    }

    async fn load_spec(&self) -> Result<(OpenAPI, MethodOrder)> {
        let location = &self.config.spec;
        let text = if is_http_url(location) {
            tracing::info!(url = %location, "fetching OpenAPI spec");
            let response = self
                .client
                .get(location)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| OpenApiToolsError::OpenApiSpecFetch {
                    url: location.clone(),
                    message: e.without_url().to_string(),
                })?;
            response
                .text()
                .await
                .map_err(|e| OpenApiToolsError::OpenApiSpecReadBody {
                    url: location.clone(),
                    message: e.without_url().to_string(),
                })?
        } else {
            tracing::info!(path = %location, "loading OpenAPI spec");
            tokio::fs::read_to_string(location).await.map_err(|source| {
                OpenApiToolsError::OpenApiSpecReadFile {
                    path: location.clone(),
                    source,
                }
            })?
        };

        // JSON is a subset of YAML.
        let parse_error = |source| OpenApiToolsError::OpenApiSpecParse {
            location: location.clone(),
            source,
        };
        let spec: OpenAPI = serde_yaml::from_str(&text).map_err(parse_error)?;
        let order = MethodOrder::from_text(&text).map_err(parse_error)?;
        Ok((spec, order))
    }

    fn resolve_base_url(&self, spec: &OpenAPI) -> Result<Url> {
        let raw = match &self.config.base_url {
            Some(url) => url.clone(),
            None => spec.servers.first().map(expand_server_url).ok_or_else(|| {
                OpenApiToolsError::Startup(
                    "no baseUrl configured and the spec declares no servers".to_string(),
                )
            })?,
        };

        if is_http_url(&raw) {
            return Url::parse(&raw)
                .map_err(|e| OpenApiToolsError::Startup(format!("invalid base URL '{raw}': {e}")));
        }

        // Relative server URLs resolve against the spec URL.
        if self.config.spec_is_url() {
            let spec_url = Url::parse(&self.config.spec).map_err(|e| {
                OpenApiToolsError::Startup(format!("invalid spec URL '{}': {e}", self.config.spec))
            })?;
            return spec_url.join(&raw).map_err(|e| {
                OpenApiToolsError::Startup(format!("cannot resolve base URL '{raw}': {e}"))
            });
        }

        Err(OpenApiToolsError::Startup(format!(
            "base URL '{raw}' is relative and the spec was not loaded from a URL; set baseUrl",
        )))
    }

    fn build_url(&self, base: &Url, path: &str, parts: &RequestParts) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                OpenApiToolsError::Runtime(format!("base URL '{base}' cannot carry a path"))
            })?;
            segments.pop_if_empty();
            for raw in path.trim_start_matches('/').split('/') {
                segments.push(&fill_template(raw, &parts.path_values));
            }
        }

        let query_auth = match &self.config.auth {
            Some(AuthConfig::Query { name, value }) => Some((name, value)),
            _ => None,
        };
        if !parts.query.is_empty() || query_auth.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &parts.query {
                pairs.append_pair(key, value);
            }
            if let Some((name, value)) = query_auth {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }
}

fn build_request_parts(tool: &GeneratedTool, arguments: &JsonObject) -> Result<RequestParts> {
    let missing: Vec<&str> = tool
        .arguments
        .iter()
        .filter(|a| a.required && arguments.get(&a.name).is_none_or(Value::is_null))
        .map(|a| a.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(OpenApiToolsError::InvalidArguments(format!(
            "missing required argument(s) for '{}': {}",
            tool.name,
            missing.join(", ")
        )));
    }

    let mut parts = RequestParts::default();
    for arg in &tool.arguments {
        let Some(value) = arguments.get(&arg.name).filter(|v| !v.is_null()) else {
            continue;
        };
        match arg.location {
            ArgLocation::Path => {
                parts
                    .path_values
                    .insert(arg.name.clone(), value_to_string(value));
            }
            ArgLocation::Query => match value {
                Value::Array(items) => parts.query.extend(
                    items
                        .iter()
                        .map(|item| (arg.name.clone(), value_to_string(item))),
                ),
                other => parts.query.push((arg.name.clone(), value_to_string(other))),
            },
            ArgLocation::Header => parts
                .headers
                .push((arg.name.clone(), value_to_string(value))),
            ArgLocation::BodyField => {
                parts.body_fields.insert(arg.name.clone(), value.clone());
            }
            ArgLocation::Body => parts.body = Some(value.clone()),
        }
    }
    Ok(parts)
}

fn apply_body(
    request: reqwest::RequestBuilder,
    content_type: Option<&str>,
    parts: RequestParts,
) -> reqwest::RequestBuilder {
    let json_body = content_type.is_none_or(is_json_media_type);
    match (parts.body, json_body) {
        (Some(body), true) => request.json(&body),
        (Some(body), false) => request
            .header(
                reqwest::header::CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(value_to_string(&body)),
        (None, _) if !parts.body_fields.is_empty() => request.json(&parts.body_fields),
        (None, _) => request,
    }
}

/// Substitute `{name}` placeholders in one path segment. Unknown placeholders stay as written.
fn fill_template(segment: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let close = open + len;
        out.push_str(&rest[..open]);
        match values.get(&rest[open + 1..close]) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Server URL with `{variable}` placeholders replaced by their defaults.
fn expand_server_url(server: &Server) -> String {
    let defaults: HashMap<String, String> = server
        .variables
        .iter()
        .flatten()
        .map(|(name, var)| (name.clone(), var.default.clone()))
        .collect();
    fill_template(&server.url, &defaults)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
