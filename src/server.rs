//! Server transports: MCP over stdio, and an HTTP server that carries both
//! MCP Streamable HTTP and a plain JSON tool API.
//!
//! All tools are registered in one [`ToolRegistry`] and dispatched through
//! the same [`Tool::execute`](crate::traits::Tool::execute) path whichever
//! transport is used.
//!
//! # Endpoints (HTTP transport)
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `*`    | `/mcp` | MCP Streamable HTTP |
//! | `GET`  | `/tools/list` | List all registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call any registered tool by name |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "explain_concept: invalid argument: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `timeout` (408),
//! `upstream_error` (502), `tool_error` (500).
//!
//! # Agent Integration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "ord-assist": {
//!       "command": "ord-assist",
//!       "args": ["serve"]
//!     }
//!   }
//! }
//! ```

use anyhow::{bail, Context};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::ServiceExt;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::{FetchError, ToolError};
use crate::mcp::McpBridge;
use crate::traits::{validate_params, ToolContext, ToolRegistry};

const MCP_PATH: &str = "/mcp";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    ctx: ToolContext,
    tools: Arc<ToolRegistry>,
}

/// Start the server on the configured transport.
///
/// `transport_override` (from `serve --transport`) takes precedence over
/// `[server].transport`. Runs until the client disconnects (stdio) or the
/// process is terminated (http).
pub async fn run_server(config: &Config, transport_override: Option<&str>) -> anyhow::Result<()> {
    run_server_with_extensions(config, transport_override, ToolRegistry::new()).await
}

/// Like [`run_server`], but serves `extra_tools` alongside the built-ins.
///
/// # Example
///
/// ```rust,no_run
/// use ord_assist::server::run_server_with_extensions;
/// use ord_assist::traits::ToolRegistry;
///
/// # async fn example(config: &ord_assist::config::Config) -> anyhow::Result<()> {
/// let mut tools = ToolRegistry::new();
/// // tools.register(Box::new(MyTool));
/// run_server_with_extensions(config, Some("http"), tools).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_server_with_extensions(
    config: &Config,
    transport_override: Option<&str>,
    extra_tools: ToolRegistry,
) -> anyhow::Result<()> {
    let config = Arc::new(config.clone());
    let mut registry = ToolRegistry::with_builtins();
    for tool in extra_tools.into_tools() {
        if registry.find(tool.name()).is_some() {
            bail!("tool '{}' is already registered", tool.name());
        }
        registry.register(tool);
    }
    let ctx = ToolContext::from_config(config.clone())?.with_served_tools(&registry);
    let tools = Arc::new(registry);

    let transport = transport_override.unwrap_or(&config.server.transport);
    match transport {
        "stdio" => run_stdio(ctx, tools).await,
        "http" => run_http(&config.server.bind, ctx, tools).await,
        other => bail!("Unknown server transport: '{}'. Use stdio or http.", other),
    }
}

async fn run_stdio(ctx: ToolContext, tools: Arc<ToolRegistry>) -> anyhow::Result<()> {
    tracing::info!(transport = "stdio", tools = tools.len(), "serving MCP");
    let service = McpBridge::new(ctx, tools)
        .serve(stdio())
        .await
        .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
    service.waiting().await?;
    Ok(())
}

async fn run_http(bind: &str, ctx: ToolContext, tools: Arc<ToolRegistry>) -> anyhow::Result<()> {
    for t in tools.tools() {
        let tag = if t.is_builtin() { "builtin" } else { "rust" };
        tracing::debug!(tool = t.name(), kind = tag, "registered tool");
    }

    let app = build_router(ctx, tools);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = MCP_PATH, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The HTTP application: MCP under `/mcp` plus the JSON tool API.
pub fn build_router(ctx: ToolContext, tools: Arc<ToolRegistry>) -> Router {
    let bridge = McpBridge::new(ctx.clone(), tools.clone());
    let mcp_service = StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest_service(MCP_PATH, mcp_service)
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { ctx, tools })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Map a tool failure to a status code by its error type.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let message = format!("{}: {}", tool_name, err);

    if let Some(tool_err) = err.downcast_ref::<ToolError>() {
        return match tool_err {
            ToolError::InvalidArgument(_) | ToolError::UnknownConcept { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
            }
            ToolError::NotFound(_) => AppError::new(StatusCode::NOT_FOUND, "not_found", message),
        };
    }

    if let Some(fetch_err) = err.downcast_ref::<FetchError>() {
        return match fetch_err {
            FetchError::Timeout { .. } => {
                AppError::new(StatusCode::REQUEST_TIMEOUT, "timeout", message)
            }
            FetchError::Status { .. } | FetchError::Transport(_) => {
                AppError::new(StatusCode::BAD_GATEWAY, "upstream_error", message)
            }
        };
    }

    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "tool_error", message)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    builtin: bool,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            builtin: t.is_builtin(),
            parameters: t.parameters_schema(),
        })
        .collect();

    Json(ToolListResponse { tools })
}

// ============ POST /tools/{name} ============

/// Unified tool dispatch: look up, check parameters, execute.
///
/// Returns `404` for an unknown tool, `400` for parameter errors, and the
/// status from [`classify_tool_error`] for execution errors.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tool = state.tools.find(&name).ok_or_else(|| {
        AppError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no tool registered with name: {}", name),
        )
    })?;

    let validated_params = validate_params(&tool.parameters_schema(), &params)
        .map_err(|e| {
            AppError::new(
                StatusCode::BAD_REQUEST,
                "bad_request",
                format!("{}: {}", name, e),
            )
        })?;

    tracing::debug!(tool = %name, "http tool call");
    let result = tool
        .execute(validated_params, &state.ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;

    Ok(Json(serde_json::json!({ "result": result })))
}
