//! Integration tests for the `Tool` trait and the HTTP transport.
//!
//! These tests prove that built-in and custom tools (implemented via the
//! `Tool` trait) are listed and dispatched end-to-end through the actual
//! HTTP server, and that tool failures map to the documented status codes.

use anyhow::Result;
use async_trait::async_trait;
use ord_assist::config::Config;
use ord_assist::server::run_server_with_extensions;
use ord_assist::traits::{Tool, ToolContext, ToolRegistry};
use serde_json::{json, Value};

// ─── Test Tool ──────────────────────────────────────────────────────

/// A tool that validates its input through the context's configuration.
struct StrictnessTool;

#[async_trait]
impl Tool for StrictnessTool {
    fn name(&self) -> &str {
        "strictness"
    }

    fn description(&self) -> &str {
        "Report the configured validation level"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "echo": { "type": "string" }
            },
            "required": ["echo"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        Ok(json!({
            "echo": params["echo"],
            "strict": ctx.config().validation.strict,
        }))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config_with_port(port: u16) -> Config {
    let config_content = format!(
        r#"
[server]
bind = "127.0.0.1:{}"
transport = "http"

[spec]
url = "http://127.0.0.1:9/unreachable.md"
timeout_secs = 2

[validation]
strict = true
"#,
        port
    );
    ord_assist::config::parse_config(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start_server(extra: ToolRegistry) -> (u16, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config_with_port(port);
    let handle = tokio::spawn(async move {
        run_server_with_extensions(&cfg, None, extra).await.ok();
    });
    wait_for_server(port).await;
    (port, handle)
}

async fn post_tool(port: u16, name: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}/tools/{}", port, name))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_custom_tool_via_http_server() {
    let mut tools = ToolRegistry::new();
    tools.register(Box::new(StrictnessTool));
    let (port, server_handle) = start_server(tools).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://127.0.0.1:{}/tools/list", port))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let listed = body["tools"].as_array().unwrap();
    assert_eq!(listed.len(), 8);
    let custom = listed.iter().find(|t| t["name"] == "strictness").unwrap();
    assert_eq!(custom["builtin"], false);
    assert!(listed
        .iter()
        .any(|t| t["name"] == "explain_concept" && t["builtin"] == true));

    let (status, body) = post_tool(port, "list_capabilities", json!({})).await;
    assert_eq!(status, 200);
    let capabilities = body["result"]["tools"].as_array().unwrap();
    assert_eq!(capabilities.len(), 8);
    assert!(capabilities
        .iter()
        .any(|t| t["name"] == "strictness"
            && t["description"] == "Report the configured validation level"));

    let (status, body) = post_tool(port, "strictness", json!({ "echo": "hi" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["echo"], "hi");
    assert_eq!(body["result"]["strict"], true);

    let (status, body) = post_tool(port, "strictness", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = post_tool(port, "nonexistent", json!({})).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    server_handle.abort();
}

#[tokio::test]
async fn test_builtin_tool_errors_map_to_status_codes() {
    let (port, server_handle) = start_server(ToolRegistry::new()).await;

    let (status, body) = post_tool(port, "explain_concept", json!({ "concept": "Product" })).await;
    assert_eq!(status, 200);
    assert!(body["result"]["text"]
        .as_str()
        .unwrap()
        .starts_with("# ORD Concept: Product"));

    let (status, body) = post_tool(port, "explain_concept", json!({ "concept": "Widget" })).await;
    assert_eq!(status, 400);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown concept 'Widget'"));

    let (status, _) = post_tool(port, "explain_concept", json!({ "concept": "   " })).await;
    assert_eq!(status, 400);

    let (status, _) = post_tool(port, "validate_metadata", json!({ "metadata": "[1, 2]" })).await;
    assert_eq!(status, 400);

    let (status, _) = post_tool(
        port,
        "analyze_project",
        json!({ "path": "/definitely/not/here" }),
    )
    .await;
    assert_eq!(status, 400);

    // The spec URL points at a closed port.
    let (status, body) = post_tool(port, "fetch_specification", json!({})).await;
    assert!(status == 502 || status == 408, "status {}", status);
    assert!(body["error"]["code"] == "upstream_error" || body["error"]["code"] == "timeout");

    server_handle.abort();
}

#[tokio::test]
async fn test_validate_metadata_over_http_uses_config_strictness() {
    let (port, server_handle) = start_server(ToolRegistry::new()).await;

    let doc = json!({
        "openResourceDiscoveryVersion": "1.9.0",
        "vendors": [{ "ordId": "acme:vendor:Acme:v1", "title": "Acme" }],
        "products": [{
            "ordId": "acme:product:Shop:v1",
            "title": "Shop",
            "shortDescription": "A shop",
            "vendor": "acme:vendor:Acme:v1"
        }]
    });

    let (status, body) = post_tool(
        port,
        "validate_metadata",
        json!({ "metadata": doc.to_string() }),
    )
    .await;
    assert_eq!(status, 200);
    let result = &body["result"];
    assert_eq!(result["valid"], true);
    assert_eq!(result["validationLevel"], "strict");
    assert!(!result["suggestions"].as_array().unwrap().is_empty());

    let (_, body) = post_tool(
        port,
        "validate_metadata",
        json!({ "metadata": doc, "strict": false }),
    )
    .await;
    assert_eq!(body["result"]["validationLevel"], "standard");
    assert!(body["result"]["suggestions"].as_array().unwrap().is_empty());

    server_handle.abort();
}

#[tokio::test]
async fn test_duplicate_tool_name_is_rejected() {
    struct Shadow;

    #[async_trait]
    impl Tool for Shadow {
        fn name(&self) -> &str {
            "explain_concept"
        }
        fn description(&self) -> &str {
            "shadows a builtin"
        }
        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }
        async fn execute(&self, _params: Value, _ctx: &ToolContext) -> Result<Value> {
            Ok(json!({}))
        }
    }

    let mut tools = ToolRegistry::new();
    tools.register(Box::new(Shadow));
    let cfg = test_config_with_port(find_free_port());
    let err = run_server_with_extensions(&cfg, None, tools)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));
}
