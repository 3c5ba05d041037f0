//! CLI command implementations.
//!
//! Each `run_*` function backs one `ord-assist` subcommand and prints its
//! result to stdout. Commands that wrap a tool go through the same
//! [`ToolRegistry`] dispatch as the servers, so the CLI and the agents see
//! identical behavior.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::traits::{validate_params, ToolContext, ToolRegistry};
use crate::validator::{validate_metadata, ValidationLevel};

/// Look up a built-in tool, check `params`, and execute it.
pub async fn call_tool(ctx: &ToolContext, name: &str, params: Value) -> Result<Value> {
    let registry = ToolRegistry::with_builtins();
    let tool = registry
        .find(name)
        .with_context(|| format!("no tool registered with name: {}", name))?;
    let params = validate_params(&tool.parameters_schema(), &params)?;
    tool.execute(params, ctx).await
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_capabilities(ctx: &ToolContext) -> Result<()> {
    let caps = call_tool(ctx, "list_capabilities", json!({})).await?;
    print_json(&caps)
}

pub async fn run_spec(ctx: &ToolContext, section: Option<String>) -> Result<()> {
    let params = match section {
        Some(section) => json!({ "section": section }),
        None => json!({}),
    };
    let result = call_tool(ctx, "fetch_specification", params).await?;
    println!("{}", result["text"].as_str().unwrap_or_default());
    Ok(())
}

pub async fn run_explain(ctx: &ToolContext, concept: &str) -> Result<()> {
    let result = call_tool(ctx, "explain_concept", json!({ "concept": concept })).await?;
    println!("{}", result["text"].as_str().unwrap_or_default());
    Ok(())
}

/// Options for `ord-assist generate`.
pub struct GenerateArgs {
    pub service: String,
    pub namespace: Option<String>,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub version: Option<String>,
    pub visibility: Option<String>,
    pub entities: Vec<String>,
    pub json: bool,
}

pub async fn run_generate(ctx: &ToolContext, args: GenerateArgs) -> Result<()> {
    let mut params = serde_json::Map::new();
    params.insert("serviceName".to_string(), json!(args.service));
    for (key, value) in [
        ("namespace", args.namespace),
        ("title", args.title),
        ("shortDescription", args.short_description),
        ("version", args.version),
        ("visibility", args.visibility),
    ] {
        if let Some(value) = value {
            params.insert(key.to_string(), json!(value));
        }
    }
    if !args.entities.is_empty() {
        params.insert("entities".to_string(), json!(args.entities));
    }

    let result = call_tool(ctx, "generate_annotations", Value::Object(params)).await?;
    if args.json {
        return print_json(&result);
    }

    println!("{}", result["cds"].as_str().unwrap_or_default());
    if let Some(notes) = result["notes"].as_array() {
        for note in notes.iter().filter_map(Value::as_str) {
            eprintln!("note: {}", note);
        }
    }
    Ok(())
}

/// Validate an ORD document on disk. Returns whether it is valid.
pub fn run_validate(config: &Config, file: &Path, strict: bool, json_output: bool) -> Result<bool> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read metadata file: {}", file.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse JSON: {}", file.display()))?;

    let level = ValidationLevel::from_strict(strict || config.validation.strict);
    let result = validate_metadata(&document, level);

    if json_output {
        print_json(&serde_json::to_value(&result)?)?;
    } else {
        println!("{}: {}", file.display(), result.report());
    }
    Ok(result.valid)
}

pub async fn run_analyze(ctx: &ToolContext, dir: &Path, json_output: bool) -> Result<()> {
    let params = json!({ "path": dir.to_string_lossy() });
    let analysis = call_tool(ctx, "analyze_project", params).await?;
    if json_output {
        return print_json(&analysis);
    }

    println!(
        "Project: {}",
        analysis["projectName"].as_str().unwrap_or("(unnamed)")
    );
    println!(
        "  CAP project: {}  ORD plugin: {}  files scanned: {}{}",
        analysis["isCapProject"].as_bool().unwrap_or(false),
        analysis["hasOrdPlugin"].as_bool().unwrap_or(false),
        analysis["filesScanned"].as_u64().unwrap_or(0),
        if analysis["truncated"].as_bool().unwrap_or(false) {
            " (truncated)"
        } else {
            ""
        }
    );

    let names = |key: &str| -> String {
        analysis[key]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    };
    println!("  services: {}", names("services"));
    println!("  annotated: {}", names("annotatedServices"));

    if let Some(files) = analysis["metadataFiles"].as_array() {
        for file in files {
            let path = file["path"].as_str().unwrap_or_default();
            if let Some(err) = file["parseError"].as_str() {
                println!("  {}: parse error: {}", path, err);
            } else {
                println!(
                    "  {}: valid={} errors={} warnings={}",
                    path,
                    file["validation"]["valid"].as_bool().unwrap_or(false),
                    file["validation"]["errors"].as_array().map_or(0, Vec::len),
                    file["validation"]["warnings"].as_array().map_or(0, Vec::len),
                );
            }
        }
    }

    if let Some(suggestions) = analysis["suggestions"].as_array() {
        for s in suggestions.iter().filter_map(Value::as_str) {
            println!("  suggestion: {}", s);
        }
    }
    Ok(())
}

pub async fn run_examples(ctx: &ToolContext, kind: &str) -> Result<()> {
    let example = call_tool(ctx, "get_examples", json!({ "type": kind })).await?;
    match &example["content"] {
        Value::String(text) => println!("{}", text),
        content => print_json(content)?,
    }
    Ok(())
}

/// Build the tool context shared by every command.
pub fn context(config: &Config) -> Result<ToolContext> {
    ToolContext::from_config(Arc::new(config.clone()))
}
