//! # ORD Assist
//!
//! Documentation and annotation assistant for Open Resource Discovery (ORD).
//!
//! ORD Assist explains ORD concepts, generates CAP `@ORD.Extensions`
//! annotations, validates ORD documents, and inspects CAP projects. Every
//! operation is a tool, served to agents over MCP (stdio or Streamable HTTP)
//! and to people through the `ord-assist` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐ ┌───────────┐ ┌─────────────┐ ┌──────────┐
//! │ concepts │ │ validator │ │ annotations │ │ project  │
//! └────┬─────┘ └─────┬─────┘ └──────┬──────┘ └────┬─────┘
//!      └─────────────┴───────┬──────┴─────────────┘
//!                            ▼
//!                     ┌──────────────┐
//!                     │ ToolRegistry │
//!                     └──────┬───────┘
//!              ┌─────────────┼──────────────┐
//!              ▼             ▼              ▼
//!         ┌─────────┐  ┌──────────┐  ┌────────────┐
//!         │   CLI   │  │MCP stdio │  │ HTTP (/mcp,│
//!         │         │  │          │  │ /tools/*)  │
//!         └─────────┘  └──────────┘  └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ord-assist explain ConsumptionBundle
//! ord-assist validate ./ord.json --strict
//! ord-assist generate --service CatalogService --namespace sap.bookshop --entity Books
//! ord-assist serve                     # MCP over stdio
//! ord-assist serve --transport http    # MCP at /mcp + JSON API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`concepts`] | ORD concept catalog and explanations |
//! | [`validator`] | ORD document validation |
//! | [`annotations`] | CAP annotation generator |
//! | [`samples`] | Example records and documents |
//! | [`spec_fetch`] | Specification download and section extraction |
//! | [`project`] | CAP project scanner |
//! | [`traits`] | Tool trait, context, and registry |
//! | [`mcp`] | MCP protocol bridge |
//! | [`server`] | stdio and HTTP transports |
//! | [`commands`] | CLI command implementations |
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`error`] | Typed tool and fetch errors |

pub mod annotations;
pub mod commands;
pub mod concepts;
pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod project;
pub mod samples;
pub mod server;
pub mod spec_fetch;
pub mod traits;
pub mod validator;
