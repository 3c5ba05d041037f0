//! # ORD Assist CLI (`ord-assist`)
//!
//! Runs the MCP server and exposes every tool as a subcommand.
//!
//! ## Usage
//!
//! ```bash
//! ord-assist --config ./config/ord-assist.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ord-assist serve` | Start the MCP server (stdio or http) |
//! | `ord-assist capabilities` | List tools, concepts, and example types |
//! | `ord-assist spec [--section S]` | Print the ORD specification or one section |
//! | `ord-assist explain <concept>` | Explain an ORD concept |
//! | `ord-assist generate --service S` | Generate CAP `@ORD.Extensions` annotations |
//! | `ord-assist validate <file>` | Validate an ORD document (exit 1 when invalid) |
//! | `ord-assist analyze <dir>` | Analyze a CAP project |
//! | `ord-assist examples <kind>` | Print an example record or document |
//! | `ord-assist completions <shell>` | Print shell completions |

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use ord_assist::commands::{self, GenerateArgs};
use ord_assist::{config, logging, server};

/// ORD Assist: explain, generate, and validate Open Resource Discovery metadata.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file is missing, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "ord-assist",
    about = "ORD Assist: an MCP server and CLI for Open Resource Discovery metadata",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ord-assist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server.
    ///
    /// `stdio` speaks MCP on stdin/stdout. `http` binds `[server].bind` and
    /// serves MCP at `/mcp` plus the JSON tool API.
    Serve {
        /// Override `[server].transport` (`stdio` or `http`).
        #[arg(long)]
        transport: Option<String>,
    },

    /// List tools, concepts, example types, and validated collections.
    Capabilities,

    /// Print the ORD specification, or a single section of it.
    Spec {
        /// Heading text to extract (case-insensitive substring).
        #[arg(long)]
        section: Option<String>,
    },

    /// Explain an ORD concept.
    Explain {
        /// Concept name, e.g. `Product` or `ConsumptionBundle`.
        concept: String,
    },

    /// Generate CAP CDS `@ORD.Extensions` annotations for a service.
    Generate {
        /// CDS service name, e.g. `CatalogService`.
        #[arg(long)]
        service: String,
        /// ORD namespace (defaults to `customer`).
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        short_description: Option<String>,
        /// Semantic version (defaults to `1.0.0`).
        #[arg(long)]
        version: Option<String>,
        /// `public`, `internal`, or `private`.
        #[arg(long)]
        visibility: Option<String>,
        /// Entity to annotate with `@ODM.entityName` (repeatable).
        #[arg(long = "entity")]
        entities: Vec<String>,
        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate an ORD document. Exits with status 1 when it is invalid.
    Validate {
        /// Path to the ORD document (JSON).
        file: PathBuf,
        /// Also report best-practice suggestions.
        #[arg(long)]
        strict: bool,
        /// Print the validation result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Analyze a CAP project directory.
    Analyze {
        /// Project root.
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Print the analysis as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print an example record, document, or CAP annotation sample.
    Examples {
        /// One of: product, vendor, capability, api, event, bundle, complete, cap-annotations.
        #[arg(default_value = "complete")]
        kind: String,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(
            *shell,
            &mut Cli::command(),
            "ord-assist",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;
    logging::init_logging(&cfg.logging)?;

    match cli.command {
        Commands::Serve { transport } => {
            server::run_server(&cfg, transport.as_deref()).await?;
        }
        Commands::Capabilities => {
            commands::run_capabilities(&commands::context(&cfg)?).await?;
        }
        Commands::Spec { section } => {
            commands::run_spec(&commands::context(&cfg)?, section).await?;
        }
        Commands::Explain { concept } => {
            commands::run_explain(&commands::context(&cfg)?, &concept).await?;
        }
        Commands::Generate {
            service,
            namespace,
            title,
            short_description,
            version,
            visibility,
            entities,
            json,
        } => {
            let args = GenerateArgs {
                service,
                namespace,
                title,
                short_description,
                version,
                visibility,
                entities,
                json,
            };
            commands::run_generate(&commands::context(&cfg)?, args).await?;
        }
        Commands::Validate { file, strict, json } => {
            let valid = commands::run_validate(&cfg, &file, strict, json)?;
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Analyze { dir, json } => {
            commands::run_analyze(&commands::context(&cfg)?, &dir, json).await?;
        }
        Commands::Examples { kind } => {
            commands::run_examples(&commands::context(&cfg)?, &kind).await?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
