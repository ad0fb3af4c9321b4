//! quantlink CLI: lineage and relationship graph with an MCP server.
//!
//! Usage:
//!   quantlink mcp [--transport stdio] [--db path]
//!   quantlink link create|delete <source_type> <source_id> <target_type> <target_id> <relation>
//!   quantlink edges|lineage|purge <entity_type> <entity_id>
//!   quantlink path <source_type> <source_id> <target_type> <target_id>
//!   quantlink tag add|remove|list|find|stats ...

use clap::{Parser, Subcommand};
use quantlink::{Config, QuantlinkApi, QuantlinkResult, TracingObserver};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "quantlink",
    version,
    about = "Typed lineage and relationship graph for quant research artifacts"
)]
struct Cli {
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP (Model Context Protocol) server
    Mcp {
        /// Transport type (currently only stdio)
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
    /// Create or delete links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },
    /// List an entity's edges
    Edges {
        entity_type: String,
        entity_id: String,
        /// Leave out incoming bidirectional edges
        #[arg(long)]
        no_bidirectional: bool,
    },
    /// Trace an entity's lineage
    Lineage {
        entity_type: String,
        entity_id: String,
        /// backward (dependencies) or forward (dependents)
        #[arg(long, default_value = "backward")]
        direction: String,
        /// Maximum depth, 1-10
        #[arg(long)]
        max_depth: Option<i64>,
    },
    /// Find the shortest path between two entities
    Path {
        source_type: String,
        source_id: String,
        target_type: String,
        target_id: String,
        /// Maximum number of hops, 1-10
        #[arg(long)]
        max_depth: Option<i64>,
    },
    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Remove every edge touching an entity
    Purge {
        entity_type: String,
        entity_id: String,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a link (no-op if it exists)
    Create {
        source_type: String,
        source_id: String,
        target_type: String,
        target_id: String,
        relation: String,
        /// Override the relation's bidirectional default
        #[arg(long)]
        bidirectional: Option<bool>,
        /// JSON object stored with the edge
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Delete a link
    Delete {
        source_type: String,
        source_id: String,
        target_type: String,
        target_id: String,
        relation: String,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Attach a tag
    Add {
        entity_type: String,
        entity_id: String,
        tag: String,
    },
    /// Detach a tag
    Remove {
        entity_type: String,
        entity_id: String,
        tag: String,
    },
    /// List an entity's tags
    List {
        entity_type: String,
        entity_id: String,
    },
    /// List entities carrying a tag
    Find {
        tag: String,
        /// Only this entity type
        #[arg(long = "type")]
        entity_type: Option<String>,
    },
    /// Tag usage counts
    Stats,
}

fn init_tracing(level: &str) {
    let level: tracing::Level = match level.parse() {
        Ok(level) => level,
        Err(_) => {
            eprintln!("warning: unknown log level '{}', using warn", level);
            tracing::Level::WARN
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(result: QuantlinkResult<T>) -> i32 {
    match result {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: failed to serialize response: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn parse_metadata(raw: Option<String>) -> Result<Option<serde_json::Value>, String> {
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| format!("invalid --metadata JSON: {}", e))
    })
    .transpose()
}

fn cmd_link(api: &QuantlinkApi, action: LinkAction) -> i32 {
    match action {
        LinkAction::Create {
            source_type,
            source_id,
            target_type,
            target_id,
            relation,
            bidirectional,
            metadata,
        } => {
            let metadata = match parse_metadata(metadata) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            };
            print_json(api.create_link(
                &source_type,
                &source_id,
                &target_type,
                &target_id,
                &relation,
                bidirectional,
                metadata,
            ))
        }
        LinkAction::Delete {
            source_type,
            source_id,
            target_type,
            target_id,
            relation,
        } => print_json(api.delete_link(
            &source_type,
            &source_id,
            &target_type,
            &target_id,
            &relation,
        )),
    }
}

fn cmd_tag(api: &QuantlinkApi, action: TagAction) -> i32 {
    match action {
        TagAction::Add {
            entity_type,
            entity_id,
            tag,
        } => print_json(api.add_tag(&entity_type, &entity_id, &tag)),
        TagAction::Remove {
            entity_type,
            entity_id,
            tag,
        } => print_json(api.remove_tag(&entity_type, &entity_id, &tag)),
        TagAction::List {
            entity_type,
            entity_id,
        } => print_json(api.get_entity_tags(&entity_type, &entity_id)),
        TagAction::Find { tag, entity_type } => {
            print_json(api.get_entities_by_tag(&tag, entity_type.as_deref()))
        }
        TagAction::Stats => print_json(api.list_all_tags()),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::discover(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.resolve_log_level(cli.log_level));
    let db_path = config.resolve_db_path(cli.db);

    if let Commands::Mcp { transport } = &cli.command {
        if transport != "stdio" {
            eprintln!("error: only 'stdio' transport is currently supported");
            std::process::exit(1);
        }
        let code = quantlink::mcp::run_mcp_server(db_path);
        std::process::exit(code);
    }

    let api = match QuantlinkApi::open(&db_path) {
        Ok(api) => api.with_observer(Arc::new(TracingObserver)),
        Err(e) => {
            eprintln!("Error: failed to open database at {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Mcp { .. } => 0,
        Commands::Link { action } => cmd_link(&api, action),
        Commands::Edges {
            entity_type,
            entity_id,
            no_bidirectional,
        } => print_json(api.get_edges(&entity_type, &entity_id, !no_bidirectional)),
        Commands::Lineage {
            entity_type,
            entity_id,
            direction,
            max_depth,
        } => print_json(api.trace_lineage(&entity_type, &entity_id, Some(&direction), max_depth)),
        Commands::Path {
            source_type,
            source_id,
            target_type,
            target_id,
            max_depth,
        } => print_json(api.find_path(
            &source_type,
            &source_id,
            &target_type,
            &target_id,
            max_depth,
        )),
        Commands::Tag { action } => cmd_tag(&api, action),
        Commands::Purge {
            entity_type,
            entity_id,
        } => print_json(api.delete_entity(&entity_type, &entity_id)),
    };
    std::process::exit(code);
}
