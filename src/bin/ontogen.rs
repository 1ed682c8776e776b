//! Ontogen CLI — run cycles, work the review queue, integrate approvals.
//!
//! Usage:
//!   ontogen cycle --entities entities.json [--db path] [--root dir]
//!   ontogen review <subcommand> [--db path]
//!   ontogen integrate [--id <review-id> | --all] [--db path] [--root dir]
//!   ontogen rollback <integration-id> [--db path] [--root dir]
//!   ontogen state <export|import> <path> [--db path]

use clap::{Parser, Subcommand};
use ontogen::generation::ArtifactPayload;
use ontogen::integration::IntegrationId;
use ontogen::review::ReviewId;
use ontogen::storage::{SqliteStore, StateSnapshot};
use ontogen::{AxiomTable, Config, Entity, OntogenEngine};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "ontogen",
    version,
    about = "Self-extending taxonomy engine with human-in-the-loop integration"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the SQLite state database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Taxonomy store root directory that target locations resolve against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Optional YAML axiom table overriding the builtin one
    #[arg(long, global = true)]
    axioms: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis cycle over an entity snapshot
    Cycle {
        /// JSON file containing the entity list
        #[arg(long)]
        entities: PathBuf,
    },
    /// Work the review queue
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
    /// Integrate approved review items
    Integrate {
        /// A single review item id
        #[arg(long, conflicts_with = "all")]
        id: Option<String>,
        /// Integrate everything approved
        #[arg(long)]
        all: bool,
    },
    /// Roll an integration back to its backup
    Rollback {
        /// Integration record id
        id: String,
    },
    /// Export or import the persisted state snapshot
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List pending items, highest priority first
    List,
    /// Approve a pending item
    Approve {
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject a pending item
    Reject {
        id: String,
        #[arg(long)]
        reviewer: String,
        #[arg(long)]
        reason: String,
    },
    /// Approve with an edited payload (JSON file)
    Modify {
        id: String,
        #[arg(long)]
        reviewer: String,
        /// JSON file containing the edited artifact payload
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show queue statistics
    Stats,
}

#[derive(Subcommand)]
enum StateAction {
    /// Write the state snapshot to a JSON file
    Export { path: PathBuf },
    /// Load a state snapshot from a JSON file
    Import { path: PathBuf },
}

/// Default state database path (~/.local/share/ontogen/ontogen.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let ontogen_dir = data_dir.join("ontogen");
    std::fs::create_dir_all(&ontogen_dir).ok();
    ontogen_dir.join("ontogen.db")
}

fn open_engine(cli: &Cli) -> Result<OntogenEngine, String> {
    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    let store = SqliteStore::open(&db_path)
        .map_err(|e| format!("failed to open state database: {}", e))?;

    let axioms = match &cli.axioms {
        Some(path) => AxiomTable::from_yaml_file(path)
            .map_err(|e| format!("failed to load axiom table: {}", e))?,
        None => AxiomTable::builtin(),
    };

    OntogenEngine::new(Config::default(), axioms, Arc::new(store), &cli.root)
        .map_err(|e| format!("failed to start engine: {}", e))
}

fn parse_review_id(s: &str) -> Result<ReviewId, String> {
    ReviewId::parse(s).map_err(|e| format!("invalid review id '{}': {}", s, e))
}

fn cmd_cycle(engine: &OntogenEngine, entities_path: &PathBuf) -> i32 {
    let raw = match std::fs::read_to_string(entities_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", entities_path.display(), e);
            return 1;
        }
    };
    let entities: Vec<Entity> = match serde_json::from_str(&raw) {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!("Error: invalid entity snapshot: {}", e);
            return 1;
        }
    };

    match engine.run_cycle(&entities) {
        Ok(result) => {
            println!(
                "analyzed {} entities: {} gaps, {} artifacts ({} valid, {} invalid), {} pending reviews",
                result.entities_analyzed,
                result.gaps_detected,
                result.artifacts_generated,
                result.validations_passed,
                result.validations_failed,
                result.pending_reviews,
            );
            for error in &result.errors {
                eprintln!("warning: {}", error);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_review_list(engine: &OntogenEngine) -> i32 {
    match engine.list_pending_reviews() {
        Ok(pending) => {
            if pending.is_empty() {
                println!("no pending reviews");
                return 0;
            }
            for item in pending {
                println!(
                    "{}  [{}] {}  {}  ({})",
                    item.id,
                    item.priority,
                    item.gap.gap_type,
                    item.gap.description,
                    item.artifact
                        .as_ref()
                        .map(|a| a.name.as_str())
                        .unwrap_or("no artifact"),
                );
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_review_stats(engine: &OntogenEngine) -> i32 {
    match engine.review_stats() {
        Ok(stats) => {
            println!("total: {}  pending: {}", stats.total, stats.pending);
            for (status, count) in &stats.by_status {
                println!("  {}: {}", status, count);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_integrate(engine: &OntogenEngine, id: Option<String>, all: bool) -> i32 {
    if let Some(id) = id {
        let review_id = match parse_review_id(&id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        match engine.integrate_approved(&review_id).await {
            Ok(result) if result.success => {
                println!(
                    "integrated ({:?}), record {}",
                    result.action,
                    result.record.map(|r| r.to_string()).unwrap_or_default()
                );
                0
            }
            Ok(result) => {
                eprintln!(
                    "integration failed: {}",
                    result.error.unwrap_or_else(|| "unknown".to_string())
                );
                1
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    } else if all {
        match engine.integrate_all_approved().await {
            Ok(results) => {
                let succeeded = results.iter().filter(|r| r.success).count();
                println!("integrated {}/{} items", succeeded, results.len());
                for result in results.iter().filter(|r| !r.success) {
                    eprintln!(
                        "failed: {}",
                        result.error.as_deref().unwrap_or("unknown")
                    );
                }
                if succeeded == results.len() {
                    0
                } else {
                    1
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        }
    } else {
        eprintln!("Error: pass --id <review-id> or --all");
        1
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let engine = match open_engine(&cli) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Cycle { ref entities } => cmd_cycle(&engine, entities),
        Commands::Review { ref action } => match action {
            ReviewAction::List => cmd_review_list(&engine),
            ReviewAction::Stats => cmd_review_stats(&engine),
            ReviewAction::Approve { id, reviewer, notes } => {
                match parse_review_id(id)
                    .and_then(|rid| {
                        engine
                            .approve(&rid, reviewer, notes.clone())
                            .map_err(|e| e.to_string())
                    }) {
                    Ok(item) => {
                        println!("approved {}", item.id);
                        0
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                }
            }
            ReviewAction::Reject { id, reviewer, reason } => {
                match parse_review_id(id)
                    .and_then(|rid| {
                        engine
                            .reject(&rid, reviewer, reason.clone())
                            .map_err(|e| e.to_string())
                    }) {
                    Ok(item) => {
                        println!("rejected {}", item.id);
                        0
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                }
            }
            ReviewAction::Modify {
                id,
                reviewer,
                payload,
                notes,
            } => {
                let parsed: Result<ArtifactPayload, String> = std::fs::read_to_string(payload)
                    .map_err(|e| format!("cannot read {}: {}", payload.display(), e))
                    .and_then(|raw| {
                        serde_json::from_str(&raw).map_err(|e| format!("invalid payload: {}", e))
                    });
                match (parse_review_id(id), parsed) {
                    (Ok(rid), Ok(new_payload)) => {
                        match engine.modify_and_approve(&rid, reviewer, new_payload, notes.clone())
                        {
                            Ok(item) => {
                                println!("modified and approved {}", item.id);
                                0
                            }
                            Err(e) => {
                                eprintln!("Error: {}", e);
                                1
                            }
                        }
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                }
            }
        },
        Commands::Integrate { id, all } => cmd_integrate(&engine, id, all).await,
        Commands::Rollback { ref id } => {
            match IntegrationId::parse(id)
                .map_err(|e| format!("invalid integration id '{}': {}", id, e))
            {
                Ok(integration_id) => match engine.rollback(&integration_id).await {
                    Ok(_) => {
                        println!("rolled back {}", integration_id);
                        0
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            }
        }
        Commands::State { ref action } => match action {
            StateAction::Export { path } => match engine.export_state() {
                Ok(snapshot) => match serde_json::to_string_pretty(&snapshot)
                    .map_err(|e| e.to_string())
                    .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()))
                {
                    Ok(()) => {
                        println!("exported state to {}", path.display());
                        0
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            },
            StateAction::Import { path } => {
                let parsed: Result<StateSnapshot, String> = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path.display(), e))
                    .and_then(|raw| {
                        serde_json::from_str(&raw).map_err(|e| format!("invalid snapshot: {}", e))
                    });
                match parsed {
                    Ok(snapshot) => match engine.import_state(&snapshot) {
                        Ok(()) => {
                            println!(
                                "imported {} review items, {} integration records",
                                snapshot.review_items.len(),
                                snapshot.integration_history.len()
                            );
                            0
                        }
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            1
                        }
                    },
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        1
                    }
                }
            }
        },
    };

    std::process::exit(code);
}
