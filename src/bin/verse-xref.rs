//! verse-xref CLI: load a citation graph and run traversals against it.
//!
//! Usage:
//!   verse-xref import --passages passages.json --refs refs.json [--db path]
//!   verse-xref ring <ANCHOR | --ref "GEN 1:1"> [--tree] [--db path]
//!   verse-xref tree <ANCHOR | --ref "GEN 1:1"> [--production] [--db path]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use verse_xref::{
    CrossRef, GraphSnapshot, GraphStore, Passage, PassageId, Reference, SqliteStore, TraversalConfig, XrefEngine,
};

#[derive(Parser)]
#[command(
    name = "verse-xref",
    version,
    about = "Budgeted cross-reference traversal over passage citation graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// YAML file with traversal budgets
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AnchorArgs {
    /// Anchor passage id
    anchor: Option<i64>,
    /// Anchor reference, e.g. "GEN 1:1"
    #[arg(long = "ref")]
    reference: Option<Reference>,
}

#[derive(Args)]
struct RunArgs {
    /// Load the whole graph into memory before traversing
    #[arg(long)]
    snapshot: bool,
    /// Give up if the traversal takes longer than this
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import passages and cross references from JSON arrays
    Import {
        /// JSON array of passages
        #[arg(long)]
        passages: Option<PathBuf>,
        /// JSON array of {"from": id, "to": id} edges
        #[arg(long)]
        refs: Option<PathBuf>,
    },
    /// Build the four-ring context bundle around an anchor
    Ring {
        #[command(flatten)]
        anchor: AnchorArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Print the bundle projected onto a tree with its spine marked
        #[arg(long)]
        tree: bool,
    },
    /// Build the genealogy tree rooted at an anchor
    Tree {
        #[command(flatten)]
        anchor: AnchorArgs,
        #[command(flatten)]
        run: RunArgs,
        /// Use the production budgets (30 passages, no depth or branching cap)
        #[arg(long)]
        production: bool,
    },
}

/// Get the default database path (~/.local/share/verse-xref/verse-xref.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("verse-xref").join("verse-xref.db")
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))
}

fn load_config(path: Option<&Path>) -> Result<TraversalConfig, String> {
    match path {
        Some(path) => TraversalConfig::load(path).map_err(|e| format!("Failed to load config: {}", e)),
        None => Ok(TraversalConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

fn cmd_import(store: &SqliteStore, passages: Option<&Path>, refs: Option<&Path>) -> Result<(), String> {
    if passages.is_none() && refs.is_none() {
        return Err("nothing to import; pass --passages and/or --refs".to_string());
    }
    if let Some(path) = passages {
        let passages: Vec<Passage> = read_json(path)?;
        let written = store.insert_passages(&passages).map_err(|e| e.to_string())?;
        println!("Imported {} passages", written);
    }
    if let Some(path) = refs {
        let refs: Vec<CrossRef> = read_json(path)?;
        let written = store.insert_cross_refs(&refs).map_err(|e| e.to_string())?;
        println!("Imported {} cross references", written);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

async fn resolve_anchor<S: GraphStore + ?Sized>(engine: &XrefEngine<S>, anchor: AnchorArgs) -> Result<PassageId, String> {
    if let Some(id) = anchor.anchor {
        return Ok(PassageId::new(id));
    }
    let Some(reference) = anchor.reference else {
        return Err("an anchor id or --ref is required".to_string());
    };
    engine
        .resolve_reference(&reference)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no passage found for '{}'", reference))
}

async fn with_timeout<T, F>(timeout_secs: Option<u64>, fut: F) -> Result<T, String>
where
    F: std::future::Future<Output = Result<T, String>>,
{
    match timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), fut)
            .await
            .map_err(|_| format!("traversal timed out after {}s", secs))?,
        None => fut.await,
    }
}

async fn cmd_traverse(engine: XrefEngine<dyn GraphStore>, command: Commands) -> Result<(), String> {
    match command {
        Commands::Ring { anchor, run, tree } => {
            with_timeout(run.timeout_secs, async {
                let anchor = resolve_anchor(&engine, anchor).await?;
                if tree {
                    print_json(&engine.ring_tree(anchor).await.map_err(|e| e.to_string())?)
                } else {
                    print_json(&engine.ring_bundle(anchor).await.map_err(|e| e.to_string())?)
                }
            })
            .await
        }
        Commands::Tree { anchor, run, production } => {
            with_timeout(run.timeout_secs, async {
                let anchor = resolve_anchor(&engine, anchor).await?;
                let bundle = if production {
                    let config = engine.config().clone().with_production_tree().tree;
                    engine.genealogy_with(anchor, &config).await
                } else {
                    engine.genealogy(anchor).await
                };
                print_json(&bundle.map_err(|e| e.to_string())?)
            })
            .await
        }
        Commands::Import { .. } => Err("import is not a traversal".to_string()),
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let store = open_store(cli.db)?;

    let (use_snapshot, command) = match cli.command {
        Commands::Import { passages, refs } => return cmd_import(&store, passages.as_deref(), refs.as_deref()),
        command => {
            let use_snapshot =
                matches!(&command, Commands::Ring { run, .. } | Commands::Tree { run, .. } if run.snapshot);
            (use_snapshot, command)
        }
    };

    let config = load_config(cli.config.as_deref())?;
    let store: Arc<dyn GraphStore> = if use_snapshot {
        let snapshot = GraphSnapshot::load(&store).map_err(|e| format!("Failed to load snapshot: {}", e))?;
        tracing::info!(passages = snapshot.passage_count(), edges = snapshot.edge_count(), "snapshot loaded");
        Arc::new(snapshot)
    } else {
        Arc::new(store)
    };

    cmd_traverse(XrefEngine::with_config(store, config), command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
