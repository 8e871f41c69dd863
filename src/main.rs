//! newslens CLI: perspective mining over dual-annotated news articles.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use newslens::batch::{self, BatchOptions, PipelineKind};
use newslens::config::LinkConfig;
use newslens::store::Store;
use newslens::store::durable::DurableStore;
use newslens::store::mem::MemStore;

#[derive(Parser)]
#[command(name = "newslens", version, about = "Perspective mining engine")]
struct Cli {
    /// Data directory for persistent storage.
    #[arg(long, global = true, default_value = "newslens-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory.
    Init,

    /// Process a directory pair of annotation sources.
    Ingest {
        /// Directory of flat token tables (.conll).
        #[arg(long)]
        table_dir: PathBuf,

        /// Directory of hierarchical annotation documents (.naf).
        #[arg(long)]
        naf_dir: PathBuf,

        /// Eligible-frame list (one label per line).
        #[arg(long)]
        frames: PathBuf,

        /// Document metadata table (TSV: stem, url, ..., publisher, author).
        #[arg(long)]
        metadata: PathBuf,

        /// Assembly variant.
        #[arg(long, value_enum, default_value = "span")]
        pipeline: Pipeline,

        /// Optional TOML file overriding similarity thresholds.
        #[arg(long)]
        link_config: Option<PathBuf>,

        /// Extract documents on parallel workers.
        #[arg(long)]
        parallel: bool,

        /// Process into an in-memory store and discard the results
        /// (reports counts only).
        #[arg(long)]
        dry_run: bool,
    },

    /// List ingested documents.
    List,

    /// Export every stored record for one document as JSON.
    Export {
        /// Document stem.
        stem: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Pipeline {
    /// Predicate-centric exact span containment.
    Span,
    /// Claim-centric similarity joins.
    Fuzzy,
}

impl From<Pipeline> for PipelineKind {
    fn from(p: Pipeline) -> Self {
        match p {
            Pipeline::Span => PipelineKind::Span,
            Pipeline::Fuzzy => PipelineKind::Fuzzy,
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            DurableStore::open(&cli.data_dir)?;
            println!("initialized data directory at {}", cli.data_dir.display());
            Ok(())
        }

        Commands::Ingest {
            table_dir,
            naf_dir,
            frames,
            metadata,
            pipeline,
            link_config,
            parallel,
            dry_run,
        } => {
            let pairs = batch::pair_inputs(&table_dir, &naf_dir)?;
            let frames = batch::load_frames(&frames)?;
            let metadata = batch::load_metadata(&metadata)?;
            let link = match link_config {
                Some(path) => LinkConfig::from_path(&path)?,
                None => LinkConfig::default(),
            };
            let options = BatchOptions {
                pipeline: pipeline.into(),
                link,
                parallel,
            };

            let summary = if dry_run {
                let store = MemStore::new();
                batch::run(&store, &pairs, &frames, &metadata, &options)?
            } else {
                let store = DurableStore::open(&cli.data_dir)?;
                batch::run(&store, &pairs, &frames, &metadata, &options)?
            };

            println!(
                "{} document(s) committed, {} skipped, {} perspective(s), {:.2}s",
                summary.documents,
                summary.skipped,
                summary.perspectives,
                summary.elapsed.as_secs_f64()
            );
            Ok(())
        }

        Commands::List => {
            let store = DurableStore::open(&cli.data_dir)?;
            let documents = store.documents()?;
            if documents.is_empty() {
                println!("no documents ingested");
            }
            for (id, doc) in documents {
                println!("{id}\t{}\t{}", doc.name, doc.publisher);
            }
            Ok(())
        }

        Commands::Export { stem } => {
            let store = DurableStore::open(&cli.data_dir)?;
            match store.export_document(&stem)? {
                Some(export) => {
                    let json = serde_json::to_string_pretty(&export).into_diagnostic()?;
                    println!("{json}");
                    Ok(())
                }
                None => Err(miette::miette!("document not found: \"{stem}\"")),
            }
        }
    }
}
