use anyhow::Context;
use clap::{Parser, Subcommand};
use hoist_engine::backend::Bridge;
use hoist_engine::config::{ConfigLoader, HoistConfig};
use hoist_engine::executor::{Invocation, ProjectView, QueryExecutor};
use hoist_engine::fixture::FixtureBridge;
use hoist_engine::query::{Filter, FilterPlacement};
use hoist_engine::serialize::OutputEncoding;
use hoist_jxa::backend::JxaBridge;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hoist",
    version,
    about = "Query Hookmark bookmarks and OmniFocus projects as JSON"
)]
struct Args {
    #[command(subcommand)]
    query: Query,

    /// Config file (defaults to $HOIST_CONFIG, ./hoist.yaml, ~/.hoist/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer queries from a YAML object graph instead of the live applications
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Write the result array encoded as a JSON string
    #[arg(long, global = true)]
    as_string: bool,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Query {
    /// Bookmarks hooked to a document
    Bookmarks {
        /// File path or URL of the document
        address: String,
    },
    /// Projects in an OmniFocus folder, including nested folders
    Projects {
        /// Folder name
        folder: String,

        /// Status filter: none, open, active, on-hold, done, dropped, or a comma separated list
        #[arg(long)]
        filter: Option<Filter>,

        /// Field set: summary or ranked
        #[arg(long)]
        view: Option<ProjectView>,

        /// Filter after fetching instead of inside OmniFocus
        #[arg(long)]
        local_filter: bool,
    },
}

impl Args {
    fn apply(&self, config: &mut HoistConfig) {
        if self.as_string {
            config.output = OutputEncoding::String;
        }
        if let Query::Projects {
            local_filter: true, ..
        } = self.query
        {
            config.projects.filter_placement = FilterPlacement::Local;
        }
    }

    fn invocation(&self) -> Invocation {
        match &self.query {
            Query::Bookmarks { address } => Invocation::Bookmarks {
                address: address.clone(),
            },
            Query::Projects {
                folder,
                filter,
                view,
                ..
            } => Invocation::Projects {
                folder: folder.clone(),
                filter: filter.clone(),
                view: *view,
            },
        }
    }
}

async fn load_config(args: &Args) -> anyhow::Result<HoistConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConfigLoader::load_default()
            .await
            .context("Failed to load config")?,
    };
    args.apply(&mut config);
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging goes to stderr; stdout carries the JSON result only.
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args).await?;
    debug!("{:?}", config);

    let mut bridge: Box<dyn Bridge> = match &args.fixture {
        Some(path) => Box::new(FixtureBridge::from_path(path)),
        None => Box::new(JxaBridge::new(config.jxa.clone())),
    };

    bridge.launch().await.context("Failed to start bridge")?;

    let executor = QueryExecutor::new(config);
    let result = executor.run(&mut *bridge, &args.invocation()).await;

    if let Err(e) = bridge.close().await {
        error!("Failed to close bridge: {}", e);
    }

    let output = result.context("Query failed")?;
    println!("{}", output);
    Ok(())
}
