mod index_config;

use clap::{Args, Parser, Subcommand};
use dualsearch::{CallContext, Document, IndexOptions, LoggingEngine, Query, SearchEngine};
use dualsearch_replication::{ClusterConfig, ReplicatedEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dualsearch", about = "Manage indices and documents on replicated search clusters")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Primary cluster endpoint. Without it, clusters.json in --config-dir is used.
    #[arg(long, env = "DUALSEARCH_PRIMARY_URL")]
    primary: Option<String>,

    /// Secondary cluster endpoint (optional)
    #[arg(long, env = "DUALSEARCH_SECONDARY_URL")]
    secondary: Option<String>,

    /// Per-request timeout for cluster calls
    #[arg(long, env = "DUALSEARCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[arg(long, env = "DUALSEARCH_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Create an index with its settings on every configured cluster
    CreateIndex {
        #[arg(long)]
        index_name: String,
        /// JSON file with settings and mappings (defaults to the built-in mapping)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Delete an index from every configured cluster
    DeleteIndex {
        #[arg(long)]
        index_name: String,
    },
    /// Add or replace a document
    Put {
        #[command(flatten)]
        target: DocumentArgs,
        /// Document body as a JSON object
        #[arg(long)]
        doc: String,
        /// Make the document searchable immediately
        #[arg(long)]
        refresh: bool,
    },
    /// Print a document after checking the clusters agree on it
    Get {
        #[command(flatten)]
        target: DocumentArgs,
    },
    /// Delete a document
    Delete {
        #[command(flatten)]
        target: DocumentArgs,
    },
    /// Search one instance's documents on the primary cluster
    Search {
        #[arg(long)]
        instance: String,
        #[arg(long)]
        query: String,
    },
}

#[derive(Args)]
struct DocumentArgs {
    #[arg(long)]
    instance: String,
    #[arg(long)]
    index: String,
    #[arg(long)]
    entity: String,
    #[arg(long)]
    id: String,
}

fn resolve_cluster_config(cli: &Cli) -> ClusterConfig {
    let mut config = match cli.primary.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(primary) => {
            let config = ClusterConfig::primary_only(primary);
            match cli.secondary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(secondary) => config.with_secondary(secondary),
                None => config,
            }
        }
        None => ClusterConfig::load_or_default(&cli.config_dir),
    };
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    config
}

fn parse_document(raw: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    Ok(Document::from_json(&value)?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_cluster_config(&cli);
    let engine = LoggingEngine::new(ReplicatedEngine::from_config(&config)?);
    let ctx = CallContext::background();

    match cli.command {
        Command::CreateIndex { index_name, config } => {
            let index_config = index_config::load_index_config(config.as_deref())?;
            engine.create_index(&ctx, &index_name, &index_config).await?;
            eprintln!("Index {} ready", index_name);
        }
        Command::DeleteIndex { index_name } => {
            engine.delete_index(&ctx, &index_name).await?;
            eprintln!("Index {} deleted", index_name);
        }
        Command::Put {
            target,
            doc,
            refresh,
        } => {
            let document = parse_document(&doc)?;
            engine
                .put_document(
                    &ctx,
                    &target.instance,
                    &target.index,
                    &target.entity,
                    &target.id,
                    &document,
                    IndexOptions { refresh },
                )
                .await?;
        }
        Command::Get { target } => {
            let document = engine
                .find_document(&ctx, &target.instance, &target.index, &target.entity, &target.id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Delete { target } => {
            engine
                .delete_document(&ctx, &target.instance, &target.index, &target.entity, &target.id)
                .await?;
        }
        Command::Search { instance, query } => {
            let documents = engine.search(&ctx, &instance, &Query::new(query)).await?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use dualsearch_replication::ClusterTarget;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_endpoints_build_pair() {
        let cli = parse_cli(&[
            "dualsearch",
            "--primary",
            "http://a:9200",
            "--secondary",
            "http://b:9200",
            "--timeout-secs",
            "4",
            "delete-index",
            "--index-name",
            "people",
        ]);
        let config = resolve_cluster_config(&cli);
        assert_eq!(config.primary.url, "http://a:9200");
        assert_eq!(config.target(), ClusterTarget::PrimaryAndSecondary);
        assert_eq!(config.timeout_secs, 4);
    }

    #[test]
    fn blank_secondary_is_ignored() {
        let cli = parse_cli(&[
            "dualsearch",
            "--primary",
            "http://a:9200",
            "--secondary",
            "",
            "get",
            "--instance",
            "i",
            "--index",
            "people",
            "--entity",
            "person",
            "--id",
            "1",
        ]);
        assert_eq!(resolve_cluster_config(&cli).target(), ClusterTarget::Primary);
    }

    #[test]
    fn put_requires_doc() {
        assert!(Cli::try_parse_from([
            "dualsearch",
            "put",
            "--instance",
            "i",
            "--index",
            "people",
            "--entity",
            "person",
            "--id",
            "1",
        ])
        .is_err());
    }

    #[test]
    fn parse_document_rejects_non_objects() {
        assert!(parse_document(r#"{"name": "A"}"#).is_ok());
        assert!(parse_document("[1]").is_err());
        assert!(parse_document("{").is_err());
    }
}
