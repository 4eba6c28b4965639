//! CLI entrypoint for layered-planner
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use planner_application::{CodebaseScanner, DocsFetcher, PlannerConfig, PlannerOrchestrator};
use planner_infrastructure::{
    CodebaseAnalyzer, ConfigLoader, FileConfig, FsArtifactStore, JsonlConversationLogger,
    MarkdownProductSource, ProviderPool, RegistryDocsFetcher, RoutingLlmGateway,
};
use planner_presentation::{Cli, Command, ConsoleFormatter, DocsCommand, PlanRunner, PlanShell};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(&cli.project, cli.config.as_deref());
        return Ok(());
    }

    info!("Starting layered-planner in {}", cli.project.display());

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(&cli.project, cli.config.as_deref())
            .context("Failed to load configuration")?
    };
    file_config
        .validate()
        .context("Invalid configuration")?;

    let mut planner_config = file_config.to_planner_config();
    if let Some(model) = &cli.model {
        planner_config = planner_config.with_model(model.clone());
    }
    let catalog = file_config.catalog();
    if !catalog.model_keys().any(|key| key == planner_config.model) {
        debug!(
            "Model '{}' is not in the catalog; using it as a raw model id",
            planner_config.model
        );
    }

    // === Dependency Injection ===
    let store = Arc::new(FsArtifactStore::new(&cli.project));

    let command = cli.command.clone().unwrap_or(Command::Status);
    match command {
        Command::Analyze { dir } => {
            let analysis = CodebaseAnalyzer::new()
                .analyze(&dir)
                .with_context(|| format!("Failed to analyze {}", dir.display()))?;
            println!("{}", ConsoleFormatter::analysis(&analysis));
            return Ok(());
        }
        Command::Docs { action } => {
            let fetcher = RegistryDocsFetcher::new(store, file_config.docs_settings())
                .context("Failed to build HTTP client")?;
            return run_docs(&fetcher, action).await;
        }
        _ => {}
    }

    let mut orchestrator = build_orchestrator(&cli.project, store, &file_config, planner_config)?;

    match command {
        Command::Shell => {
            let mut shell = PlanShell::new(orchestrator, cli.quiet);
            shell.run().await;
        }
        other => {
            if let Some(plan) = other.plan_command() {
                PlanRunner::new(cli.quiet)
                    .run(&mut orchestrator, plan)
                    .await?;
            }
        }
    }

    Ok(())
}

fn build_orchestrator(
    project: &Path,
    store: Arc<FsArtifactStore>,
    file_config: &FileConfig,
    planner_config: PlannerConfig,
) -> Result<PlannerOrchestrator> {
    let product = Arc::new(MarkdownProductSource::new(store.as_ref().clone()));
    let pool = Arc::new(ProviderPool::new(file_config.catalog()));
    let gateway = Arc::new(RoutingLlmGateway::new(pool));
    let docs = RegistryDocsFetcher::new(store.clone(), file_config.docs_settings())
        .context("Failed to build HTTP client")?;

    let mut orchestrator = PlannerOrchestrator::new(store, product, gateway, planner_config)
        .with_docs_fetcher(Arc::new(docs))
        .with_scanner(Arc::new(CodebaseAnalyzer::new()));

    // Transcripts are per session, so only an existing session gets one
    if file_config.logging.transcript {
        let session_id = orchestrator.session()?.map(|s| s.id.clone());
        if let Some(id) = session_id {
            match JsonlConversationLogger::for_session(project, &id) {
                Some(logger) => {
                    debug!("Transcript: {}", logger.path().display());
                    orchestrator = orchestrator.with_logger(Arc::new(logger));
                }
                None => warn!("Transcript disabled for session {}", id),
            }
        }
    }

    Ok(orchestrator)
}

async fn run_docs(fetcher: &RegistryDocsFetcher, action: DocsCommand) -> Result<()> {
    match action {
        DocsCommand::List => {
            let names = fetcher.list_cached()?;
            println!("{}", ConsoleFormatter::docs_list(&names));
        }
        DocsCommand::Fetch { name, registry } => match fetcher.fetch(&name, registry.into()).await {
            Some(path) => println!("Cached {} at {}", name, path),
            None => println!(
                "{}",
                ConsoleFormatter::error(&format!("No documentation fetched for {}", name))
            ),
        },
        DocsCommand::Clear { name } => {
            let removed = fetcher.clear(name.as_deref())?;
            println!("Removed {} cached doc set(s)", removed);
        }
    }
    Ok(())
}
