//! M.I.R.A CLI Entry Point
//!
//! Provides the main command-line interface for M.I.R.A with subcommands:
//! - `mira <query>` / `mira research <query>` - Run the research pipeline
//! - `mira memory list` - List remembered research
//! - `mira memory show <query>` - Show one stored report

use std::sync::Arc;

use clap::CommandFactory;
use owo_colors::OwoColorize;
use parking_lot::RwLock;

use mira::cli::output::Output;
use mira::cli::{Cli, Commands, MemoryCommands};
use mira::config::MiraConfig;
use mira::embedding::{CachingEmbedder, Embedder};
use mira::evidence::EvidenceRetriever;
use mira::memory::MemoryStore;
use mira::research::{ResearchOutcome, RunState, Supervisor};
use mira::search::DuckDuckGoSearch;
use mira::syntax::HeuristicParser;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_tracing(cli.verbose, cli.json);

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let mut config = MiraConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Research { query, no_persist }) => {
            if no_persist {
                config.research.persist_on_completion = false;
            }
            research(&config, &query, cli.json, &output).await
        }
        Some(Commands::Memory(command)) => memory(&config, command, cli.json, &output),
        None => match cli.query {
            Some(query) => research(&config, &query, cli.json, &output).await,
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

/// Logs go to stderr so stdout stays clean for `--json` consumers.
fn init_tracing(verbose: bool, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose { "mira=debug" } else { "mira=info" })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run one research pipeline to completion or exhaustion
async fn research(
    config: &MiraConfig,
    query: &str,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    if !json {
        output.banner();
    }

    let store = Arc::new(RwLock::new(MemoryStore::open(&config.memory.path)?));
    let supervisor = build_supervisor(config, store)?;

    let outcome = supervisor.run(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_outcome(&outcome, output);
    Ok(())
}

/// Wire the pipeline collaborators from configuration
fn build_supervisor(
    config: &MiraConfig,
    store: Arc<RwLock<MemoryStore>>,
) -> anyhow::Result<Supervisor> {
    let backend = config.embedding.create_embedder()?;
    let embedder: Arc<dyn Embedder> = if config.cache.enabled {
        Arc::new(CachingEmbedder::new(backend, config.cache.clone()))
    } else {
        backend
    };

    let retriever = Arc::new(EvidenceRetriever::new(
        Arc::new(DuckDuckGoSearch::new()),
        embedder.clone(),
        config.evidence.clone(),
    ));

    Ok(Supervisor::new(
        retriever,
        Arc::new(HeuristicParser::new()),
        embedder,
        store,
        config,
    ))
}

fn print_outcome(outcome: &ResearchOutcome, output: &Output) {
    output.header("Research Outcome");
    output.kv("Query", &outcome.record.original_query);
    output.kv("State", &outcome.state.to_string());
    if let Some(status) = outcome.record.status {
        output.kv("Status", &status.to_string());
    }
    output.kv("Iterations", &outcome.iterations.to_string());
    output.kv("Duration", &format!("{}ms", outcome.duration_ms));
    output.kv("Run id", &outcome.run_id.to_string());

    output.header("Final Research Summary");
    match &outcome.record.final_summary {
        Some(summary) => output.paragraph(summary),
        None => output.warning("the run produced no summary"),
    }
    output.newline();

    match outcome.state {
        RunState::Completed => output.success("research completed"),
        RunState::Exhausted => output.warning("iteration bound reached before a confident answer"),
        RunState::Running(_) => {}
    }
}

/// Inspect the research memory without running the pipeline
fn memory(
    config: &MiraConfig,
    command: MemoryCommands,
    json: bool,
    output: &Output,
) -> anyhow::Result<()> {
    let store = MemoryStore::open(&config.memory.path)?;

    match command {
        MemoryCommands::List => {
            if json {
                let entries: std::collections::BTreeMap<_, _> = store.iter().collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            output.header("Research Memory");
            if store.is_empty() {
                output.info("no research stored yet");
                return Ok(());
            }
            output.table_header(&["Status", "Query"]);
            for (query, report) in store.iter() {
                let status = report.status.to_string();
                output.table_row(&[status.as_str(), query.as_str()]);
            }
            output.newline();
            output.info(&format!(
                "{} entries in {}",
                store.len(),
                store.path().display()
            ));
        }
        MemoryCommands::Show { query } => {
            let report = store
                .get(&query)
                .ok_or_else(|| anyhow::anyhow!("no stored research for query '{query}'"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(report)?);
                return Ok(());
            }

            output.header(&query);
            output.kv("Status", &report.status.to_string());
            output.newline();
            output.paragraph(&report.final_summary);
        }
    }
    Ok(())
}
