//! BookWise CLI - book summaries and learning recommendations
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use bookwise::logging::{self, LogDestination};
use bookwise::{
    display, ui, Config, Flow, FlowController, FlowState, FlowStatus, GeminiGateway, ModelGateway,
    Recommend, Summarize,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bookwise")]
#[command(author, version, about = "TUI for AI book summaries and learning recommendations", long_about = None)]
struct Cli {
    /// Path to a config file (defaults to bookwise.toml in cwd or ~/.config/bookwise)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a book by title
    Summarise {
        /// Book title
        title: String,
    },
    /// Recommend books, websites and courses for a topic
    Recommend {
        /// Topic of interest
        topic: String,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "bookwise", &mut std::io::stdout());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    // A missing key is fatal before any flow exists
    let api_key = config.api_key()?;

    let destination = match cli.command {
        None => LogDestination::File(&config.log.file),
        Some(_) => LogDestination::Stderr,
    };
    logging::initialize(destination, &config.log.level);
    log::info!("using model {}", config.agent.model);

    let gateway: Arc<dyn ModelGateway> = Arc::new(GeminiGateway::from_config(&config, api_key)?);
    let summarize = FlowController::new(Summarize::new(config.summary_mode()), gateway.clone());
    let recommend = FlowController::new(Recommend, gateway);

    match cli.command {
        Some(Commands::Summarise { title }) => {
            println!("Summarising: {}\n", title.trim());
            let state = run_once(&summarize, &title).await?;
            if let (Some(query), Some(summary)) = (&state.query, &state.result) {
                display::print_summary(query, summary);
            }
        }
        Some(Commands::Recommend { topic }) => {
            println!("Finding resources for: {}\n", topic.trim());
            let state = run_once(&recommend, &topic).await?;
            if let (Some(query), Some(set)) = (&state.query, &state.result) {
                display::print_recommendations(query, set);
            }
        }
        // Handled before config loading
        Some(Commands::Completions { .. }) => {}
        None => {
            // Default: Launch the TUI. It blocks this thread on terminal
            // input while the flows run on the runtime's workers.
            ui::run(summarize, recommend)?;
        }
    }

    Ok(())
}

/// Submit once and wait for the flow to settle
async fn run_once<F: Flow>(
    controller: &FlowController<F>,
    input: &str,
) -> anyhow::Result<FlowState<F::Output>> {
    let Some(handle) = controller.submit(input) else {
        anyhow::bail!("input must not be empty");
    };
    handle.await?;

    let state = controller.state();
    if state.status == FlowStatus::Failed {
        anyhow::bail!("{}", F::FAILURE_MESSAGE);
    }
    Ok(state)
}
