use clap::{Args, Parser, Subcommand, ValueEnum};
use secnews_core::{AppConfig, FetchMode};
use secnews_digest::{DigestPipeline, RunOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "secnews-cli")]
#[command(about = "DACH security news digest for Slack")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, summarize and post today's digest once.
    Run(RunArgs),
    /// Print the rendered digest to stdout instead of posting it.
    Preview(RunArgs),
}

/// Per-invocation overrides on top of the environment config.
#[derive(Debug, Args, Default)]
struct RunArgs {
    /// Maximum number of news items.
    #[arg(long)]
    max_items: Option<usize>,

    /// Upstream endpoint shape used to fetch news.
    #[arg(long, value_enum)]
    fetch_mode: Option<ModeArg>,

    /// Post cleaned excerpts instead of model summaries.
    #[arg(long)]
    no_summarize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Search,
    Chat,
}

impl From<ModeArg> for FetchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Search => FetchMode::Search,
            ModeArg::Chat => FetchMode::Chat,
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(max_items) = self.max_items {
            anyhow::ensure!(max_items > 0, "--max-items must be at least 1");
            config.max_items = max_items;
        }
        if let Some(mode) = self.fetch_mode {
            config.fetch_mode = mode.into();
        }
        if self.no_summarize {
            config.summarize = false;
        }
        Ok(())
    }
}

/// Maps a run outcome to the process result; only a failed run is an error.
///
/// The outcome itself is already logged by the pipeline.
fn finish_run(outcome: RunOutcome) -> anyhow::Result<()> {
    match outcome {
        RunOutcome::Failed(e) => Err(e.into()),
        outcome => {
            tracing::info!(outcome = %outcome, "run finished");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = secnews_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so `preview` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => {
            args.apply(&mut config)?;
            let pipeline = DigestPipeline::from_config(&config)?;
            finish_run(pipeline.run().await)?;
        }
        Commands::Preview(args) => {
            args.apply(&mut config)?;
            let pipeline = DigestPipeline::from_config(&config)?;
            match pipeline.compose().await? {
                Some(digest) => println!("{}", digest.message),
                None => tracing::info!("no news items to preview"),
            }
        }
    }

    Ok(())
}
