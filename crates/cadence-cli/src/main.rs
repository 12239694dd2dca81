mod cmd;
mod context;
mod output;
mod paths;

use cadence_core::Duration;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, schedule::ScheduleSubcommand};
use context::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cadence",
    about = "Calendar-driven Linear maintenance: sweep stale issues, materialize recurring ones",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest cadence.yaml, searching upward)
    #[arg(long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Linear API key or OAuth token
    #[arg(long, global = true, env = "LINEAR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter cadence.yaml
    Init {
        /// Team new recurring issues are filed under
        #[arg(long)]
        team: Option<String>,
    },

    /// Run every configured sweep, then every recurrence
    Run {
        /// Evaluate schedules for this date instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Move stale issues from one workflow state to another
    Sweep {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Staleness threshold, e.g. 2d, 36h, 1w
        #[arg(long)]
        after: Duration,
        /// Maximum simultaneous updates
        #[arg(long, default_value_t = cadence_core::sweep::DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,
    },

    /// Run only the configured recurrences
    Recur {
        /// Evaluate schedules for this date instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List open issues not updated within a threshold (read-only)
    Stale {
        /// Staleness threshold, e.g. 7d
        #[arg(long)]
        after: Duration,
        /// Only look at this workflow state
        #[arg(long)]
        state: Option<String>,
    },

    /// Inspect named schedules
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } | Commands::Sweep { .. } | Commands::Recur { .. } => {
            tracing::Level::INFO
        }
        _ => tracing::Level::WARN,
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), default_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context::new(
        paths::resolve_config(cli.config.as_deref()),
        cli.api_key,
        cli.json,
    );

    let result = match cli.command {
        Commands::Init { team } => cmd::init::run(&ctx, team),
        Commands::Run { date } => cmd::run::run(&ctx, date),
        Commands::Sweep {
            from,
            to,
            after,
            max_concurrency,
        } => cmd::sweep::run(&ctx, from, to, after, max_concurrency),
        Commands::Recur { date } => cmd::run::recur(&ctx, date),
        Commands::Stale { after, state } => cmd::stale::run(&ctx, after, state.as_deref()),
        Commands::Schedule { subcommand } => cmd::schedule::run(&ctx, subcommand),
        Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins outright when set and parseable; otherwise the command's
/// default level applies.
fn log_filter(rust_log: Option<&str>, default_level: tracing::Level) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(default_level.into()))
}
