mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VESTA_GIT_SHA"),
    ", ",
    env!("VESTA_TARGET"),
    ")"
);

#[derive(Parser)]
#[command(name = "vesta")]
#[command(
    about = "Indicator strategy backtester",
    version,
    long_version = LONG_VERSION,
    arg_required_else_help = true
)]
#[command(
    after_help = "Examples:\n  vesta strategies\n  vesta backtest --config configs/sample.toml\n  vesta backtest --config configs/sample.toml --strategy macd_only --strategy rsi_only\n  vesta analyze --results backtest_results.json\n  vesta export --results backtest_results.json --out results.csv\n"
)]
struct Cli {
    /// Log filter when VESTA_LOG is unset (e.g. info, debug, vesta_application=debug).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: text | json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Serve Prometheus metrics on host:port while the command runs.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// List the available strategies.
    Strategies,
    /// Run strategies over the configured dataset and log each run.
    Backtest {
        #[arg(long)]
        config: PathBuf,
        /// Strategy id to run; repeat to run several. Overrides [strategies] enabled.
        #[arg(long = "strategy")]
        strategies: Vec<String>,
    },
    /// Rank strategies across every logged run.
    Analyze {
        #[arg(long, default_value = "backtest_results.json")]
        results: PathBuf,
    },
    /// Export logged runs to CSV.
    Export {
        #[arg(long, default_value = "backtest_results.json")]
        results: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Empty the results log.
    Clear {
        #[arg(long, default_value = "backtest_results.json")]
        results: PathBuf,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }

    let command = match cli.command {
        CliCommand::Strategies => Command::Strategies,
        CliCommand::Backtest { config, strategies } => Command::Backtest { config, strategies },
        CliCommand::Analyze { results } => Command::Analyze { results },
        CliCommand::Export { results, out } => Command::Export { results, out },
        CliCommand::Clear { results, yes } => Command::Clear { results, yes },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
