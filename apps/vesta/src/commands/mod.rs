mod analyze;
mod backtest;
mod common;
mod history;
mod strategies;

use std::path::PathBuf;

pub enum Command {
    Strategies,
    Backtest {
        config: PathBuf,
        strategies: Vec<String>,
    },
    Analyze {
        results: PathBuf,
    },
    Export {
        results: PathBuf,
        out: PathBuf,
    },
    Clear {
        results: PathBuf,
        yes: bool,
    },
}

pub fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Strategies => strategies::run_strategies(),
        Command::Backtest { config, strategies } => backtest::run_backtest(config, strategies),
        Command::Analyze { results } => analyze::run_analyze(results),
        Command::Export { results, out } => history::run_export(results, out),
        Command::Clear { results, yes } => history::run_clear(results, yes),
    }
}
