use super::common::{print_config_summary, render_comparison, render_metrics, rule};
use crate::infra::build_engine_deps;
use std::path::PathBuf;
use tracing::info;
use vesta_application::backtesting::run_backtests;
use vesta_application::config::{load_config, Config};
use vesta_domain::services::strategy::{Strategy, StrategyKind};

pub(super) fn run_backtest(config_path: PathBuf, selected: Vec<String>) -> Result<(), String> {
    let config = load_config(&config_path)?;
    print_config_summary("backtest", &config);

    let kinds = select_strategies(&config, &selected)?;
    let strategies: Vec<&dyn Strategy> = kinds.iter().map(|kind| kind as &dyn Strategy).collect();
    info!(
        config = %config_path.display(),
        strategies = kinds.len(),
        "starting backtest"
    );

    let deps = build_engine_deps(&config)?;
    let report = run_backtests(
        &config,
        &strategies,
        deps.market_data.as_ref(),
        deps.results.as_ref(),
        deps.artifacts.as_ref(),
    )?;

    println!(
        "data: {} trading days, {} to {} (fingerprint {})",
        report.data_info.num_days,
        report.data_info.start_date,
        report.data_info.end_date,
        report.fingerprint
    );
    for run in &report.runs {
        println!("\n{}", rule('='));
        println!("STRATEGY: {}", run.strategy_name);
        println!("{}", rule('='));
        print!("{}", render_metrics(&run.results.metrics));
        if let Some(dir) = &run.artifacts_dir {
            println!("  run output: {}", dir.display());
        }
    }

    println!("\n{}", rule('='));
    println!("QUICK COMPARISON");
    println!("{}", rule('='));
    print!("{}", render_comparison(&report.ranked_by_total_return()));
    println!(
        "\n{} run(s) logged to {}",
        report.runs.len(),
        config.results_log_path().display()
    );
    Ok(())
}

/// `--strategy` flags win over `[strategies] enabled`.
fn select_strategies(config: &Config, selected: &[String]) -> Result<Vec<StrategyKind>, String> {
    if selected.is_empty() {
        return config.enabled_strategies();
    }
    let mut kinds = Vec::with_capacity(selected.len());
    for name in selected {
        let kind: StrategyKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use super::{run_backtest, select_strategies};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use vesta_application::config::parse_config;
    use vesta_domain::services::strategy::StrategyKind;

    fn tmp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "vesta_cli_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create tmp dir");
        dir
    }

    const BASE: &str = r#"
[run]
symbol = "SPY"

[data]
source = "synthetic"
start_date = "2022-01-01"
end_date = "2022-12-31"

[strategies]
enabled = ["rsi_only"]
"#;

    #[test]
    fn cli_flags_override_config_selection() {
        let config = parse_config(BASE).expect("config");
        assert_eq!(
            select_strategies(&config, &[]).expect("select"),
            vec![StrategyKind::RsiOnly]
        );
        let picked = select_strategies(
            &config,
            &["macd_only".to_string(), "MACD_ONLY".to_string()],
        )
        .expect("select");
        assert_eq!(picked, vec![StrategyKind::MacdOnly]);
        assert!(select_strategies(&config, &["nope".to_string()]).is_err());
    }

    #[test]
    fn backtest_command_logs_runs_and_writes_artifacts() {
        let dir = tmp_dir("backtest");
        let results = dir.join("results.json");
        let out_dir = dir.join("runs");
        let config_path = dir.join("config.toml");
        let contents = format!(
            "{BASE}\n[paths]\nresults_log = {:?}\nout_dir = {:?}\n",
            results.display().to_string(),
            out_dir.display().to_string()
        );
        fs::write(&config_path, contents).expect("write config");

        run_backtest(config_path, vec!["sma_crossover".to_string()]).expect("backtest");

        let logged: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&results).expect("results log"))
                .expect("json");
        assert_eq!(logged.as_array().map(Vec::len), Some(1));
        assert_eq!(logged[0]["strategy_name"], "sma_crossover");
        assert!(out_dir.join("sma_crossover").join("trades.csv").exists());
        assert!(out_dir.join("sma_crossover").join("equity.csv").exists());
        assert!(out_dir.join("sma_crossover").join("metrics.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
