use super::common::rule;
use crate::infra::build_results_repo;
use std::fmt::Write as _;
use std::path::PathBuf;
use vesta_application::analysis::{analyze_history, HistoryAnalysis};

pub(super) fn run_analyze(results: PathBuf) -> Result<(), String> {
    let repo = build_results_repo(&results)?;
    let analysis = analyze_history(repo.as_ref())?;
    print!("{}", render_analysis(&analysis));
    Ok(())
}

fn render_analysis(analysis: &HistoryAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total tests in database: {}", analysis.total_runs);
    if analysis.total_runs == 0 {
        let _ = writeln!(out, "No results logged yet. Run `vesta backtest` first.");
        return out;
    }
    let _ = writeln!(out, "Strategies tested: {}", analysis.strategies.join(", "));

    for ranking in &analysis.rankings {
        let _ = writeln!(out, "\n{}", rule('='));
        let _ = writeln!(out, "RANKING BY: {}", ranking.label);
        let _ = writeln!(out, "{}", rule('='));
        let _ = writeln!(
            out,
            "{:<22}{:>10}{:>10}{:>8}{:>10}{:>10}",
            "strategy", "avg", "std_dev", "tests", "min", "max"
        );
        for row in &ranking.rows {
            let std_dev = row
                .std_dev
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<22}{:>10.2}{:>10}{:>8}{:>10.2}{:>10.2}",
                row.strategy, row.avg, std_dev, row.num_tests, row.min, row.max
            );
        }
    }

    if let Some(best) = &analysis.best {
        let _ = writeln!(out, "\n{}", rule('='));
        let _ = writeln!(out, "BEST STRATEGY OVERALL: {}", best.strategy);
        let _ = writeln!(out, "{}", rule('='));
        let _ = writeln!(out, "Average total return: {:.2}%", best.avg);
        let _ = writeln!(out, "Runs:");
        for (i, run) in best.runs.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} - Return: {:.2}%, Sharpe: {:.2}, Trades: {}",
                i + 1,
                run.timestamp.format("%Y-%m-%dT%H:%M:%S"),
                run.metrics.total_return_pct,
                run.metrics.sharpe_ratio,
                run.metrics.num_trades
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_analysis;
    use chrono::{TimeZone, Utc};
    use vesta_application::analysis::analyze_history;
    use vesta_domain::entities::metrics::MetricsSnapshot;
    use vesta_domain::entities::run_record::RunRecord;
    use vesta_domain::repositories::results::ResultsRepository;
    use vesta_infrastructure::results::FilesystemResultsStore;

    fn record(strategy: &str, total_return: f64) -> RunRecord {
        let mut metrics = MetricsSnapshot::empty(10_000.0);
        metrics.total_return_pct = total_return;
        metrics.num_trades = 3;
        RunRecord::new(
            Utc.with_ymd_and_hms(2024, 3, 4, 15, 30, 12)
                .single()
                .expect("ts"),
            strategy,
            metrics,
            None,
        )
    }

    #[test]
    fn renders_rankings_and_best_strategy() {
        let path = std::env::temp_dir().join(format!(
            "vesta_cli_analyze_{}.json",
            std::process::id()
        ));
        let store = FilesystemResultsStore::open(&path).expect("store");
        store.clear().expect("clear");
        store.save(&record("rsi_only", 4.0)).expect("save");
        store.save(&record("macd_only", 9.5)).expect("save");

        let rendered = render_analysis(&analyze_history(&store).expect("analysis"));
        assert!(rendered.contains("Total tests in database: 2"));
        assert!(rendered.contains("RANKING BY: Total Return %"));
        assert!(rendered.contains("BEST STRATEGY OVERALL: macd_only"));
        assert!(rendered.contains("1. 2024-03-04T15:30:12 - Return: 9.50%, Sharpe: 0.00, Trades: 3"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_log_renders_hint() {
        let path = std::env::temp_dir().join(format!(
            "vesta_cli_analyze_empty_{}.json",
            std::process::id()
        ));
        let store = FilesystemResultsStore::new(&path);
        let rendered = render_analysis(&analyze_history(&store).expect("analysis"));
        assert!(rendered.contains("Total tests in database: 0"));
        assert!(!rendered.contains("RANKING BY"));
    }
}
