use std::fmt::Write as _;
use vesta_application::backtesting::StrategyRun;
use vesta_application::config::{Config, DataSource};
use vesta_application::meta::engine_name;
use vesta_domain::entities::metrics::MetricsSnapshot;

const RULE_WIDTH: usize = 70;

pub(super) fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

pub(super) fn print_config_summary(command: &str, config: &Config) {
    println!(
        "{} cli: {} (symbol={}, initial_capital={})",
        engine_name(),
        command,
        config.run.symbol,
        config.run.initial_capital
    );
    let window = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.to_string())
            .unwrap_or_else(|| "open".to_string())
    };
    match config.data.source {
        DataSource::Synthetic => println!(
            "data: source=synthetic, start={}, end={}, initial_price={}, seed={}",
            window(config.data.start_date),
            window(config.data.end_date),
            config.data.initial_price(),
            config.data.seed()
        ),
        DataSource::Csv => println!(
            "data: source=csv, path={}, start={}, end={}",
            config.data.csv_path.as_deref().unwrap_or("none"),
            window(config.data.start_date),
            window(config.data.end_date)
        ),
    }
    println!(
        "costs: commission_rate={}, base_slippage_rate={}",
        config.costs.commission_rate, config.costs.base_slippage_rate
    );
    println!(
        "paths: results_log={}, out_dir={}",
        config.paths.results_log,
        config.paths.out_dir.as_deref().unwrap_or("none")
    );
}

/// Full metric block for one run.
pub(super) fn render_metrics(m: &MetricsSnapshot) -> String {
    let mut out = String::new();
    let rows: [(&str, String); 29] = [
        ("Total Return:", format!("{:>10.2}%", m.total_return_pct)),
        ("Annual Return:", format!("{:>10.2}%", m.annual_return_pct)),
        ("Final Equity:", format!("${:>10.2}", m.final_equity)),
        ("Sharpe Ratio:", format!("{:>10.2}", m.sharpe_ratio)),
        ("Sortino Ratio:", format!("{:>10.2}", m.sortino_ratio)),
        ("Calmar Ratio:", format!("{:>10.2}", m.calmar_ratio)),
        ("Max Drawdown:", format!("{:>10.2}%", m.max_drawdown_pct)),
        ("Avg Drawdown:", format!("{:>10.2}%", m.avg_drawdown_pct)),
        ("Max DD Duration (days):", format!("{:>10}", m.max_drawdown_duration)),
        ("Ulcer Index:", format!("{:>10.2}", m.ulcer_index)),
        ("Recovery Factor:", format!("{:>10.2}", m.recovery_factor)),
        ("Number of Trades:", format!("{:>10}", m.num_trades)),
        ("Winning Trades:", format!("{:>10}", m.num_wins)),
        ("Losing Trades:", format!("{:>10}", m.num_losses)),
        ("Win Rate:", format!("{:>10.2}%", m.win_rate_pct)),
        ("Avg Win:", format!("${:>10.2}", m.avg_win)),
        ("Avg Loss:", format!("${:>10.2}", m.avg_loss)),
        ("Max Win:", format!("${:>10.2}", m.max_win)),
        ("Max Loss:", format!("${:>10.2}", m.max_loss)),
        ("Profit Factor:", format!("{:>10.2}", m.profit_factor)),
        ("Payoff Ratio:", format!("{:>10.2}", m.payoff_ratio)),
        ("Expectancy:", format!("${:>10.2}", m.expectancy)),
        ("Avg Trade Duration:", format!("{:>10.2} days", m.avg_trade_duration_days)),
        ("Max Trade Duration:", format!("{:>10} days", m.max_trade_duration_days)),
        ("Min Trade Duration:", format!("{:>10} days", m.min_trade_duration_days)),
        ("Max Consecutive Wins:", format!("{:>10}", m.max_consecutive_wins)),
        ("Max Consecutive Losses:", format!("{:>10}", m.max_consecutive_losses)),
        ("Kelly Criterion:", format!("{:>10.2}%", m.kelly_pct)),
        ("Exposure Time:", format!("{:>10.2}%", m.exposure_time_pct)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<26}{}", label, value);
    }
    out
}

/// One line per run, best total return first.
pub(super) fn render_comparison(runs: &[&StrategyRun]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22}{:>10}{:>9}{:>9}{:>8}{:>8}{:>9}{:>14}",
        "Strategy", "Return%", "Sharpe", "Sortino", "Trades", "Win%", "MaxDD%", "ProfitFactor"
    );
    let _ = writeln!(out, "{}", rule('-'));
    for run in runs {
        let m = &run.results.metrics;
        let _ = writeln!(
            out,
            "{:<22}{:>10.2}{:>9.2}{:>9.2}{:>8}{:>8.2}{:>9.2}{:>14.2}",
            run.strategy_name,
            m.total_return_pct,
            m.sharpe_ratio,
            m.sortino_ratio,
            m.num_trades,
            m.win_rate_pct,
            m.max_drawdown_pct,
            m.profit_factor
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_metrics;
    use vesta_domain::entities::metrics::{MetricsSnapshot, METRIC_NAMES};

    #[test]
    fn metric_block_has_a_line_per_metric() {
        let mut metrics = MetricsSnapshot::empty(10_000.0);
        metrics.total_return_pct = 12.345;
        metrics.num_trades = 4;
        let rendered = render_metrics(&metrics);
        assert_eq!(rendered.lines().count(), METRIC_NAMES.len());
        assert!(rendered.contains("Total Return:"));
        assert!(rendered.contains("12.35%") || rendered.contains("12.34%"));
        assert!(rendered.contains("$  10000.00"));
    }
}
