use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::info_span;
use vesta_domain::entities::metrics::METRIC_NAMES;
use vesta_domain::entities::run_record::RunRecord;
use vesta_domain::repositories::results::ResultsRepository;

pub const DEFAULT_METRIC: &str = "total_return_pct";

/// Metrics ranked by `analyze`, with their display labels.
pub const RANKED_METRICS: [(&str, &str); 6] = [
    ("total_return_pct", "Total Return %"),
    ("sharpe_ratio", "Sharpe Ratio"),
    ("sortino_ratio", "Sortino Ratio"),
    ("win_rate_pct", "Win Rate %"),
    ("profit_factor", "Profit Factor"),
    ("max_drawdown_pct", "Max Drawdown %"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyComparison {
    pub strategy: String,
    pub avg: f64,
    /// Sample standard deviation; undefined for a single run.
    pub std_dev: Option<f64>,
    pub num_tests: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRanking {
    pub metric: &'static str,
    pub label: &'static str,
    pub rows: Vec<StrategyComparison>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestStrategy {
    pub strategy: String,
    pub avg: f64,
    pub runs: Vec<RunRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryAnalysis {
    pub total_runs: usize,
    pub strategies: Vec<String>,
    pub rankings: Vec<MetricRanking>,
    pub best: Option<BestStrategy>,
}

pub fn ensure_known_metric(metric: &str) -> Result<&'static str, String> {
    METRIC_NAMES
        .iter()
        .copied()
        .find(|name| *name == metric)
        .ok_or_else(|| format!("unknown metric '{metric}'"))
}

pub fn results_by_strategy<'a>(records: &'a [RunRecord], strategy: &str) -> Vec<&'a RunRecord> {
    records
        .iter()
        .filter(|record| record.strategy_name == strategy)
        .collect()
}

pub fn unique_strategies(records: &[RunRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .map(|record| record.strategy_name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Per-strategy aggregate of one metric, best average first.
pub fn compare_strategies(
    records: &[RunRecord],
    metric: &str,
) -> Result<Vec<StrategyComparison>, String> {
    let metric = ensure_known_metric(metric)?;

    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        let value = record
            .metrics
            .metric(metric)
            .ok_or_else(|| format!("unknown metric '{metric}'"))?;
        grouped
            .entry(record.strategy_name.as_str())
            .or_default()
            .push(value);
    }

    let mut rows: Vec<StrategyComparison> = grouped
        .into_iter()
        .map(|(strategy, values)| summarize(strategy, &values))
        .collect();
    rows.sort_by(|a, b| b.avg.total_cmp(&a.avg));
    Ok(rows)
}

pub fn best_strategy(
    records: &[RunRecord],
    metric: &str,
    min_tests: usize,
) -> Result<Option<(String, f64)>, String> {
    Ok(compare_strategies(records, metric)?
        .into_iter()
        .find(|row| row.num_tests >= min_tests)
        .map(|row| (row.strategy, row.avg)))
}

pub fn analyze_history(results_repo: &dyn ResultsRepository) -> Result<HistoryAnalysis, String> {
    let _span = info_span!("analyze_history").entered();
    let stage_start = Instant::now();

    let records = results_repo.load_all()?;
    let mut rankings = Vec::with_capacity(RANKED_METRICS.len());
    for (metric, label) in RANKED_METRICS {
        rankings.push(MetricRanking {
            metric,
            label,
            rows: compare_strategies(&records, metric)?,
        });
    }

    let best = best_strategy(&records, DEFAULT_METRIC, 1)?.map(|(strategy, avg)| {
        let runs = results_by_strategy(&records, &strategy)
            .into_iter()
            .cloned()
            .collect();
        BestStrategy {
            strategy,
            avg,
            runs,
        }
    });
    metrics::histogram!("vesta.analysis.analyze_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    Ok(HistoryAnalysis {
        total_runs: records.len(),
        strategies: unique_strategies(&records),
        rankings,
        best,
    })
}

/// Writes one row per run: timestamp, strategy, then every metric column.
/// Returns the number of rows written.
pub fn export_csv(records: &[RunRecord], path: &Path) -> Result<usize, String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create csv {}: {}", path.display(), err))?;

    let mut header = vec!["timestamp", "strategy"];
    header.extend(METRIC_NAMES.iter().copied());
    writer
        .write_record(&header)
        .map_err(|err| format!("failed to write csv header {}: {}", path.display(), err))?;

    for record in records {
        let values = serde_json::to_value(&record.metrics)
            .map_err(|err| format!("failed to serialize metrics: {err}"))?;
        let mut row = vec![record.timestamp.to_rfc3339(), record.strategy_name.clone()];
        for name in METRIC_NAMES {
            row.push(values.get(name).map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&row)
            .map_err(|err| format!("failed to write csv row {}: {}", path.display(), err))?;
    }

    writer
        .flush()
        .map_err(|err| format!("failed to flush csv {}: {}", path.display(), err))?;
    Ok(records.len())
}

fn summarize(strategy: &str, values: &[f64]) -> StrategyComparison {
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let std_dev = (values.len() > 1).then(|| {
        let var = values.iter().map(|v| (v - avg) * (v - avg)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    });
    StrategyComparison {
        strategy: strategy.to_string(),
        avg,
        std_dev,
        num_tests: values.len(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
