use crate::config::Config;
use crate::shared::{
    config_snapshot_json, data_info_from_bars, dataset_fingerprint, metrics_meta_json,
};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span, warn};
use vesta_domain::entities::metrics::{MetricsCalculator, MetricsConfig};
use vesta_domain::entities::run_record::{DataInfo, RunRecord};
use vesta_domain::repositories::artifacts::ArtifactWriter;
use vesta_domain::repositories::market_data::MarketDataRepository;
use vesta_domain::repositories::results::ResultsRepository;
use vesta_domain::services::engine::backtest::{self, BacktestResults};
use vesta_domain::services::indicators::IndicatorFrame;
use vesta_domain::services::quality::data_quality_from_bars;
use vesta_domain::services::strategy::Strategy;
use vesta_domain::value_objects::price_bar::PriceBar;

/// Bars with indicators attached, shared by every strategy of one invocation.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub frame: IndicatorFrame,
    pub bars: Vec<PriceBar>,
    pub data_info: DataInfo,
    pub fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub strategy_name: String,
    pub results: BacktestResults,
    pub artifacts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub data_info: DataInfo,
    pub fingerprint: String,
    pub runs: Vec<StrategyRun>,
}

impl BacktestReport {
    /// Runs ordered by total return, best first.
    pub fn ranked_by_total_return(&self) -> Vec<&StrategyRun> {
        let mut ranked: Vec<&StrategyRun> = self.runs.iter().collect();
        ranked.sort_by(|a, b| {
            b.results
                .metrics
                .total_return_pct
                .total_cmp(&a.results.metrics.total_return_pct)
        });
        ranked
    }
}

pub fn prepare_dataset(
    config: &Config,
    market_data: &dyn MarketDataRepository,
) -> Result<PreparedDataset, String> {
    let _span = info_span!("prepare_dataset", symbol = %config.run.symbol).entered();

    let stage_start = Instant::now();
    let raw = market_data.load_bars(&config.market_data_query())?;
    metrics::histogram!("vesta.backtest.load_bars_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let report = data_quality_from_bars(&raw);
    report
        .ensure_clean()
        .map_err(|err| format!("market data for {} rejected: {}", config.run.symbol, err))?;
    if let Some(max_gap) = report.max_gap_days.filter(|gap| *gap > 5) {
        warn!(max_gap_days = max_gap, "market data has a long calendar gap");
    }

    let stage_start = Instant::now();
    let frame = IndicatorFrame::prepare(&raw);
    metrics::histogram!("vesta.backtest.indicators_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let bars = frame.bars();
    let Some(data_info) = data_info_from_bars(&config.run.symbol, &bars) else {
        return Err(format!(
            "not enough market data for {}: {} bars loaded, none left after indicator warm-up",
            config.run.symbol,
            raw.len()
        ));
    };
    let fingerprint = dataset_fingerprint(&bars);
    info!(
        raw_bars = raw.len(),
        prepared_bars = bars.len(),
        start = %data_info.start_date,
        end = %data_info.end_date,
        fingerprint = %fingerprint,
        "dataset prepared"
    );

    Ok(PreparedDataset {
        frame,
        bars,
        data_info,
        fingerprint,
    })
}

/// Simulates one strategy on a prepared dataset, then persists the snapshot
/// and (when configured) the run artifacts.
pub fn run_strategy(
    config: &Config,
    dataset: &PreparedDataset,
    strategy: &dyn Strategy,
    results_repo: &dyn ResultsRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<StrategyRun, String> {
    let _span = info_span!("run_backtest", strategy = %strategy.name()).entered();

    let signals = strategy.signals(&dataset.frame);
    let calculator = MetricsCalculator::new(MetricsConfig::default());

    let stage_start = Instant::now();
    let results = backtest::run_backtest(
        &dataset.bars,
        &signals,
        config.simulation_config(),
        &calculator,
    )
    .map_err(|err| format!("backtest {} failed: {}", strategy.name(), err))?;
    metrics::histogram!("vesta.backtest.simulate_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    metrics::counter!("vesta.backtest.runs_total").increment(1);
    metrics::counter!("vesta.backtest.trades_total").increment(results.trades.len() as u64);

    info!(
        trades = results.trades.len(),
        total_return_pct = results.metrics.total_return_pct,
        sharpe_ratio = results.metrics.sharpe_ratio,
        final_equity = results.metrics.final_equity,
        "backtest finished"
    );

    let record = RunRecord::new(
        Utc::now(),
        strategy.name(),
        results.metrics.clone(),
        Some(dataset.data_info.clone()),
    );
    results_repo.save(&record)?;

    let artifacts_dir = match config.out_dir() {
        Some(base_dir) => {
            let run_dir = base_dir.join(strategy.name());
            write_outputs(config, dataset, strategy.name(), &run_dir, &results, artifacts)?;
            Some(run_dir)
        }
        None => None,
    };

    Ok(StrategyRun {
        strategy_name: strategy.name().to_string(),
        results,
        artifacts_dir,
    })
}

pub fn run_backtests(
    config: &Config,
    strategies: &[&dyn Strategy],
    market_data: &dyn MarketDataRepository,
    results_repo: &dyn ResultsRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<BacktestReport, String> {
    if strategies.is_empty() {
        return Err("no strategies selected".to_string());
    }

    let dataset = prepare_dataset(config, market_data)?;
    let mut runs = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        runs.push(run_strategy(
            config,
            &dataset,
            *strategy,
            results_repo,
            artifacts,
        )?);
    }

    Ok(BacktestReport {
        data_info: dataset.data_info,
        fingerprint: dataset.fingerprint,
        runs,
    })
}

fn write_outputs(
    config: &Config,
    dataset: &PreparedDataset,
    strategy_name: &str,
    run_dir: &std::path::Path,
    results: &BacktestResults,
    artifacts: &dyn ArtifactWriter,
) -> Result<(), String> {
    artifacts.ensure_dir(run_dir)?;
    artifacts.write_trades_csv(run_dir.join("trades.csv").as_path(), &results.trades)?;
    artifacts.write_equity_csv(run_dir.join("equity.csv").as_path(), &results.equity)?;

    let mut meta = metrics_meta_json(strategy_name, &dataset.data_info, &dataset.fingerprint);
    if let Some(object) = meta.as_object_mut() {
        object.insert("config".to_string(), config_snapshot_json(config));
    }
    artifacts.write_metrics_json(
        run_dir.join("metrics.json").as_path(),
        &results.metrics,
        Some(&meta),
    )
}
