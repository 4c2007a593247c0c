use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use vesta_domain::repositories::market_data::{MarketDataQuery, MarketDataRepository};
use vesta_domain::value_objects::price_bar::PriceBar;

#[derive(Debug, Deserialize)]
pub struct OhlcvRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily bars from a `date,open,high,low,close,volume` CSV file.
#[derive(Debug, Clone)]
pub struct CsvMarketData {
    path: PathBuf,
}

impl CsvMarketData {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarketDataRepository for CsvMarketData {
    fn load_bars(&self, query: &MarketDataQuery) -> Result<Vec<PriceBar>, String> {
        let stage_start = Instant::now();
        let bars: Vec<PriceBar> = load_csv(&self.path)?
            .into_iter()
            .filter(|bar| query.contains(bar.timestamp))
            .collect();
        info!(
            path = %self.path.display(),
            symbol = %query.symbol,
            rows = bars.len(),
            "loaded OHLCV CSV"
        );
        metrics::histogram!("vesta.market_data.csv_load_ms")
            .record(stage_start.elapsed().as_millis() as f64);
        Ok(bars)
    }
}

pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, String> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open OHLCV CSV {}: {}", path.display(), err))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars: Vec<PriceBar> = Vec::new();
    for (idx, result) in reader.deserialize::<OhlcvRecord>().enumerate() {
        // Row 1 is the header.
        let row = idx + 2;
        let record = result.map_err(|err| {
            format!("failed to parse CSV row {} in {}: {}", row, path.display(), err)
        })?;
        let bar = parse_record(&record).map_err(|err| {
            format!("invalid OHLCV row {} in {}: {}", row, path.display(), err)
        })?;

        if let Some(prev) = bars.last() {
            if bar.timestamp <= prev.timestamp {
                return Err(format!(
                    "invalid OHLCV row {} in {}: date {} does not follow {}",
                    row,
                    path.display(),
                    bar.timestamp,
                    prev.timestamp
                ));
            }
        }
        bars.push(bar);
    }

    Ok(bars)
}

fn parse_record(record: &OhlcvRecord) -> Result<PriceBar, String> {
    let timestamp = parse_date(&record.date)?;

    for (name, value) in [
        ("open", record.open),
        ("high", record.high),
        ("low", record.low),
        ("close", record.close),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("{name} must be finite and > 0 (got {value})"));
        }
    }
    if record.high < record.low {
        return Err(format!(
            "high {} is below low {}",
            record.high, record.low
        ));
    }
    if record.close > record.high || record.close < record.low {
        return Err(format!(
            "close {} is outside [{}, {}]",
            record.close, record.low, record.high
        ));
    }
    if !record.volume.is_finite() || record.volume < 0.0 {
        return Err(format!("volume must be finite and >= 0 (got {})", record.volume));
    }

    Ok(PriceBar {
        timestamp,
        open: record.open,
        high: record.high,
        low: record.low,
        close: record.close,
        volume: record.volume.round() as u64,
        volatility: None,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    // Accept a trailing time component as written by spreadsheet exports.
    let date_part = trimmed.split([' ', 'T']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| format!("unsupported date format: {}", value))
}
