use crate::reporting;
use std::fs;
use std::path::Path;
use vesta_domain::entities::metrics::MetricsSnapshot;
use vesta_domain::repositories::artifacts::ArtifactWriter;
use vesta_domain::value_objects::equity_point::EquityPoint;
use vesta_domain::value_objects::trade_record::TradeRecord;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        fs::create_dir_all(path)
            .map_err(|err| format!("failed to create dir {}: {}", path.display(), err))
    }

    fn write_trades_csv(&self, path: &Path, trades: &[TradeRecord]) -> Result<(), String> {
        reporting::write_trades_csv(path, trades)
    }

    fn write_equity_csv(&self, path: &Path, points: &[EquityPoint]) -> Result<(), String> {
        reporting::write_equity_csv(path, points)
    }

    fn write_metrics_json(
        &self,
        path: &Path,
        metrics: &MetricsSnapshot,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String> {
        reporting::write_metrics_json(path, metrics, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::FilesystemArtifactWriter;
    use crate::reporting::{read_equity_csv, read_trades_csv};
    use chrono::NaiveDate;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};
    use vesta_domain::entities::metrics::MetricsSnapshot;
    use vesta_domain::repositories::artifacts::ArtifactWriter;
    use vesta_domain::value_objects::equity_point::EquityPoint;
    use vesta_domain::value_objects::side::Side;
    use vesta_domain::value_objects::trade_record::{CloseReason, TradeRecord};

    #[test]
    fn writes_run_artifacts() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir()
            .join(format!("vesta_artifacts_{}_{}", std::process::id(), now))
            .join("rsi_only");
        let writer = FilesystemArtifactWriter::new();
        writer.ensure_dir(&dir).expect("dir");

        let day = NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
        let trades = vec![
            TradeRecord {
                side: Side::Buy,
                timestamp: day,
                price: 100.0,
                shares: 10,
                value: 1_001.0,
                pnl: None,
                pnl_pct: None,
                close_reason: None,
            },
            TradeRecord {
                side: Side::Sell,
                timestamp: day.succ_opt().expect("date"),
                price: 110.0,
                shares: 10,
                value: 1_098.9,
                pnl: Some(97.9),
                pnl_pct: Some(10.0),
                close_reason: Some(CloseReason::EndOfData),
            },
        ];
        let equity = vec![EquityPoint {
            timestamp: day,
            cash: 0.0,
            position_value: 1_000.0,
            equity: 1_000.0,
        }];

        writer
            .write_trades_csv(&dir.join("trades.csv"), &trades)
            .expect("trades");
        writer
            .write_equity_csv(&dir.join("equity.csv"), &equity)
            .expect("equity");
        let meta = serde_json::json!({ "strategy": "rsi_only" });
        writer
            .write_metrics_json(
                &dir.join("metrics.json"),
                &MetricsSnapshot::empty(1_000.0),
                Some(&meta),
            )
            .expect("metrics");

        assert_eq!(read_trades_csv(&dir.join("trades.csv")).expect("read"), trades);
        assert_eq!(read_equity_csv(&dir.join("equity.csv")).expect("read"), equity);

        let header = fs::read_to_string(dir.join("trades.csv")).expect("csv");
        assert!(header.starts_with("side,timestamp,price,shares,value,pnl,pnl_pct,close_reason"));
        assert!(header.contains("SELL,2024-02-02"));

        let raw = fs::read_to_string(dir.join("metrics.json")).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert_eq!(parsed["meta"]["strategy"], "rsi_only");
        assert_eq!(parsed["metrics"]["final_equity"], 1_000.0);
        assert_eq!(parsed["metrics"]["num_trades"], 0);
    }
}
