use crate::entities::metrics::MetricsSnapshot;
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade_record::TradeRecord;
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    fn write_trades_csv(&self, path: &Path, trades: &[TradeRecord]) -> Result<(), String>;
    fn write_equity_csv(&self, path: &Path, points: &[EquityPoint]) -> Result<(), String>;
    fn write_metrics_json(
        &self,
        path: &Path,
        metrics: &MetricsSnapshot,
        meta: Option<&serde_json::Value>,
    ) -> Result<(), String>;
}
