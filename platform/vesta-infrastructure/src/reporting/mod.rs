use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use vesta_domain::entities::metrics::MetricsSnapshot;
use vesta_domain::value_objects::equity_point::EquityPoint;
use vesta_domain::value_objects::trade_record::TradeRecord;

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<(), String> {
    write_rows(path, "trades", trades)
}

pub fn write_equity_csv(path: &Path, points: &[EquityPoint]) -> Result<(), String> {
    write_rows(path, "equity", points)
}

pub fn read_trades_csv(path: &Path) -> Result<Vec<TradeRecord>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open trades csv {}: {}", path.display(), err))?;
    rdr.deserialize::<TradeRecord>()
        .map(|result| result.map_err(|err| format!("failed to parse trade record: {}", err)))
        .collect()
}

pub fn read_equity_csv(path: &Path) -> Result<Vec<EquityPoint>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open equity csv {}: {}", path.display(), err))?;
    rdr.deserialize::<EquityPoint>()
        .map(|result| result.map_err(|err| format!("failed to parse equity record: {}", err)))
        .collect()
}

#[derive(Serialize)]
struct MetricsDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a serde_json::Value>,
    metrics: &'a MetricsSnapshot,
}

pub fn write_metrics_json(
    path: &Path,
    metrics: &MetricsSnapshot,
    meta: Option<&serde_json::Value>,
) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&MetricsDocument { meta, metrics })
        .map_err(|err| format!("failed to serialize metrics: {}", err))?;
    let mut file = fs::File::create(path)
        .map_err(|err| format!("failed to create metrics {}: {}", path.display(), err))?;
    file.write_all(json.as_bytes())
        .map_err(|err| format!("failed to write metrics {}: {}", path.display(), err))
}

fn write_rows<T: Serialize>(path: &Path, label: &str, rows: &[T]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create {label} csv {}: {}", path.display(), err))?;
    for row in rows {
        wtr.serialize(row)
            .map_err(|err| format!("failed to write {label} row: {}", err))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush {label} csv: {}", err))
}
