use crate::config::Config;
use sha2::{Digest, Sha256};
use vesta_domain::entities::run_record::DataInfo;
use vesta_domain::value_objects::price_bar::PriceBar;

pub fn data_info_from_bars(symbol: &str, bars: &[PriceBar]) -> Option<DataInfo> {
    let first = bars.first()?;
    let last = bars.last()?;
    Some(DataInfo {
        symbol: symbol.to_string(),
        start_date: first.timestamp,
        end_date: last.timestamp,
        num_days: bars.len(),
    })
}

/// Short content hash of the prepared series, so runs on identical data can
/// be matched up later.
pub fn dataset_fingerprint(bars: &[PriceBar]) -> String {
    let mut hasher = Sha256::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        for value in [bar.open, bar.high, bar.low, bar.close] {
            hasher.update(value.to_le_bytes());
        }
        hasher.update(bar.volume.to_le_bytes());
        hasher.update(b"\n");
    }
    let bytes = hasher.finalize();
    to_hex_short(&bytes[..], 16)
}

pub fn metrics_meta_json(
    strategy: &str,
    data_info: &DataInfo,
    fingerprint: &str,
) -> serde_json::Value {
    serde_json::json!({
        "strategy": strategy,
        "symbol": data_info.symbol,
        "start": data_info.start_date,
        "end": data_info.end_date,
        "num_days": data_info.num_days,
        "dataset_fingerprint": fingerprint,
    })
}

pub fn config_snapshot_json(config: &Config) -> serde_json::Value {
    serde_json::json!({
        "run": {
            "symbol": config.run.symbol,
            "initial_capital": config.run.initial_capital,
        },
        "costs": {
            "commission_rate": config.costs.commission_rate,
            "base_slippage_rate": config.costs.base_slippage_rate,
        },
        "data": {
            "source": config.data.source,
            "start_date": config.data.start_date,
            "end_date": config.data.end_date,
            "initial_price": config.data.initial_price(),
            "seed": config.data.seed(),
            "csv_path": config.data.csv_path,
        },
    })
}

fn to_hex_short(bytes: &[u8], chars: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(chars);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        if out.len() >= chars {
            break;
        }
        out.push(HEX[(b & 0x0f) as usize] as char);
        if out.len() >= chars {
            break;
        }
    }
    out
}
