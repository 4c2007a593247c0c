use crate::entities::metrics::MetricsSnapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Description of the dataset a run was simulated on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataInfo {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub num_days: usize,
}

/// One persisted entry of the results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub strategy_name: String,
    pub metrics: MetricsSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_info: Option<DataInfo>,
}

impl RunRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        strategy_name: impl Into<String>,
        metrics: MetricsSnapshot,
        data_info: Option<DataInfo>,
    ) -> Self {
        Self {
            timestamp,
            strategy_name: strategy_name.into(),
            metrics,
            data_info,
        }
    }
}
