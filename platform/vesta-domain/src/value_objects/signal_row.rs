use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRow {
    pub timestamp: NaiveDate,
    pub entry: bool,
    pub exit: bool,
}

impl SignalRow {
    pub fn new(timestamp: NaiveDate, entry: bool, exit: bool) -> Self {
        Self {
            timestamp,
            entry,
            exit,
        }
    }

    pub fn none(timestamp: NaiveDate) -> Self {
        Self::new(timestamp, false, false)
    }
}
