use crate::value_objects::price_bar::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DataQualityReport {
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub inverted_range: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub first_duplicate: Option<NaiveDate>,
    pub first_out_of_order: Option<NaiveDate>,
    pub first_invalid_close: Option<NaiveDate>,
    pub max_gap_days: Option<i64>,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0
            && self.out_of_order == 0
            && self.invalid_close == 0
            && self.inverted_range == 0
    }

    /// Turns the first problem found into an error message.
    pub fn ensure_clean(&self) -> Result<(), String> {
        if let Some(date) = self.first_duplicate {
            return Err(format!(
                "{} duplicate bar(s), first at {}",
                self.duplicates, date
            ));
        }
        if let Some(date) = self.first_out_of_order {
            return Err(format!(
                "{} out-of-order bar(s), first at {}",
                self.out_of_order, date
            ));
        }
        if let Some(date) = self.first_invalid_close {
            return Err(format!(
                "{} bar(s) with a non-positive or non-finite close, first at {}",
                self.invalid_close, date
            ));
        }
        if self.inverted_range > 0 {
            return Err(format!(
                "{} bar(s) with high below low",
                self.inverted_range
            ));
        }
        Ok(())
    }
}

pub fn data_quality_from_bars(bars: &[PriceBar]) -> DataQualityReport {
    let mut report = DataQualityReport::default();
    if bars.is_empty() {
        return report;
    }

    report.first_date = Some(bars[0].timestamp);
    report.last_date = Some(bars[bars.len() - 1].timestamp);

    let mut last: Option<NaiveDate> = None;
    let mut max_gap: Option<i64> = None;

    for bar in bars {
        let date = bar.timestamp;

        if !bar.close.is_finite() || bar.close <= 0.0 {
            report.invalid_close += 1;
            report.first_invalid_close.get_or_insert(date);
        }
        if bar.high < bar.low {
            report.inverted_range += 1;
        }

        if let Some(prev) = last {
            if date == prev {
                report.duplicates += 1;
                report.first_duplicate.get_or_insert(date);
            } else if date < prev {
                report.out_of_order += 1;
                report.first_out_of_order.get_or_insert(date);
            } else {
                let gap = (date - prev).num_days();
                max_gap = Some(max_gap.map_or(gap, |current| current.max(gap)));
            }
        }

        last = Some(date);
    }

    report.max_gap_days = max_gap;
    report
}
