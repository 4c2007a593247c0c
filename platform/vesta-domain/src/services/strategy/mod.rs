use crate::services::indicators::{IndicatorFrame, IndicatorRow};
use crate::value_objects::signal_row::SignalRow;
use std::fmt;
use std::str::FromStr;

/// Maps a prepared indicator frame to one signal row per frame row.
pub trait Strategy {
    fn name(&self) -> &str;

    fn signals(&self, frame: &IndicatorFrame) -> Vec<SignalRow>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    RsiOnly,
    MacdOnly,
    SmaCrossover,
    RsiMacdCombo,
    BbandsRsi,
    StochasticOnly,
    TripleConfirmation,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::RsiOnly,
        StrategyKind::MacdOnly,
        StrategyKind::SmaCrossover,
        StrategyKind::RsiMacdCombo,
        StrategyKind::BbandsRsi,
        StrategyKind::StochasticOnly,
        StrategyKind::TripleConfirmation,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::RsiOnly => "rsi_only",
            StrategyKind::MacdOnly => "macd_only",
            StrategyKind::SmaCrossover => "sma_crossover",
            StrategyKind::RsiMacdCombo => "rsi_macd_combo",
            StrategyKind::BbandsRsi => "bbands_rsi",
            StrategyKind::StochasticOnly => "stochastic_only",
            StrategyKind::TripleConfirmation => "triple_confirmation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::RsiOnly => "Uses: RSI (14)",
            StrategyKind::MacdOnly => "Uses: MACD (12,26,9)",
            StrategyKind::SmaCrossover => "Uses: SMA(20), SMA(50)",
            StrategyKind::RsiMacdCombo => "Uses: RSI (14), MACD (12,26,9)",
            StrategyKind::BbandsRsi => "Uses: Bollinger Bands (20,2), RSI (14)",
            StrategyKind::StochasticOnly => "Uses: Stochastic (14,3)",
            StrategyKind::TripleConfirmation => {
                "Uses: RSI (14), MACD (12,26,9), Stochastic (14,3)"
            }
        }
    }

    fn evaluate(self, row: &IndicatorRow, prev: Option<&IndicatorRow>) -> (bool, bool) {
        match self {
            StrategyKind::RsiOnly => (
                prev.is_some_and(|p| row.rsi > 30.0 && p.rsi <= 30.0),
                prev.is_some_and(|p| row.rsi < 70.0 && p.rsi >= 70.0),
            ),
            StrategyKind::MacdOnly => (macd_cross_up(row, prev), macd_cross_down(row, prev)),
            StrategyKind::SmaCrossover => (
                prev.is_some_and(|p| crossed_above(row.sma_20, row.sma_50, p.sma_20, p.sma_50)),
                prev.is_some_and(|p| crossed_below(row.sma_20, row.sma_50, p.sma_20, p.sma_50)),
            ),
            StrategyKind::RsiMacdCombo => (
                row.rsi > 30.0 && macd_cross_up(row, prev),
                row.rsi > 70.0 || macd_cross_down(row, prev),
            ),
            StrategyKind::BbandsRsi => (
                row.bar.close <= row.bb_lower && row.rsi < 35.0,
                row.bar.close >= row.bb_upper || row.rsi > 65.0,
            ),
            StrategyKind::StochasticOnly => (
                prev.is_some_and(|p| row.stoch_k > 20.0 && p.stoch_k <= 20.0),
                prev.is_some_and(|p| row.stoch_k < 80.0 && p.stoch_k >= 80.0),
            ),
            StrategyKind::TripleConfirmation => (
                row.rsi > 30.0 && macd_cross_up(row, prev) && row.stoch_k > 20.0,
                row.rsi > 70.0 || row.macd < row.macd_signal,
            ),
        }
    }
}

impl Strategy for StrategyKind {
    fn name(&self) -> &str {
        self.id()
    }

    fn signals(&self, frame: &IndicatorFrame) -> Vec<SignalRow> {
        let rows = frame.rows();
        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let prev = idx.checked_sub(1).map(|p| &rows[p]);
                let (entry, exit) = self.evaluate(row, prev);
                SignalRow::new(row.bar.timestamp, entry, exit)
            })
            .collect()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.id() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = StrategyKind::ALL.iter().map(|k| k.id()).collect();
                format!(
                    "unknown strategy '{}' (expected one of: {})",
                    value,
                    known.join(", ")
                )
            })
    }
}

fn crossed_above(a: f64, b: f64, prev_a: f64, prev_b: f64) -> bool {
    a > b && prev_a <= prev_b
}

fn crossed_below(a: f64, b: f64, prev_a: f64, prev_b: f64) -> bool {
    a < b && prev_a >= prev_b
}

fn macd_cross_up(row: &IndicatorRow, prev: Option<&IndicatorRow>) -> bool {
    prev.is_some_and(|p| crossed_above(row.macd, row.macd_signal, p.macd, p.macd_signal))
}

fn macd_cross_down(row: &IndicatorRow, prev: Option<&IndicatorRow>) -> bool {
    prev.is_some_and(|p| crossed_below(row.macd, row.macd_signal, p.macd, p.macd_signal))
}

#[cfg(test)]
mod tests {
    use super::{Strategy, StrategyKind};
    use crate::services::indicators::IndicatorFrame;
    use crate::value_objects::price_bar::PriceBar;
    use chrono::{Duration, NaiveDate};

    fn wave(len: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).expect("date");
        (0..len)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + (t / 6.0).sin() * 12.0 + (t / 2.0).cos() * 2.0;
                PriceBar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close + 1.5,
                    low: close - 1.5,
                    close,
                    volume: 10,
                    volatility: None,
                }
            })
            .collect()
    }

    #[test]
    fn ids_round_trip_through_from_str() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.id().parse::<StrategyKind>(), Ok(kind));
            assert!(kind.description().starts_with("Uses: "));
        }
        assert_eq!(" RSI_ONLY ".parse::<StrategyKind>(), Ok(StrategyKind::RsiOnly));
        assert!("nope".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn signals_align_with_frame_and_first_row_never_crosses() {
        let frame = IndicatorFrame::prepare(&wave(200));
        assert!(!frame.is_empty());
        for kind in StrategyKind::ALL {
            let signals = kind.signals(&frame);
            assert_eq!(signals.len(), frame.len(), "{kind}");
            for (signal, row) in signals.iter().zip(frame.rows()) {
                assert_eq!(signal.timestamp, row.bar.timestamp);
            }
        }
        for kind in [
            StrategyKind::RsiOnly,
            StrategyKind::MacdOnly,
            StrategyKind::SmaCrossover,
            StrategyKind::StochasticOnly,
        ] {
            let first = kind.signals(&frame)[0];
            assert!(!first.entry && !first.exit, "{kind}");
        }
    }

    #[test]
    fn oscillating_prices_trigger_macd_crossovers() {
        let frame = IndicatorFrame::prepare(&wave(200));
        let signals = StrategyKind::MacdOnly.signals(&frame);
        assert!(signals.iter().any(|s| s.entry));
        assert!(signals.iter().any(|s| s.exit));
        assert!(signals.iter().all(|s| !(s.entry && s.exit)));
    }

    #[test]
    fn empty_frame_yields_no_signals() {
        let frame = IndicatorFrame::prepare(&[]);
        for kind in StrategyKind::ALL {
            assert!(kind.signals(&frame).is_empty());
        }
    }
}
