pub mod rolling;

use crate::value_objects::price_bar::PriceBar;
use rolling::{Ema, RollingRange, RollingRsi, RollingSma, RollingStd};

pub const RSI_PERIOD: usize = 14;
pub const SMA_FAST_PERIOD: usize = 20;
pub const SMA_SLOW_PERIOD: usize = 50;
pub const EMA_PERIOD: usize = 12;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BBANDS_PERIOD: usize = 20;
pub const BBANDS_STD_DEV: f64 = 2.0;
pub const STOCH_K_PERIOD: usize = 14;
pub const STOCH_D_PERIOD: usize = 3;
pub const ATR_PERIOD: usize = 14;

/// One bar together with every indicator value defined on it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub rsi: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub atr: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
}

#[derive(Debug, Clone, Copy)]
struct RawRow {
    rsi: Option<f64>,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    ema_12: f64,
    macd: f64,
    macd_signal: f64,
    bb_std: Option<f64>,
    stoch_k: Option<f64>,
    stoch_d: Option<f64>,
    atr: Option<f64>,
}

impl IndicatorFrame {
    /// Computes all indicators over `bars` (ascending by date) and keeps only
    /// the rows where every indicator is defined. Each kept bar carries its
    /// ATR as volatility.
    pub fn prepare(bars: &[PriceBar]) -> Self {
        let mut rsi = RollingRsi::new(RSI_PERIOD);
        let mut sma_20 = RollingSma::new(SMA_FAST_PERIOD);
        let mut sma_50 = RollingSma::new(SMA_SLOW_PERIOD);
        let mut ema_12 = Ema::new(EMA_PERIOD);
        let mut ema_fast = Ema::new(MACD_FAST);
        let mut ema_slow = Ema::new(MACD_SLOW);
        let mut macd_signal = Ema::new(MACD_SIGNAL);
        let mut bb_std = RollingStd::new(BBANDS_PERIOD);
        let mut stoch_range = RollingRange::new(STOCH_K_PERIOD);
        let mut stoch_d = RollingSma::new(STOCH_D_PERIOD);
        let mut atr = RollingSma::new(ATR_PERIOD);
        let mut prev_close: Option<f64> = None;

        let mut rows = Vec::with_capacity(bars.len());
        for bar in bars {
            let close = bar.close;
            let macd = ema_fast.update(close) - ema_slow.update(close);
            let stoch_k = stoch_range
                .update(bar.low, bar.high)
                .and_then(|(low, high)| stochastic_k(close, low, high));

            let raw = RawRow {
                rsi: rsi.update(close),
                sma_20: sma_20.update(close),
                sma_50: sma_50.update(close),
                ema_12: ema_12.update(close),
                macd,
                macd_signal: macd_signal.update(macd),
                bb_std: bb_std.update(close),
                stoch_k,
                stoch_d: stoch_d.update_opt(stoch_k),
                atr: atr.update(true_range(bar, prev_close)),
            };
            prev_close = Some(close);

            if let Some(row) = complete_row(bar, raw) {
                rows.push(row);
            }
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The surviving bars, volatility attached.
    pub fn bars(&self) -> Vec<PriceBar> {
        self.rows.iter().map(|row| row.bar.clone()).collect()
    }
}

fn stochastic_k(close: f64, low: f64, high: f64) -> Option<f64> {
    let range = high - low;
    if range.abs() <= f64::EPSILON {
        return None;
    }
    Some(100.0 * (close - low) / range)
}

fn true_range(bar: &PriceBar, prev_close: Option<f64>) -> f64 {
    let high_low = bar.high - bar.low;
    match prev_close {
        Some(prev) => high_low
            .max((bar.high - prev).abs())
            .max((bar.low - prev).abs()),
        None => high_low,
    }
}

fn complete_row(bar: &PriceBar, raw: RawRow) -> Option<IndicatorRow> {
    let bb_middle = raw.sma_20?;
    let bb_std = raw.bb_std?;
    let atr = raw.atr?;
    let row = IndicatorRow {
        bar: bar.clone().with_volatility(Some(atr)),
        rsi: raw.rsi?,
        sma_20: bb_middle,
        sma_50: raw.sma_50?,
        ema_12: raw.ema_12,
        macd: raw.macd,
        macd_signal: raw.macd_signal,
        macd_hist: raw.macd - raw.macd_signal,
        bb_upper: bb_middle + bb_std * BBANDS_STD_DEV,
        bb_middle,
        bb_lower: bb_middle - bb_std * BBANDS_STD_DEV,
        stoch_k: raw.stoch_k?,
        stoch_d: raw.stoch_d?,
        atr,
    };
    let values = [
        row.rsi,
        row.sma_20,
        row.sma_50,
        row.ema_12,
        row.macd,
        row.macd_signal,
        row.bb_upper,
        row.bb_lower,
        row.stoch_k,
        row.stoch_d,
        row.atr,
    ];
    values.iter().all(|v| v.is_finite()).then_some(row)
}
