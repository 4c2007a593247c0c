use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingSma {
    window: usize,
    buf: VecDeque<f64>,
    sum: f64,
}

impl RollingSma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        self.buf.push_back(value);
        self.sum += value;
        while self.buf.len() > self.window {
            if let Some(front) = self.buf.pop_front() {
                self.sum -= front;
            }
        }

        if self.buf.len() == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }

    /// Feeds an optional value; a missing value restarts the window.
    pub fn update_opt(&mut self, value: Option<f64>) -> Option<f64> {
        match value {
            Some(value) => self.update(value),
            None => {
                self.reset();
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.sum = 0.0;
    }
}

/// Rolling sample standard deviation (n - 1).
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    buf: VecDeque<f64>,
}

impl RollingStd {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            buf: VecDeque::new(),
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.window < 2 {
            return None;
        }

        self.buf.push_back(value);
        while self.buf.len() > self.window {
            self.buf.pop_front();
        }
        if self.buf.len() < self.window {
            return None;
        }

        let n = self.window as f64;
        let mean = self.buf.iter().sum::<f64>() / n;
        let var = self
            .buf
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (n - 1.0);
        Some(var.max(0.0).sqrt())
    }
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first observation.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            value: None,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.value = Some(next);
        next
    }
}

/// Rolling RSI over close-to-close differences using simple means of gains
/// and losses.
#[derive(Debug, Clone)]
pub struct RollingRsi {
    window: usize,
    prev_close: Option<f64>,
    diffs: VecDeque<f64>,
    sum_gains: f64,
    sum_losses: f64,
}

impl RollingRsi {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            prev_close: None,
            diffs: VecDeque::new(),
            sum_gains: 0.0,
            sum_losses: 0.0,
        }
    }

    pub fn update(&mut self, close: f64) -> Option<f64> {
        let Some(prev) = self.prev_close.replace(close) else {
            return None;
        };
        if self.window == 0 || !prev.is_finite() || !close.is_finite() {
            return None;
        }

        let diff = close - prev;
        self.diffs.push_back(diff);
        if diff > 0.0 {
            self.sum_gains += diff;
        } else {
            self.sum_losses += -diff;
        }

        while self.diffs.len() > self.window {
            if let Some(front) = self.diffs.pop_front() {
                if front > 0.0 {
                    self.sum_gains -= front;
                } else {
                    self.sum_losses -= -front;
                }
            }
        }

        if self.diffs.len() < self.window {
            return None;
        }

        let gains = self.sum_gains.max(0.0);
        let losses = self.sum_losses.max(0.0);
        if losses <= 1e-12 {
            if gains <= 1e-12 {
                return None;
            }
            return Some(100.0);
        }

        let rs = gains / losses;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}

/// Rolling minimum and maximum over a fixed window.
#[derive(Debug, Clone)]
pub struct RollingRange {
    window: usize,
    lows: VecDeque<f64>,
    highs: VecDeque<f64>,
}

impl RollingRange {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            lows: VecDeque::new(),
            highs: VecDeque::new(),
        }
    }

    /// Returns `(lowest_low, highest_high)` once the window is full.
    pub fn update(&mut self, low: f64, high: f64) -> Option<(f64, f64)> {
        if self.window == 0 {
            return None;
        }

        self.lows.push_back(low);
        self.highs.push_back(high);
        while self.lows.len() > self.window {
            self.lows.pop_front();
            self.highs.pop_front();
        }
        if self.lows.len() < self.window {
            return None;
        }

        let lowest = self.lows.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = self.highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lowest, highest))
    }
}

#[cfg(test)]
mod tests {
    use super::{Ema, RollingRange, RollingRsi, RollingSma, RollingStd};

    #[test]
    fn sma_waits_for_full_window() {
        let mut sma = RollingSma::new(3);
        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(2.0), None);
        assert_eq!(sma.update(3.0), Some(2.0));
        assert_eq!(sma.update(4.0), Some(3.0));
    }

    #[test]
    fn sma_restarts_after_gap() {
        let mut sma = RollingSma::new(2);
        assert_eq!(sma.update_opt(Some(1.0)), None);
        assert_eq!(sma.update_opt(None), None);
        assert_eq!(sma.update_opt(Some(3.0)), None);
        assert_eq!(sma.update_opt(Some(5.0)), Some(4.0));
    }

    #[test]
    fn std_is_sample_std() {
        let mut std = RollingStd::new(4);
        let mut last = None;
        for v in [2.0, 4.0, 4.0, 6.0] {
            last = std.update(v);
        }
        // mean 4, squared diffs 4+0+0+4 = 8, / 3
        let expected = (8.0f64 / 3.0).sqrt();
        assert!((last.expect("std") - expected).abs() < 1e-12);
    }

    #[test]
    fn ema_seeds_with_first_value() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.update(10.0), 10.0);
        assert_eq!(ema.update(20.0), 15.0);
    }

    #[test]
    fn rsi_extremes() {
        let mut up = RollingRsi::new(3);
        let values: Vec<_> = [1.0, 2.0, 3.0, 4.0].iter().map(|c| up.update(*c)).collect();
        assert_eq!(values, vec![None, None, None, Some(100.0)]);

        let mut flat = RollingRsi::new(2);
        let values: Vec<_> = [5.0, 5.0, 5.0].iter().map(|c| flat.update(*c)).collect();
        assert_eq!(values, vec![None, None, None]);

        let mut mixed = RollingRsi::new(2);
        mixed.update(10.0);
        mixed.update(12.0);
        // gains 2, losses 1 -> rs 2 -> 66.67
        let rsi = mixed.update(11.0).expect("rsi");
        assert!((rsi - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn range_tracks_extremes() {
        let mut range = RollingRange::new(2);
        assert_eq!(range.update(1.0, 3.0), None);
        assert_eq!(range.update(2.0, 5.0), Some((1.0, 5.0)));
        assert_eq!(range.update(4.0, 4.5), Some((2.0, 5.0)));
    }
}
