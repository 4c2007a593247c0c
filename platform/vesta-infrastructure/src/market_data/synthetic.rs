use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};
use tracing::info;
use vesta_domain::repositories::market_data::{MarketDataQuery, MarketDataRepository};
use vesta_domain::value_objects::price_bar::PriceBar;

const BASE_DRIFT: f64 = 0.0003;
const BASE_VOLATILITY: f64 = 0.015;
const BASE_VOLUME: f64 = 80_000_000.0;
const MIN_REGIME_DAYS: usize = 50;
const MAX_REGIME_DAYS: usize = 150;

/// Regime-switching random walk over business days. The same seed always
/// produces the same series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticMarketData {
    pub initial_price: f64,
    pub seed: u64,
}

impl SyntheticMarketData {
    pub fn new(initial_price: f64, seed: u64) -> Self {
        Self {
            initial_price,
            seed,
        }
    }

    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>, String> {
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return Err(format!(
                "synthetic initial price must be finite and > 0 (got {})",
                self.initial_price
            ));
        }

        let dates = business_days(start, end);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let returns = regime_returns(&mut rng, dates.len())?;

        let mut log_price = 0.0;
        let closes: Vec<f64> = returns
            .iter()
            .map(|ret| {
                log_price += ret;
                self.initial_price * log_price.exp()
            })
            .collect();

        let intraday_vol = BASE_VOLATILITY * 0.4;
        let gap_dist = normal(0.0, BASE_VOLATILITY * 0.3)?;
        let range_dist = LogNormal::new(intraday_vol.ln(), 0.5)
            .map_err(|err| format!("invalid intraday range distribution: {err}"))?;
        let volume_dist = LogNormal::new(0.0, 0.6)
            .map_err(|err| format!("invalid volume distribution: {err}"))?;

        let mut bars = Vec::with_capacity(dates.len());
        for (idx, (date, close)) in dates.iter().zip(&closes).enumerate() {
            let close = *close;
            let open = if idx == 0 {
                self.initial_price
            } else {
                closes[idx - 1] * (1.0 + gap_dist.sample(&mut rng))
            };

            let intraday_range = range_dist.sample(&mut rng).abs() * close;
            let high = open.max(close) + rng.gen_range(0.0..=intraday_range * 0.5);
            let low = open.min(close) - rng.gen_range(0.0..=intraday_range * 0.5);

            let range_factor = (high - low) / close;
            let volume = BASE_VOLUME * volume_dist.sample(&mut rng) * (1.0 + range_factor * 5.0);

            bars.push(PriceBar {
                timestamp: *date,
                open: round_cents(open),
                high: round_cents(high),
                low: round_cents(low),
                close: round_cents(close),
                volume: volume as u64,
                volatility: None,
            });
        }

        Ok(bars)
    }
}

impl MarketDataRepository for SyntheticMarketData {
    fn load_bars(&self, query: &MarketDataQuery) -> Result<Vec<PriceBar>, String> {
        let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
            return Err("synthetic market data needs both a start and an end date".to_string());
        };
        let bars = self.generate(start, end)?;
        info!(
            symbol = %query.symbol,
            seed = self.seed,
            rows = bars.len(),
            "generated synthetic market data"
        );
        Ok(bars)
    }
}

pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

fn regime_returns(rng: &mut StdRng, len: usize) -> Result<Vec<f64>, String> {
    let mut returns = Vec::with_capacity(len);
    while returns.len() < len {
        let regime_len = rng
            .gen_range(MIN_REGIME_DAYS..MAX_REGIME_DAYS)
            .min(len - returns.len());
        let drift = normal(BASE_DRIFT, BASE_DRIFT / 2.0)?.sample(rng);
        let vol = rng.gen_range(BASE_VOLATILITY * 0.7..BASE_VOLATILITY * 1.3);
        let shocks = normal(drift, vol)?;
        let ar_coef = rng.gen_range(0.05..0.15);

        let mut prev: Option<f64> = None;
        for _ in 0..regime_len {
            let mut ret = shocks.sample(rng);
            if let Some(prev) = prev {
                ret += ar_coef * prev;
            }
            returns.push(ret);
            prev = Some(ret);
        }
    }
    Ok(returns)
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, String> {
    Normal::new(mean, std_dev)
        .map_err(|err| format!("invalid normal distribution ({mean}, {std_dev}): {err}"))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
