use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vesta_domain::repositories::market_data::MarketDataQuery;
use vesta_domain::services::engine::execution::{
    SimulationConfig, DEFAULT_BASE_SLIPPAGE_RATE, DEFAULT_COMMISSION_RATE,
    DEFAULT_INITIAL_CAPITAL,
};
use vesta_domain::services::strategy::StrategyKind;

pub const DEFAULT_RESULTS_LOG: &str = "backtest_results.json";
pub const DEFAULT_INITIAL_PRICE: f64 = 300.0;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Synthetic,
    Csv,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    #[serde(default)]
    pub costs: CostsConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub strategies: StrategiesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub symbol: String,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CostsConfig {
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default = "default_base_slippage_rate")]
    pub base_slippage_rate: f64,
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            commission_rate: DEFAULT_COMMISSION_RATE,
            base_slippage_rate: DEFAULT_BASE_SLIPPAGE_RATE,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub source: DataSource,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_price: Option<f64>,
    pub seed: Option<u64>,
    pub csv_path: Option<String>,
}

impl DataConfig {
    pub fn initial_price(&self) -> f64 {
        self.initial_price.unwrap_or(DEFAULT_INITIAL_PRICE)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_results_log")]
    pub results_log: String,
    pub out_dir: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_log: default_results_log(),
            out_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct StrategiesConfig {
    pub enabled: Option<Vec<String>>,
}

fn default_initial_capital() -> f64 {
    DEFAULT_INITIAL_CAPITAL
}

fn default_commission_rate() -> f64 {
    DEFAULT_COMMISSION_RATE
}

fn default_base_slippage_rate() -> f64 {
    DEFAULT_BASE_SLIPPAGE_RATE
}

fn default_results_log() -> String {
    DEFAULT_RESULTS_LOG.to_string()
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.run.symbol.trim().is_empty() {
            return Err("run.symbol must not be empty".to_string());
        }
        self.simulation_config()
            .validate()
            .map_err(|err| format!("invalid [run]/[costs]: {err}"))?;

        if let (Some(start), Some(end)) = (self.data.start_date, self.data.end_date) {
            if end < start {
                return Err(format!(
                    "data.end_date ({end}) must not be before data.start_date ({start})"
                ));
            }
        }

        match self.data.source {
            DataSource::Synthetic => {
                if self.data.start_date.is_none() || self.data.end_date.is_none() {
                    return Err(
                        "data.source=synthetic requires data.start_date and data.end_date"
                            .to_string(),
                    );
                }
                let price = self.data.initial_price();
                if !price.is_finite() || price <= 0.0 {
                    return Err("data.initial_price must be finite and > 0".to_string());
                }
            }
            DataSource::Csv => {
                if self
                    .data
                    .csv_path
                    .as_deref()
                    .map_or(true, |path| path.trim().is_empty())
                {
                    return Err("data.source=csv requires data.csv_path".to_string());
                }
            }
        }

        if self.paths.results_log.trim().is_empty() {
            return Err("paths.results_log must not be empty".to_string());
        }

        self.enabled_strategies()?;
        Ok(())
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::new(
            self.run.initial_capital,
            self.costs.commission_rate,
            self.costs.base_slippage_rate,
        )
    }

    /// Strategies named in `[strategies] enabled`, or every known strategy.
    pub fn enabled_strategies(&self) -> Result<Vec<StrategyKind>, String> {
        match &self.strategies.enabled {
            None => Ok(StrategyKind::ALL.to_vec()),
            Some(names) if names.is_empty() => {
                Err("strategies.enabled must list at least one strategy".to_string())
            }
            Some(names) => {
                let mut kinds = Vec::with_capacity(names.len());
                for name in names {
                    let kind: StrategyKind = name
                        .parse()
                        .map_err(|err| format!("strategies.enabled: {err}"))?;
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                Ok(kinds)
            }
        }
    }

    pub fn market_data_query(&self) -> MarketDataQuery {
        MarketDataQuery {
            symbol: self.run.symbol.clone(),
            start_date: self.data.start_date,
            end_date: self.data.end_date,
        }
    }

    pub fn results_log_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.results_log)
    }

    pub fn out_dir(&self) -> Option<PathBuf> {
        self.paths.out_dir.as_ref().map(PathBuf::from)
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = parse_config(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok((config, contents))
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str(contents).map_err(|err| err.to_string())
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}
