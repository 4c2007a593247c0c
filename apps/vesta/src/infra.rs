use std::path::Path;
use vesta_application::config::{Config, DataSource};
use vesta_domain::repositories::artifacts::ArtifactWriter;
use vesta_domain::repositories::market_data::MarketDataRepository;
use vesta_domain::repositories::results::ResultsRepository;
use vesta_infrastructure::artifacts::FilesystemArtifactWriter;
use vesta_infrastructure::market_data::ohlcv::CsvMarketData;
use vesta_infrastructure::market_data::synthetic::SyntheticMarketData;
use vesta_infrastructure::results::FilesystemResultsStore;

pub struct EngineDeps {
    pub market_data: Box<dyn MarketDataRepository>,
    pub results: Box<dyn ResultsRepository>,
    pub artifacts: Box<dyn ArtifactWriter>,
}

pub fn build_engine_deps(config: &Config) -> Result<EngineDeps, String> {
    Ok(EngineDeps {
        market_data: build_market_data_repo(config)?,
        results: build_results_repo(&config.results_log_path())?,
        artifacts: Box::new(FilesystemArtifactWriter::new()),
    })
}

pub fn build_results_repo(path: &Path) -> Result<Box<dyn ResultsRepository>, String> {
    Ok(Box::new(FilesystemResultsStore::open(path)?))
}

fn build_market_data_repo(config: &Config) -> Result<Box<dyn MarketDataRepository>, String> {
    match config.data.source {
        DataSource::Synthetic => Ok(Box::new(SyntheticMarketData::new(
            config.data.initial_price(),
            config.data.seed(),
        ))),
        DataSource::Csv => {
            let path = config
                .data
                .csv_path
                .as_deref()
                .ok_or_else(|| "data.source=csv requires data.csv_path".to_string())?;
            Ok(Box::new(CsvMarketData::new(path)))
        }
    }
}
