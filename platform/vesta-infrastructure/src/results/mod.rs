use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vesta_domain::entities::run_record::RunRecord;
use vesta_domain::repositories::results::ResultsRepository;

/// Results log kept as a single pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct FilesystemResultsStore {
    path: PathBuf,
}

impl FilesystemResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the log, creating an empty one if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, String> {
        let store = Self::new(path);
        if !store.path.exists() {
            store.write_all(&[])?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, records: &[RunRecord]) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create dir {}: {}", parent.display(), err))?;
        }
        let json = serde_json::to_string_pretty(records)
            .map_err(|err| format!("failed to serialize results log: {}", err))?;
        fs::write(&self.path, json).map_err(|err| {
            format!(
                "failed to write results log {}: {}",
                self.path.display(),
                err
            )
        })
    }
}

impl ResultsRepository for FilesystemResultsStore {
    fn save(&self, record: &RunRecord) -> Result<(), String> {
        let mut records = self.load_all()?;
        records.push(record.clone());
        self.write_all(&records)?;
        info!(
            path = %self.path.display(),
            strategy = %record.strategy_name,
            total = records.len(),
            "saved run record"
        );
        Ok(())
    }

    /// A missing or unreadable log reads as empty.
    fn load_all(&self) -> Result<Vec<RunRecord>, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read results log");
                metrics::counter!("vesta.results.load_failures_total").increment(1);
                return Ok(Vec::new());
            }
        };
        match serde_json::from_str::<Vec<RunRecord>>(&contents) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "results log is not valid JSON");
                metrics::counter!("vesta.results.load_failures_total").increment(1);
                Ok(Vec::new())
            }
        }
    }

    fn clear(&self) -> Result<(), String> {
        self.write_all(&[])?;
        info!(path = %self.path.display(), "cleared results log");
        Ok(())
    }
}
