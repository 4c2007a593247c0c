use crate::entities::run_record::RunRecord;

/// Append-only log of completed runs.
pub trait ResultsRepository {
    fn save(&self, record: &RunRecord) -> Result<(), String>;
    fn load_all(&self) -> Result<Vec<RunRecord>, String>;
    fn clear(&self) -> Result<(), String>;
}
