pub mod metrics;
pub mod run_record;
