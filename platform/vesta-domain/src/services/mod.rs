pub mod engine;
pub mod indicators;
pub mod quality;
pub mod strategy;
