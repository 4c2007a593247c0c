pub mod analysis;
pub mod backtesting;
pub mod config;
pub mod shared;

pub mod meta {
    pub fn engine_name() -> &'static str {
        vesta_domain::engine_name()
    }
}
