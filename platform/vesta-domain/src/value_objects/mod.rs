pub mod equity_point;
pub mod position;
pub mod price_bar;
pub mod side;
pub mod signal_row;
pub mod trade_record;
