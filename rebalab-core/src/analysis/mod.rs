//! Series diagnostics that sit beside the engine: volatility and
//! candle-level scans over the same ingested data.

pub mod candles;
pub mod volatility;

pub use candles::{largest_red_candles, RedCandle, RedCandleReport};
pub use volatility::{
    average_ewm_std, average_ewm_volatility, equal_weight_returns, ewm_std, log_returns,
};
