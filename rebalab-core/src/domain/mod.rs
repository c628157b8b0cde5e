//! Domain types for the rebalancing lab.

pub mod candle;
pub mod portfolio;

pub use candle::Candle;
pub use portfolio::{PortfolioState, TradeLedger, TradeSide};

/// Symbol type alias
pub type Symbol = String;
