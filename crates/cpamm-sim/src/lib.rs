//! cpamm-sim: two-pool constant-product arbitrage sizing.
//!
//! Models Uniswap V2-style pools over `f64` reserves, prices the buy-low /
//! sell-high round trip for a bridge-token trade size, and finds the
//! profit-maximizing size with a bounded Brent search.

pub mod bounds;
pub mod config;
pub mod error;
pub mod events;
pub mod objective;
pub mod optimizer;
pub mod pool;
pub mod report;
pub mod scenario;
pub mod timing;

pub use bounds::{BoundStrategy, SearchBounds};
pub use config::SearchConfig;
pub use error::{ArbError, Result};
pub use events::{EventSink, NoopSink, PoolEvent, TracingSink};
pub use objective::{arbitrage_profit, ArbitrageQuery, Direction};
pub use optimizer::{optimize_trade, OptimizationResult};
pub use pool::{Pool, ReservePair, Token};
pub use report::{find_optimal_trade, find_optimal_trade_with, ArbitrageReport};
