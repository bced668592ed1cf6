//! Structure module - price-action pattern detectors
//!
//! Each detector is a pure function over an ordered candle slice:
//! - `pivots` - swing highs/lows
//! - `market_structure` - BOS/ChoCH state machine
//! - `liquidity` - equal highs/lows pools and sweeps
//! - `poi` - unmitigated FVGs and order blocks
//! - `zones` - EMA trend filter and premium/discount zone

pub mod liquidity;
pub mod market_structure;
pub mod pivots;
pub mod poi;
pub mod zones;

pub use liquidity::{find_liquidity_pools, find_sweeps};
pub use market_structure::{find_structure, structure_from_pivots, StructureState};
pub use pivots::{find_pivots, LIQUIDITY_WINDOW, STRUCTURE_WINDOW};
pub use poi::{find_fair_value_gaps, find_order_blocks};
pub use zones::{premium_discount_zone, TrendFilter, PD_LOOKBACK};
