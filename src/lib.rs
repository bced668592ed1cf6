//! StructBot Library
//!
//! Market-structure pattern engine: BOS/ChoCH, liquidity pools and sweeps,
//! FVG/OB points of interest, confluence signals and investment scoring.

pub mod config;
pub mod features;
pub mod oracle;
pub mod strategy;
pub mod structure;
pub mod types;
