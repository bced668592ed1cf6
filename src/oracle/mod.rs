//! Oracle module - Candle sources
//!
//! The engine only consumes ordered candle slices; where they come from is
//! behind [`CandleSource`]. Only a CSV source ships with the crate.

mod candles;

pub use candles::{parse_candles, CsvCandleSource};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Candle;

/// Failure loading a candle series
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no candles for {0}")]
    Empty(String),

    #[error("candles for {symbol} are not in ascending order at row {row}")]
    Unordered { symbol: String, row: usize },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Market-data adapter: "given a symbol and interval, return ordered candles"
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &'static str;

    /// Most recent `limit` candles, ascending by timestamp
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError>;
}
