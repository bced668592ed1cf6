//! CSV Candle Source - reads OHLCV series from disk
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Rows must already
//! be in ascending timestamp order; the engine never re-sorts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use crate::oracle::{CandleSource, SourceError};
use crate::types::Candle;

/// Symbol -> CSV file mapping
#[derive(Debug, Clone, Default)]
pub struct CsvCandleSource {
    files: HashMap<String, PathBuf>,
}

impl CsvCandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(symbol.into(), path.into());
        self
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Parse candle rows, rejecting empty or non-ascending series.
pub fn parse_candles<R: Read>(reader: R, symbol: &str) -> Result<Vec<Candle>, SourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles: Vec<Candle> = Vec::new();
    for (row, record) in csv_reader.deserialize::<Candle>().enumerate() {
        let candle = record?;
        if let Some(prev) = candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(SourceError::Unordered {
                    symbol: symbol.to_string(),
                    row: row + 1,
                });
            }
        }
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(SourceError::Empty(symbol.to_string()));
    }
    Ok(candles)
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let path = self
            .files
            .get(symbol)
            .ok_or_else(|| SourceError::UnknownSymbol(symbol.to_string()))?;

        let raw = tokio::fs::read(path).await?;
        let mut candles = parse_candles(raw.as_slice(), symbol)?;

        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }

        debug!(
            symbol = %symbol,
            interval = %interval,
            path = %path.display(),
            candle_count = candles.len(),
            "Loaded candles from CSV"
        );

        Ok(candles)
    }
}
