//! Candle sources.

pub mod csv;
pub mod memory;
pub mod source;

pub use self::csv::CsvCandleSource;
pub use memory::MemoryCandleSource;
pub use source::{CandleSource, SourceError};
