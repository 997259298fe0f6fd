//! Domain types for ZoneLab

pub mod candle;
pub mod confidence;
pub mod direction;
pub mod granularity;
pub mod instrument;

pub use candle::Candle;
pub use confidence::Confidence;
pub use direction::{Bias, Direction, Strength};
pub use granularity::{Granularity, ParseGranularityError};
pub use instrument::{normalize_instrument, quote_currency, InstrumentError, PipSizeTable};
