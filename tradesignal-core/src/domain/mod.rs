//! Domain types for the signal engine

pub mod annotated;
pub mod candle;
pub mod error;

pub use annotated::{AnnotatedCandle, IndicatorKind};
pub use candle::{validate_series, Candle};
pub use error::{AnalysisError, CandleProblem, ErrorKind};
