use thiserror::Error;

/// Errors raised when a table or strategy is handed an invalid argument.
///
/// A missing key is never an error: lookups return `Option` and removals
/// return `bool`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
    #[error("max load factor must lie strictly between 0 and 1, got {0}")]
    InvalidLoadFactor(f64),
    #[error("probe constant {name} must be greater than zero, got {value}")]
    InvalidProbeConstant { name: &'static str, value: usize },
    #[error("probe attempt {attempt} is outside 0..{capacity}")]
    ProbeOutOfRange { attempt: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
