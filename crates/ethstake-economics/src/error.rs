//! Error types for reward, penalty and slashing computations

use crate::arith::ArithError;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EconomicsError>;

/// Errors that can occur while computing rewards or penalties.
///
/// Every computation validates its inputs before doing any arithmetic, so an
/// error always means no partial result was produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EconomicsError {
    /// Caller supplied an argument outside its domain (participation rate,
    /// zero total balance, empty validator set, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validator index beyond the validator list
    #[error("Validator index {index} out of range for {len} validators")]
    IndexOutOfRange { index: usize, len: usize },

    /// Chain configuration cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Checked integer arithmetic failed
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithError),
}

impl EconomicsError {
    /// Shorthand for [`EconomicsError::InvalidArgument`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Stable numeric code for machine-readable output
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidArgument(_) => 2001,
            Self::IndexOutOfRange { .. } => 2002,
            Self::InvalidConfig(_) => 2003,
            Self::Arithmetic(ArithError::Overflow) => 2101,
            Self::Arithmetic(ArithError::DivisionByZero) => 2102,
        }
    }
}
