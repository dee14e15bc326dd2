//! Error types for the framecode core primitives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the exact arithmetic primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    /// A rational was built with a zero denominator.
    #[error("Zero denominator: {numerator}/0")]
    ZeroDenominator {
        /// The numerator that was supplied alongside the zero denominator.
        numerator: i64,
    },

    /// An intermediate result does not fit the 64-bit representation.
    #[error("Rational overflow while computing {operation}")]
    Overflow {
        /// The operation that overflowed.
        operation: String,
    },

    /// Text could not be read as an integer, decimal or `n/d` fraction.
    #[error("Invalid rational literal: {input:?}")]
    Parse {
        /// The literal that failed to parse.
        input: String,
    },

    /// A floating point value is NaN or infinite.
    #[error("Non-finite value: {value}")]
    NotFinite {
        /// The textual form of the rejected value.
        value: String,
    },
}

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an overflow error.
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create a parse error echoing the input.
    pub fn parse(input: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
        }
    }
}
