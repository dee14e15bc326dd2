//! Error types for timecode operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for timecode operations.
pub type Result<T> = std::result::Result<T, TimecodeError>;

/// Broad category of a [`TimecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or out-of-range literal.
    Value,
    /// Construction parameters that contradict each other.
    Initialization,
    /// Unknown kind name, or a value that cannot carry the requested kind.
    Type,
    /// Illegal or undefined operator use.
    Operator,
    /// Frame number that drop-frame counting skips.
    DropFrame,
    /// Time ranges with different frame rates.
    RangeFps,
    /// Time range with an illegal extent.
    RangeValue,
    /// Time range endpoint that cannot be resolved.
    RangeType,
}

/// Errors that can occur during timecode operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimecodeError {
    /// The literal does not match the grammar of its kind, or a field is out
    /// of range.
    #[error("Invalid {kind} timecode {value:?}: {reason}")]
    InvalidValue {
        /// Kind the literal was read as.
        kind: String,
        /// The offending literal.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Frame rate outside the supported range.
    #[error("Invalid frame rate {value}: must lie within [0.01, 999.99]")]
    InvalidFrameRate {
        /// The rejected rate.
        value: String,
    },

    /// Construction parameters disagree with each other.
    #[error("Cannot initialize timecode from {value:?}: {message}")]
    Initialization {
        /// The literal being constructed.
        value: String,
        /// Description of the conflict.
        message: String,
    },

    /// Unknown timecode kind name.
    #[error("Unknown timecode type {name:?}")]
    UnknownKind {
        /// The name that was given.
        name: String,
    },

    /// A value of this shape cannot be read as the requested kind.
    #[error("Timecode type {kind} does not accept value {value}")]
    TypeMismatch {
        /// Requested kind.
        kind: String,
        /// The offending value.
        value: String,
    },

    /// Illegal operator use.
    #[error("Operator error: {message}")]
    Operator {
        /// Description of the operator misuse.
        message: String,
    },

    /// Frame number dropped by drop-frame counting.
    #[error("Drop-frame error for {value:?}: {message}")]
    DropFrame {
        /// The offending literal.
        value: String,
        /// Description of the drop-frame error.
        message: String,
    },

    /// Time range operands with different frame rates.
    #[error("Time range frame rate mismatch: {left} vs {right}")]
    RangeFps {
        /// Frame rate of the left operand.
        left: String,
        /// Frame rate of the right operand.
        right: String,
    },

    /// Time range with an illegal extent.
    #[error("Invalid time range: {message}")]
    RangeValue {
        /// Description of the problem.
        message: String,
    },

    /// Time range endpoint that cannot be resolved.
    #[error("Invalid time range endpoint {value:?}: {message}")]
    RangeType {
        /// The endpoint literal.
        value: String,
        /// Why it could not be resolved.
        message: String,
    },

    /// Error from the exact arithmetic layer.
    #[error(transparent)]
    Core(#[from] framecode_core::Error),
}

impl TimecodeError {
    /// Create an invalid value error.
    pub fn invalid_value(
        kind: impl ToString,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            kind: kind.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an initialization error.
    pub fn initialization(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialization {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(kind: impl ToString, value: impl ToString) -> Self {
        Self::TypeMismatch {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an operator error.
    pub fn operator(message: impl Into<String>) -> Self {
        Self::Operator {
            message: message.into(),
        }
    }

    /// Create a drop-frame error.
    pub fn drop_frame(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DropFrame {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a time range frame rate mismatch error.
    pub fn range_fps(left: impl ToString, right: impl ToString) -> Self {
        Self::RangeFps {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    /// Create a time range value error.
    pub fn range_value(message: impl Into<String>) -> Self {
        Self::RangeValue {
            message: message.into(),
        }
    }

    /// Create a time range endpoint error.
    pub fn range_type(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RangeType {
            value: value.into(),
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidValue { .. } | Self::InvalidFrameRate { .. } | Self::Core(_) => {
                ErrorKind::Value
            }
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::UnknownKind { .. } | Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::Operator { .. } => ErrorKind::Operator,
            Self::DropFrame { .. } => ErrorKind::DropFrame,
            Self::RangeFps { .. } => ErrorKind::RangeFps,
            Self::RangeValue { .. } => ErrorKind::RangeValue,
            Self::RangeType { .. } => ErrorKind::RangeType,
        }
    }
}
