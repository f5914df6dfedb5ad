use thiserror::Error;

use crate::Timestamp;

/// Errors reported by batch indicator computations and config builders.
///
/// A zero denominator inside a ratio indicator (flat RSI run, zero
/// stochastic range, `+DI = -DI = 0`) is not an error: that single output
/// point is undefined (`None`) and computation continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The series is shorter than the history the indicator needs before
    /// every one of its output lines becomes defined.
    #[error("insufficient data: {indicator} needs {required} bars, got {actual}")]
    InsufficientData {
        /// Display form of the indicator config.
        indicator: String,
        /// Minimum number of bars.
        required: usize,
        /// Number of bars supplied.
        actual: usize,
    },

    /// A parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Bar timestamps are not strictly increasing.
    #[error("open_time must be strictly increasing: bar {index} has {open_time}, previous {previous}")]
    NonIncreasingOpenTime {
        /// Index of the offending bar.
        index: usize,
        /// Open time of the bar before it.
        previous: Timestamp,
        /// Open time of the offending bar.
        open_time: Timestamp,
    },

    /// Two series combined point-wise do not share the same timestamps.
    #[error("misaligned series: {left} points vs {right} points or differing open times")]
    MisalignedSeries {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },
}

impl Error {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Rejects NaN and infinite float parameters.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid_parameter(name, format!("must be finite, got {value}")))
    }
}
