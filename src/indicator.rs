use crate::{Error, Ohlcv, Result, Series, ohlcv::check_open_times};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its
/// parameters. Configs are immutable value types: cheap to copy, compare,
/// and hash, and passed explicitly to every computation.
pub trait IndicatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Number of bars after which every output line of the indicator has
    /// been defined at least once. Shorter inputs are rejected by
    /// [`Indicator::series`].
    fn required_bars(&self) -> usize;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Validates the parameters and builds the config.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] when a parameter is out of range.
    fn build(self) -> Result<Config>;
}

/// A technical indicator fed one bar at a time.
///
/// State lives in the instance only; two instances never share anything,
/// and [`series`](Indicator::series) starts a fresh one per call.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Indicator, Sma, SmaConfig};
/// use std::num::NonZero;
/// # use quantedge_bwb::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, u64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn open_time(&self) -> Timestamp { self.1 }
/// # }
///
/// let bars = [Bar(10.0, 1), Bar(20.0, 2), Bar(30.0, 3)];
/// let sma = Sma::series(SmaConfig::close(NonZero::new(3).unwrap()), &bars).unwrap();
///
/// assert_eq!(sma.values(), &[None, None, Some(20.0)]);
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Per-bar output. `f64` for single-line indicators, a struct for
    /// multi-line ones (e.g. MACD and its signal line).
    type Output: Copy + Send + Sync + Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// Feeds the next bar and returns the indicator value for it, or `None`
    /// while no output line is defined.
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Self::Output>;

    /// Returns the last computed value without advancing state.
    fn value(&self) -> Option<Self::Output>;

    /// Computes the indicator over a whole series.
    ///
    /// The result has exactly one point per bar, carrying the bar's
    /// `open_time`.
    ///
    /// # Errors
    ///
    /// [`Error::NonIncreasingOpenTime`] for unordered bars,
    /// [`Error::InsufficientData`] when fewer than
    /// [`required_bars`](IndicatorConfig::required_bars) bars are supplied.
    fn series(config: Self::Config, bars: &[impl Ohlcv]) -> Result<Series<Self::Output>> {
        check_open_times(bars)?;

        let required = config.required_bars();
        if bars.len() < required {
            tracing::debug!(indicator = %config, required, actual = bars.len(), "series too short");

            return Err(Error::InsufficientData {
                indicator: config.to_string(),
                required,
                actual: bars.len(),
            });
        }

        tracing::trace!(indicator = %config, bars = bars.len(), "computing series");

        let mut indicator = Self::new(config);
        Ok(Series::from_parts(
            bars.iter().map(Ohlcv::open_time).collect(),
            bars.iter().map(|bar| indicator.compute(bar)).collect(),
        ))
    }
}

/// Unwraps a builder length that must have been set.
pub(crate) fn required_length(name: &'static str, length: Option<usize>) -> Result<usize> {
    length.ok_or_else(|| Error::invalid_parameter(name, "is required"))
}
