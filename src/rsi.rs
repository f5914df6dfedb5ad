use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result,
    price_source::SourceReader, window::RollingWindow,
};

/// Configuration for the Relative Strength Index ([`Rsi`]) indicator.
///
/// Output begins at bar `span + 1`: the first bar has no price change.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{IndicatorConfig, RsiConfig};
/// use std::num::NonZero;
///
/// let config = RsiConfig::close(NonZero::new(14).unwrap());
/// assert_eq!(config.required_bars(), 15);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RsiConfig {
    span: usize,
    source: PriceSource,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.span + 1
    }
}

impl RsiConfig {
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// RSI on closing price.
    #[must_use]
    pub fn close(span: NonZero<usize>) -> Self {
        Self {
            span: span.get(),
            source: PriceSource::Close,
        }
    }
}

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({}, {})", self.span, self.source)
    }
}

/// Builder for [`RsiConfig`].
///
/// Defaults: source = [`PriceSource::Close`].
/// Span must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct RsiConfigBuilder {
    span: Option<usize>,
    source: PriceSource,
}

impl RsiConfigBuilder {
    fn new() -> Self {
        Self {
            span: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn span(mut self, span: NonZero<usize>) -> Self {
        self.span.replace(span.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    fn build(self) -> Result<RsiConfig> {
        Ok(RsiConfig {
            span: crate::indicator::required_length("span", self.span)?,
            source: self.source,
        })
    }
}

/// Relative Strength Index (RSI) on a 0–100 scale.
///
/// ```text
/// RSI = 100 × Σgain / (Σgain + Σloss)
/// ```
///
/// over the last `span` price changes, with plain rolling sums rather than
/// Wilder smoothing. A flat window (no gains, no losses) is undefined.
/// Divide by 100 for the fractional convention.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Rsi, RsiConfig};
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
/// let mut rsi = Rsi::new(RsiConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(rsi.compute(&Bar(10.0, 1)), None);
/// assert_eq!(rsi.compute(&Bar(13.0, 2)), None);
/// // gains 3, losses 1
/// assert_eq!(rsi.compute(&Bar(12.0, 3)), Some(75.0));
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
    reader: SourceReader,
    prev: Option<Price>,
    gains: RollingWindow,
    losses: RollingWindow,
    current: Option<Price>,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            prev: None,
            gains: RollingWindow::new(config.span),
            losses: RollingWindow::new(config.span),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let price = self.reader.read(ohlcv);
        let change = self.prev.replace(price).map(|prev| price - prev);

        self.gains.push(change.map(|c| c.max(0.0)));
        self.losses.push(change.map(|c| (-c).max(0.0)));

        self.current = self
            .gains
            .sum()
            .zip(self.losses.sum())
            .and_then(|(gain, loss)| {
                let total = gain + loss;
                (total != 0.0).then(|| 100.0 * gain / total)
            });
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({}, {})", self.config.span, self.config.source)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{bar, closes};

    fn rsi(span: usize) -> Rsi {
        Rsi::new(RsiConfig::close(NonZero::new(span).unwrap()))
    }

    fn series(span: usize, prices: &[f64]) -> crate::Series {
        Rsi::series(RsiConfig::close(NonZero::new(span).unwrap()), &closes(prices)).unwrap()
    }

    mod warm_up {
        use super::*;

        #[test]
        fn first_value_at_span() {
            let s = series(3, &[1.0, 2.0, 3.0, 2.0, 4.0]);
            assert_eq!(s.first_defined(), Some(3));
        }

        #[test]
        fn value_matches_last_compute() {
            let mut rsi = rsi(2);
            rsi.compute(&bar(1.0, 1));
            rsi.compute(&bar(2.0, 2));
            let v = rsi.compute(&bar(1.5, 3));
            assert_eq!(rsi.value(), v);
        }
    }

    mod values {
        use super::*;

        #[test]
        fn all_gains_gives_100() {
            assert_eq!(series(3, &[1.0, 2.0, 3.0, 4.0]).last(), Some(100.0));
        }

        #[test]
        fn all_losses_gives_0() {
            assert_eq!(series(3, &[4.0, 3.0, 2.0, 1.0]).last(), Some(0.0));
        }

        #[test]
        fn equal_gains_and_losses_gives_50() {
            assert_eq!(series(2, &[10.0, 12.0, 10.0]).last(), Some(50.0));
        }

        #[test]
        fn drops_changes_leaving_window() {
            // changes +3, −1, +2: window of 2 sees −1, +2
            let s = series(2, &[10.0, 13.0, 12.0, 14.0]);
            assert_eq!(s.get(2), Some(75.0));
            assert_eq!(s.get(3), Some(200.0 / 3.0));
        }

        #[test]
        fn always_within_scale() {
            let s = series(4, &[5.0, 7.0, 6.0, 9.0, 3.0, 4.0, 8.0, 8.5, 2.0, 1.0]);
            for v in s.values().iter().flatten() {
                assert!((0.0..=100.0).contains(v));
            }
        }
    }

    mod flat_price {
        use super::*;

        #[test]
        fn flat_window_is_undefined() {
            let s = series(3, &[5.0, 6.0, 6.0, 6.0, 6.0, 7.0]);
            assert_eq!(s.get(3), Some(100.0));
            assert_eq!(s.get(4), None);
            assert_eq!(s.get(5), Some(100.0));
        }
    }

    mod config {
        use super::*;
        use crate::Error;

        #[test]
        fn builder_requires_span() {
            assert!(matches!(
                RsiConfig::builder().build(),
                Err(Error::InvalidParameter { name: "span", .. })
            ));
        }

        #[test]
        fn display() {
            assert_eq!(RsiConfig::close(NonZero::new(14).unwrap()).to_string(), "RsiConfig(14, Close)");
            assert_eq!(rsi(14).to_string(), "RSI(14, Close)");
        }
    }
}
