use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result,
    price_source::SourceReader, window::RollingWindow,
};

/// Configuration for the moving-average estrangement ratio ([`Maer`]).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MaerConfig {
    span: usize,
    source: PriceSource,
}

impl IndicatorConfig for MaerConfig {
    type Builder = MaerConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MaerConfigBuilder {
            span: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.span
    }
}

impl MaerConfig {
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

    /// MAER on closing price.
    #[must_use]
    pub fn close(span: NonZero<usize>) -> Self {
        Self {
            span: span.get(),
            source: PriceSource::Close,
        }
    }
}

impl Display for MaerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MaerConfig({}, {})", self.span, self.source)
    }
}

/// Builder for [`MaerConfig`]. Defaults: source = [`PriceSource::Close`].
pub struct MaerConfigBuilder {
    span: Option<usize>,
    source: PriceSource,
}

impl MaerConfigBuilder {
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

impl IndicatorConfigBuilder<MaerConfig> for MaerConfigBuilder {
    fn build(self) -> Result<MaerConfig> {
        Ok(MaerConfig {
            span: crate::indicator::required_length("span", self.span)?,
            source: self.source,
        })
    }
}

/// Moving-average estrangement ratio: percentage distance of price from
/// its simple moving average, `100 × (P − SMA) / SMA`.
///
/// Undefined during the SMA warm-up and where the SMA is zero.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Maer, MaerConfig};
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
/// let mut maer = Maer::new(MaerConfig::close(NonZero::new(2).unwrap()));
///
/// assert_eq!(maer.compute(&Bar(90.0, 1)), None);
/// // SMA 100, price 110
/// assert_eq!(maer.compute(&Bar(110.0, 2)), Some(10.0));
/// ```
#[derive(Clone, Debug)]
pub struct Maer {
    config: MaerConfig,
    reader: SourceReader,
    window: RollingWindow,
    current: Option<Price>,
}

impl Indicator for Maer {
    type Config = MaerConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            window: RollingWindow::new(config.span),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let price = self.reader.read(ohlcv);
        self.window.push(Some(price));

        self.current = self
            .window
            .mean()
            .filter(|&sma| sma != 0.0)
            .map(|sma| 100.0 * (price - sma) / sma);
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Maer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MAER({}, {})", self.config.span, self.config.source)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::closes;

    fn series(span: usize, prices: &[f64]) -> crate::Series {
        Maer::series(MaerConfig::close(NonZero::new(span).unwrap()), &closes(prices)).unwrap()
    }

    #[test]
    fn below_average_is_negative() {
        // SMA 100, price 95
        assert_eq!(series(2, &[105.0, 95.0]).last(), Some(-5.0));
    }

    #[test]
    fn constant_price_is_zero() {
        let s = series(3, &[50.0; 5]);
        assert_eq!(s.values(), &[None, None, Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn zero_average_is_undefined() {
        assert_eq!(series(2, &[-1.0, 1.0, 3.0]).values(), &[None, None, Some(50.0)]);
    }
}
