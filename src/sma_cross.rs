use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result, Series,
    price_source::SourceReader, window::RollingWindow,
};

/// Configuration for the [`SmaCross`] indicator: two simple moving averages
/// over the same source.
///
/// `short` and `long` are names, not constraints. Equal lengths are valid
/// and produce identical lines.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct SmaCrossConfig {
    short: usize,
    long: usize,
    source: PriceSource,
}

impl IndicatorConfig for SmaCrossConfig {
    type Builder = SmaCrossConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaCrossConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.short.max(self.long)
    }
}

impl SmaCrossConfig {
    #[inline]
    #[must_use]
    pub fn short(&self) -> usize {
        self.short
    }

    #[inline]
    #[must_use]
    pub fn long(&self) -> usize {
        self.long
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// SMA pair on closing price.
    #[must_use]
    pub fn close(short: NonZero<usize>, long: NonZero<usize>) -> Self {
        Self {
            short: short.get(),
            long: long.get(),
            source: PriceSource::Close,
        }
    }
}

impl Display for SmaCrossConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SmaCrossConfig({}, {}, {})",
            self.short, self.long, self.source
        )
    }
}

/// Builder for [`SmaCrossConfig`].
///
/// Defaults: source = [`PriceSource::Close`]. Both lengths must be set.
pub struct SmaCrossConfigBuilder {
    short: Option<usize>,
    long: Option<usize>,
    source: PriceSource,
}

impl SmaCrossConfigBuilder {
    fn new() -> Self {
        Self {
            short: None,
            long: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    #[must_use]
    pub fn short(mut self, length: NonZero<usize>) -> Self {
        self.short.replace(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn long(mut self, length: NonZero<usize>) -> Self {
        self.long.replace(length.get());
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.source = source;
        self
    }
}

impl IndicatorConfigBuilder<SmaCrossConfig> for SmaCrossConfigBuilder {
    fn build(self) -> Result<SmaCrossConfig> {
        Ok(SmaCrossConfig {
            short: crate::indicator::required_length("short", self.short)?,
            long: crate::indicator::required_length("long", self.long)?,
            source: self.source,
        })
    }
}

/// One bar of [`SmaCross`] output. Each line warms up on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaCrossValue {
    short: Option<Price>,
    long: Option<Price>,
}

impl SmaCrossValue {
    #[inline]
    #[must_use]
    pub fn short(&self) -> Option<Price> {
        self.short
    }

    #[inline]
    #[must_use]
    pub fn long(&self) -> Option<Price> {
        self.long
    }
}

impl Series<SmaCrossValue> {
    /// Short SMA line.
    #[must_use]
    pub fn short(&self) -> Series {
        self.project(|v| v.short)
    }

    /// Long SMA line.
    #[must_use]
    pub fn long(&self) -> Series {
        self.project(|v| v.long)
    }
}

/// A pair of simple moving averages over one source, for crossover rules.
#[derive(Clone, Debug)]
pub struct SmaCross {
    config: SmaCrossConfig,
    reader: SourceReader,
    short: RollingWindow,
    long: RollingWindow,
    current: Option<SmaCrossValue>,
}

impl Indicator for SmaCross {
    type Config = SmaCrossConfig;
    type Output = SmaCrossValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            short: RollingWindow::new(config.short),
            long: RollingWindow::new(config.long),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<SmaCrossValue> {
        let price = Some(self.reader.read(ohlcv));
        self.short.push(price);
        self.long.push(price);

        let value = SmaCrossValue {
            short: self.short.mean(),
            long: self.long.mean(),
        };
        self.current = (value.short.is_some() || value.long.is_some()).then_some(value);
        self.current
    }

    #[inline]
    fn value(&self) -> Option<SmaCrossValue> {
        self.current
    }
}

impl Display for SmaCross {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SMA_CROSS({}, {}, {})",
            self.config.short, self.config.long, self.config.source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::closes;

    fn config(short: usize, long: usize) -> SmaCrossConfig {
        SmaCrossConfig::close(NonZero::new(short).unwrap(), NonZero::new(long).unwrap())
    }

    mod lines {
        use super::*;

        #[test]
        fn each_line_has_its_own_prefix() {
            let bars = closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
            let s = SmaCross::series(config(2, 4), &bars).unwrap();

            assert_eq!(s.short().values(), &[None, Some(1.5), Some(2.5), Some(3.5), Some(4.5)]);
            assert_eq!(s.long().values(), &[None, None, None, Some(2.5), Some(3.5)]);
            assert_eq!(s.get(0), None);
        }

        #[test]
        fn equal_lengths_give_identical_lines() {
            let bars = closes(&[3.0, 1.0, 4.0, 1.0, 5.0]);
            let s = SmaCross::series(config(3, 3), &bars).unwrap();
            assert_eq!(s.short(), s.long());
        }
    }

    mod config {
        use super::*;
        use crate::Error;

        #[test]
        fn required_bars_is_longer_window() {
            assert_eq!(config(25, 5).required_bars(), 25);
        }

        #[test]
        fn builder_requires_both_lengths() {
            assert!(matches!(
                SmaCrossConfig::builder()
                    .short(NonZero::new(5).unwrap())
                    .build(),
                Err(Error::InvalidParameter { name: "long", .. })
            ));
        }

        #[test]
        fn display() {
            assert_eq!(config(5, 25).to_string(), "SmaCrossConfig(5, 25, Close)");
        }
    }
}
