use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    EmaWeighting, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    Result, Series, price_source::SourceReader, window::ExpSmoother,
};

/// Configuration for the [`Macd`] indicator.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig};
/// use std::num::NonZero;
///
/// let config = MacdConfig::builder()
///     .short(NonZero::new(6).unwrap())
///     .long(NonZero::new(13).unwrap())
///     .signal(NonZero::new(5).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.to_string(), "MacdConfig(6, 13, 5, Close)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct MacdConfig {
    short: usize,
    long: usize,
    signal: usize,
    source: PriceSource,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        MacdConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        1
    }
}

impl MacdConfig {
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

    /// Span of the signal line EMA.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// MACD(12, 26, 9) on closing price.
    #[must_use]
    pub fn default_12_26_9() -> Self {
        Self {
            short: 12,
            long: 26,
            signal: 9,
            source: PriceSource::Close,
        }
    }
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self::default_12_26_9()
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {})",
            self.short, self.long, self.signal, self.source
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// Starts from 12 / 26 / 9 on [`PriceSource::Close`].
pub struct MacdConfigBuilder {
    config: MacdConfig,
}

impl MacdConfigBuilder {
    fn new() -> Self {
        Self {
            config: MacdConfig::default_12_26_9(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short(mut self, span: NonZero<usize>) -> Self {
        self.config.short = span.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn long(mut self, span: NonZero<usize>) -> Self {
        self.config.long = span.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn signal(mut self, span: NonZero<usize>) -> Self {
        self.config.signal = span.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn source(mut self, source: PriceSource) -> Self {
        self.config.source = source;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    fn build(self) -> Result<MacdConfig> {
        Ok(self.config)
    }
}

/// One bar of [`Macd`] output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    macd: Price,
    signal: Price,
}

impl MacdValue {
    /// `EMA(short) − EMA(long)`.
    #[inline]
    #[must_use]
    pub fn macd(&self) -> Price {
        self.macd
    }

    /// EMA of the MACD line.
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Price {
        self.signal
    }

    /// `macd − signal`.
    #[inline]
    #[must_use]
    pub fn histogram(&self) -> Price {
        self.macd - self.signal
    }
}

impl Series<MacdValue> {
    #[must_use]
    pub fn macd(&self) -> Series {
        self.project(|v| Some(v.macd))
    }

    #[must_use]
    pub fn signal(&self) -> Series {
        self.project(|v| Some(v.signal))
    }

    #[must_use]
    pub fn histogram(&self) -> Series {
        self.project(|v| Some(v.histogram()))
    }
}

/// Moving Average Convergence/Divergence.
///
/// All three EMAs use recursive weighting seeded from the first bar, so
/// both lines are defined from index 0. A constant input gives zero on
/// both lines everywhere.
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
    reader: SourceReader,
    short: ExpSmoother,
    long: ExpSmoother,
    signal: ExpSmoother,
    current: Option<MacdValue>,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Output = MacdValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            short: ExpSmoother::new(config.short, EmaWeighting::Recursive),
            long: ExpSmoother::new(config.long, EmaWeighting::Recursive),
            signal: ExpSmoother::new(config.signal, EmaWeighting::Recursive),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<MacdValue> {
        let price = Some(self.reader.read(ohlcv));
        let macd = self
            .short
            .next(price)
            .zip(self.long.next(price))
            .map(|(short, long)| short - long);
        let signal = self.signal.next(macd);

        self.current = macd.zip(signal).map(|(macd, signal)| MacdValue { macd, signal });
        self.current
    }

    #[inline]
    fn value(&self) -> Option<MacdValue> {
        self.current
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {}, {})",
            self.config.short, self.config.long, self.config.signal, self.config.source
        )
    }
}
