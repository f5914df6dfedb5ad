use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    EmaWeighting, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource,
    Result, price_source::SourceReader, window::ExpSmoother,
};

/// Configuration for the Exponential Moving Average ([`Ema`]) indicator.
///
/// # Weighting
///
/// [`EmaWeighting::Recursive`] (the default) seeds from the first bar and
/// applies `ema = α × price + (1 − α) × prev_ema` from then on.
/// [`EmaWeighting::Adjusted`] normalises the weights over the finite
/// history seen so far. The two differ noticeably for the first
/// `~2 × span` bars only.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{EmaConfig, EmaWeighting, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = EmaConfig::builder()
///     .span(NonZero::new(20).unwrap())
///     .weighting(EmaWeighting::Adjusted)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.span(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EmaConfig {
    span: usize,
    source: PriceSource,
    weighting: EmaWeighting,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        1
    }
}

impl EmaConfig {
    /// Smoothing span; `α = 2 / (span + 1)`.
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

    #[inline]
    #[must_use]
    pub fn weighting(&self) -> EmaWeighting {
        self.weighting
    }

    /// Recursive EMA on closing price.
    #[must_use]
    pub fn close(span: NonZero<usize>) -> Self {
        Self {
            span: span.get(),
            source: PriceSource::Close,
            weighting: EmaWeighting::Recursive,
        }
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EmaConfig({}, {}, {})",
            self.span, self.source, self.weighting
        )
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: source = [`PriceSource::Close`],
/// weighting = [`EmaWeighting::Recursive`].
/// Span must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    span: Option<usize>,
    source: PriceSource,
    weighting: EmaWeighting,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            span: None,
            source: PriceSource::Close,
            weighting: EmaWeighting::Recursive,
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

    #[inline]
    #[must_use]
    pub fn weighting(mut self, weighting: EmaWeighting) -> Self {
        self.weighting = weighting;
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    fn build(self) -> Result<EmaConfig> {
        Ok(EmaConfig {
            span: crate::indicator::required_length("span", self.span)?,
            source: self.source,
            weighting: self.weighting,
        })
    }
}

/// Exponential Moving Average (EMA).
///
/// A weighted moving average that gives more weight to recent prices, with
/// smoothing factor `α = 2 / (span + 1)`. Defined from the very first bar:
/// the first value equals the first price.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Ema, EmaConfig};
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
/// let mut ema = Ema::new(EmaConfig::close(NonZero::new(3).unwrap()));
///
/// assert_eq!(ema.compute(&Bar(4.0, 1)), Some(4.0));
///
/// // EMA(3) α = 0.5: 8 × 0.5 + 4 × 0.5 = 6.0
/// assert_eq!(ema.compute(&Bar(8.0, 2)), Some(6.0));
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    reader: SourceReader,
    smoother: ExpSmoother,
    current: Option<Price>,
}

impl Indicator for Ema {
    type Config = EmaConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            smoother: ExpSmoother::new(config.span, config.weighting),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let price = self.reader.read(ohlcv);
        self.current = self.smoother.next(Some(price));
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({}, {})", self.config.span, self.config.source)
    }
}
