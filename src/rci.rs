use std::{fmt::Display, num::NonZero};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result,
    price_source::SourceReader, window::RollingWindow,
};

/// Configuration for the Rank Correlation Index ([`Rci`]).
///
/// # Example
///
/// ```
/// use quantedge_bwb::{IndicatorConfig, IndicatorConfigBuilder, RciConfig};
/// use std::num::NonZero;
///
/// assert!(RciConfig::builder().span(NonZero::new(1).unwrap()).build().is_err());
/// assert!(RciConfig::builder().span(NonZero::new(9).unwrap()).build().is_ok());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct RciConfig {
    span: usize,
    source: PriceSource,
}

impl IndicatorConfig for RciConfig {
    type Builder = RciConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RciConfigBuilder {
            span: None,
            source: PriceSource::Close,
        }
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.span
    }
}

impl RciConfig {
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

    /// RCI on closing price.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `span < 2`.
    pub fn close(span: NonZero<usize>) -> Result<Self> {
        Self::builder().span(span).build()
    }
}

impl Display for RciConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RciConfig({}, {})", self.span, self.source)
    }
}

/// Builder for [`RciConfig`].
///
/// Defaults: source = [`PriceSource::Close`]. Span must be at least 2.
pub struct RciConfigBuilder {
    span: Option<usize>,
    source: PriceSource,
}

impl RciConfigBuilder {
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

impl IndicatorConfigBuilder<RciConfig> for RciConfigBuilder {
    fn build(self) -> Result<RciConfig> {
        let span = crate::indicator::required_length("span", self.span)?;
        if span < 2 {
            return Err(Error::invalid_parameter(
                "span",
                format!("rank correlation needs at least 2 points, got {span}"),
            ));
        }

        Ok(RciConfig {
            span,
            source: self.source,
        })
    }
}

/// Rank Correlation Index: Spearman correlation between time order and
/// price order over the trailing window, scaled to ±100.
///
/// ```text
/// RCI = (1 − 6 × Σ(time_rank − price_rank)² / (n × (n² − 1))) × 100
/// ```
///
/// Time rank 1 is the newest bar and price rank 1 the highest price, so a
/// strictly rising window scores +100 and a strictly falling one −100.
/// Equal prices rank the earlier bar first, so a flat window scores −100
/// and a buy level of −90 or above fires when a run of unchanged closes
/// begins.
#[derive(Clone, Debug)]
pub struct Rci {
    config: RciConfig,
    reader: SourceReader,
    window: RollingWindow,
    // (price, age) reused across bars
    ranked: Vec<(Price, usize)>,
    current: Option<Price>,
}

impl Rci {
    #[allow(clippy::cast_precision_loss)]
    fn correlation(&mut self) -> Option<Price> {
        let n = self.config.span;
        self.ranked.clear();
        // oldest first: age n − 1 down to 0, time rank = age + 1
        self.ranked
            .extend(self.window.values()?.zip((0..n).rev()));

        // highest price first; on ties the older bar (larger age) first
        self.ranked
            .sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));

        let d: usize = self
            .ranked
            .iter()
            .enumerate()
            .map(|(price_rank, &(_, age))| age.abs_diff(price_rank).pow(2))
            .sum();

        Some((1.0 - 6.0 * d as f64 / (n * (n * n - 1)) as f64) * 100.0)
    }
}

impl Indicator for Rci {
    type Config = RciConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            window: RollingWindow::new(config.span),
            ranked: Vec::with_capacity(config.span),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        self.window.push(Some(self.reader.read(ohlcv)));
        self.current = self.correlation();
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Rci {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RCI({}, {})", self.config.span, self.config.source)
    }
}
