use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Result, Series,
    window::RollingWindow,
};

/// Configuration for the [`Stochastics`] oscillator.
///
/// `span` is the high/low lookback of %K, `k_span` the length of both
/// smoothing averages (%K → %D → slow %D).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct StochasticsConfig {
    span: usize,
    k_span: usize,
}

impl IndicatorConfig for StochasticsConfig {
    type Builder = StochasticsConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        StochasticsConfigBuilder {
            span: 14,
            k_span: 3,
        }
    }

    /// Fast %K needs `span` bars, each smoothing stage `k_span − 1` more.
    #[inline]
    fn required_bars(&self) -> usize {
        self.span + 2 * (self.k_span - 1)
    }
}

impl StochasticsConfig {
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    #[inline]
    #[must_use]
    pub fn k_span(&self) -> usize {
        self.k_span
    }

    /// Stochastics(14, 3).
    #[must_use]
    pub fn default_14_3() -> Self {
        Self { span: 14, k_span: 3 }
    }
}

impl Default for StochasticsConfig {
    fn default() -> Self {
        Self::default_14_3()
    }
}

impl Display for StochasticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StochasticsConfig({}, {})", self.span, self.k_span)
    }
}

/// Builder for [`StochasticsConfig`]. Defaults: span 14, `k_span` 3.
pub struct StochasticsConfigBuilder {
    span: usize,
    k_span: usize,
}

impl StochasticsConfigBuilder {
    #[inline]
    #[must_use]
    pub fn span(mut self, span: NonZero<usize>) -> Self {
        self.span = span.get();
        self
    }

    #[inline]
    #[must_use]
    pub fn k_span(mut self, k_span: NonZero<usize>) -> Self {
        self.k_span = k_span.get();
        self
    }
}

impl IndicatorConfigBuilder<StochasticsConfig> for StochasticsConfigBuilder {
    fn build(self) -> Result<StochasticsConfig> {
        Ok(StochasticsConfig {
            span: self.span,
            k_span: self.k_span,
        })
    }
}

/// One bar of [`Stochastics`] output, each line on a 0–100 scale with its
/// own warm-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticsValue {
    fast_k: Option<Price>,
    fast_d: Option<Price>,
    slow_d: Option<Price>,
}

impl StochasticsValue {
    /// `100 × (C − lowest low) / (highest high − lowest low)`.
    #[inline]
    #[must_use]
    pub fn fast_k(&self) -> Option<Price> {
        self.fast_k
    }

    /// Moving average of fast %K.
    #[inline]
    #[must_use]
    pub fn fast_d(&self) -> Option<Price> {
        self.fast_d
    }

    /// Slow %K is fast %D.
    #[inline]
    #[must_use]
    pub fn slow_k(&self) -> Option<Price> {
        self.fast_d
    }

    /// Moving average of slow %K.
    #[inline]
    #[must_use]
    pub fn slow_d(&self) -> Option<Price> {
        self.slow_d
    }
}

impl Series<StochasticsValue> {
    #[must_use]
    pub fn fast_k(&self) -> Series {
        self.project(|v| v.fast_k)
    }

    #[must_use]
    pub fn fast_d(&self) -> Series {
        self.project(|v| v.fast_d)
    }

    #[must_use]
    pub fn slow_k(&self) -> Series {
        self.fast_d()
    }

    #[must_use]
    pub fn slow_d(&self) -> Series {
        self.project(|v| v.slow_d)
    }
}

/// Fast and slow stochastics.
///
/// A bar whose lookback has zero range (every high equals every low) has
/// undefined %K, and the undefined point carries through both averages
/// until it leaves their windows.
#[derive(Clone, Debug)]
pub struct Stochastics {
    config: StochasticsConfig,
    highs: RollingWindow,
    lows: RollingWindow,
    fast_k: RollingWindow,
    fast_d: RollingWindow,
    current: Option<StochasticsValue>,
}

impl Indicator for Stochastics {
    type Config = StochasticsConfig;
    type Output = StochasticsValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            highs: RollingWindow::new(config.span),
            lows: RollingWindow::new(config.span),
            fast_k: RollingWindow::new(config.k_span),
            fast_d: RollingWindow::new(config.k_span),
            current: None,
        }
    }

    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<StochasticsValue> {
        self.highs.push(Some(ohlcv.high()));
        self.lows.push(Some(ohlcv.low()));

        let fast_k = self.lows.min().zip(self.highs.max()).and_then(|(low, high)| {
            let range = high - low;
            (range != 0.0).then(|| 100.0 * (ohlcv.close() - low) / range)
        });
        self.fast_k.push(fast_k);
        let fast_d = self.fast_k.mean();
        self.fast_d.push(fast_d);
        let slow_d = self.fast_d.mean();

        self.current = (fast_k.is_some() || fast_d.is_some() || slow_d.is_some()).then_some(
            StochasticsValue {
                fast_k,
                fast_d,
                slow_d,
            },
        );
        self.current
    }

    #[inline]
    fn value(&self) -> Option<StochasticsValue> {
        self.current
    }
}

impl Display for Stochastics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "STOCH({}, {})", self.config.span, self.config.k_span)
    }
}
