use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Result,
    window::RollingWindow,
};

/// Configuration for the [`Psychological`] line.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct PsychologicalConfig {
    span: usize,
}

impl IndicatorConfig for PsychologicalConfig {
    type Builder = PsychologicalConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        PsychologicalConfigBuilder { span: None }
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.span + 1
    }
}

impl PsychologicalConfig {
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    #[must_use]
    pub fn with_span(span: NonZero<usize>) -> Self {
        Self { span: span.get() }
    }
}

impl Display for PsychologicalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PsychologicalConfig({})", self.span)
    }
}

/// Builder for [`PsychologicalConfig`]. Span must be set.
pub struct PsychologicalConfigBuilder {
    span: Option<usize>,
}

impl PsychologicalConfigBuilder {
    #[inline]
    #[must_use]
    pub fn span(mut self, span: NonZero<usize>) -> Self {
        self.span.replace(span.get());
        self
    }
}

impl IndicatorConfigBuilder<PsychologicalConfig> for PsychologicalConfigBuilder {
    fn build(self) -> Result<PsychologicalConfig> {
        Ok(PsychologicalConfig {
            span: crate::indicator::required_length("span", self.span)?,
        })
    }
}

/// Psychological line: percentage of up-closes among the last `span` bars.
///
/// A bar counts when its close is strictly above the previous close. The
/// first bar has no previous close, so the first value lands at index
/// `span`.
#[derive(Clone, Debug)]
pub struct Psychological {
    config: PsychologicalConfig,
    prev_close: Option<Price>,
    up_days: RollingWindow,
    current: Option<Price>,
}

impl Indicator for Psychological {
    type Config = PsychologicalConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            prev_close: None,
            up_days: RollingWindow::new(config.span),
            current: None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let close = ohlcv.close();
        let up = self
            .prev_close
            .replace(close)
            .map(|prev| if close > prev { 1.0 } else { 0.0 });

        self.up_days.push(up);
        self.current = self
            .up_days
            .sum()
            .map(|count| 100.0 * count / self.config.span as f64);
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Psychological {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PSY({})", self.config.span)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::closes;

    fn series(span: usize, prices: &[f64]) -> crate::Series {
        let config = PsychologicalConfig::with_span(NonZero::new(span).unwrap());
        Psychological::series(config, &closes(prices)).unwrap()
    }

    #[test]
    fn first_value_at_span() {
        let s = series(3, &[1.0, 2.0, 1.0, 3.0, 4.0]);
        assert_eq!(s.values()[..3], [None, None, None]);
        // up, down, up
        assert_eq!(s.get(3), Some(200.0 / 3.0));
        // down, up, up
        assert_eq!(s.get(4), Some(200.0 / 3.0));
    }

    #[test]
    fn unchanged_close_is_not_up() {
        let s = series(2, &[5.0, 5.0, 5.0]);
        assert_eq!(s.last(), Some(0.0));
    }

    #[test]
    fn rising_closes_give_100() {
        assert_eq!(series(4, &[1.0, 2.0, 3.0, 4.0, 5.0]).last(), Some(100.0));
    }

    #[test]
    fn span_plus_one_bars_required() {
        let config = PsychologicalConfig::with_span(NonZero::new(12).unwrap());
        assert_eq!(config.required_bars(), 13);
        assert!(Psychological::series(config, &closes(&[1.0; 12])).is_err());
    }
}
