use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, PriceSource, Result, Series,
    price_source, window::RollingWindow,
};

/// True range of every bar: `max(H − L, |H − prevC|, |L − prevC|)`, with
/// `H − L` on the first bar.
///
/// # Errors
///
/// [`Error::NonIncreasingOpenTime`](crate::Error::NonIncreasingOpenTime)
/// for unordered bars.
pub fn true_range(bars: &[impl Ohlcv]) -> Result<Series> {
    Series::from_bars(bars, PriceSource::TrueRange)
}

/// Configuration for the directional movement index ([`Dmi`]).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct DmiConfig {
    span: usize,
}

impl IndicatorConfig for DmiConfig {
    type Builder = DmiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        DmiConfigBuilder { span: None }
    }

    /// One bar for the first directional movement, then a full window.
    #[inline]
    fn required_bars(&self) -> usize {
        self.span + 1
    }
}

impl DmiConfig {
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    #[must_use]
    pub fn with_span(span: NonZero<usize>) -> Self {
        Self { span: span.get() }
    }

    /// DMI(14).
    #[must_use]
    pub fn default_14() -> Self {
        Self { span: 14 }
    }
}

impl Display for DmiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DmiConfig({})", self.span)
    }
}

/// Builder for [`DmiConfig`]. Span must be set.
pub struct DmiConfigBuilder {
    span: Option<usize>,
}

impl DmiConfigBuilder {
    #[inline]
    #[must_use]
    pub fn span(mut self, span: NonZero<usize>) -> Self {
        self.span.replace(span.get());
        self
    }
}

impl IndicatorConfigBuilder<DmiConfig> for DmiConfigBuilder {
    fn build(self) -> Result<DmiConfig> {
        Ok(DmiConfig {
            span: crate::indicator::required_length("span", self.span)?,
        })
    }
}

/// Directional indicators `+DI` and `−DI`, both on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiValue {
    plus: Price,
    minus: Price,
}

impl DmiValue {
    /// `+DI = 100 × Σ+DM / ΣTR`.
    #[inline]
    #[must_use]
    pub fn plus(&self) -> Price {
        self.plus
    }

    /// `−DI = 100 × Σ−DM / ΣTR`.
    #[inline]
    #[must_use]
    pub fn minus(&self) -> Price {
        self.minus
    }

    /// `100 × |+DI − −DI| / (+DI + −DI)`; `None` when both are zero.
    #[inline]
    #[must_use]
    pub fn dx(&self) -> Option<Price> {
        let total = self.plus + self.minus;
        (total != 0.0).then(|| 100.0 * (self.plus - self.minus).abs() / total)
    }
}

impl Series<DmiValue> {
    #[must_use]
    pub fn plus(&self) -> Series {
        self.project(|v| Some(v.plus))
    }

    #[must_use]
    pub fn minus(&self) -> Series {
        self.project(|v| Some(v.minus))
    }
}

#[derive(Clone, Copy, Debug)]
struct PrevBar {
    high: Price,
    low: Price,
    close: Price,
}

/// `(+DM, −DM)` between two bars. A move counts only when positive and
/// strictly larger than the opposite move, so equal moves count as neither.
#[inline]
fn directional_movement(prev: PrevBar, ohlcv: &impl Ohlcv) -> (Price, Price) {
    let up = ohlcv.high() - prev.high;
    let down = prev.low - ohlcv.low();

    let plus = if up > 0.0 && up > down { up } else { 0.0 };
    let minus = if down > 0.0 && down > up { down } else { 0.0 };
    (plus, minus)
}

/// Directional Movement Index (`+DI` / `−DI`).
///
/// Sums of directional movement and true range over the trailing `span`
/// bars. Undefined during warm-up and wherever the true-range sum is zero.
#[derive(Clone, Debug)]
pub struct Dmi {
    config: DmiConfig,
    prev: Option<PrevBar>,
    plus_dm: RollingWindow,
    minus_dm: RollingWindow,
    true_range: RollingWindow,
    current: Option<DmiValue>,
}

impl Indicator for Dmi {
    type Config = DmiConfig;
    type Output = DmiValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            prev: None,
            plus_dm: RollingWindow::new(config.span),
            minus_dm: RollingWindow::new(config.span),
            true_range: RollingWindow::new(config.span),
            current: None,
        }
    }

    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<DmiValue> {
        let movement = self.prev.map(|prev| directional_movement(prev, ohlcv));
        let range = price_source::true_range(ohlcv, self.prev.map(|prev| prev.close));

        self.plus_dm.push(movement.map(|(plus, _)| plus));
        self.minus_dm.push(movement.map(|(_, minus)| minus));
        self.true_range.push(Some(range));
        self.prev = Some(PrevBar {
            high: ohlcv.high(),
            low: ohlcv.low(),
            close: ohlcv.close(),
        });

        self.current = match (self.plus_dm.sum(), self.minus_dm.sum(), self.true_range.sum()) {
            (Some(plus), Some(minus), Some(range)) if range != 0.0 => Some(DmiValue {
                plus: 100.0 * plus / range,
                minus: 100.0 * minus / range,
            }),
            _ => None,
        };
        self.current
    }

    #[inline]
    fn value(&self) -> Option<DmiValue> {
        self.current
    }
}

impl Display for Dmi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DMI({})", self.config.span)
    }
}

/// Configuration for the Average Directional Index ([`Adx`]).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct AdxConfig {
    span: usize,
}

impl IndicatorConfig for AdxConfig {
    type Builder = AdxConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        AdxConfigBuilder { span: None }
    }

    /// `span + 1` bars until DX is defined, then `span − 1` more to fill
    /// its moving average.
    #[inline]
    fn required_bars(&self) -> usize {
        2 * self.span
    }
}

impl AdxConfig {
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    #[must_use]
    pub fn with_span(span: NonZero<usize>) -> Self {
        Self { span: span.get() }
    }

    /// ADX(14).
    #[must_use]
    pub fn default_14() -> Self {
        Self { span: 14 }
    }
}

impl Display for AdxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdxConfig({})", self.span)
    }
}

/// Builder for [`AdxConfig`]. Span must be set.
pub struct AdxConfigBuilder {
    span: Option<usize>,
}

impl AdxConfigBuilder {
    #[inline]
    #[must_use]
    pub fn span(mut self, span: NonZero<usize>) -> Self {
        self.span.replace(span.get());
        self
    }
}

impl IndicatorConfigBuilder<AdxConfig> for AdxConfigBuilder {
    fn build(self) -> Result<AdxConfig> {
        Ok(AdxConfig {
            span: crate::indicator::required_length("span", self.span)?,
        })
    }
}

/// Average Directional Index: simple moving average of DX over `span`.
///
/// Trend strength on a 0–100 scale regardless of direction.
#[derive(Clone, Debug)]
pub struct Adx {
    config: AdxConfig,
    dmi: Dmi,
    dx: RollingWindow,
    current: Option<Price>,
}

impl Indicator for Adx {
    type Config = AdxConfig;
    type Output = Price;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            dmi: Dmi::new(DmiConfig { span: config.span }),
            dx: RollingWindow::new(config.span),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<Price> {
        let dx = self.dmi.compute(ohlcv).and_then(|di| di.dx());
        self.dx.push(dx);
        self.current = self.dx.mean();
        self.current
    }

    #[inline]
    fn value(&self) -> Option<Price> {
        self.current
    }
}

impl Display for Adx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ADX({})", self.config.span)
    }
}
