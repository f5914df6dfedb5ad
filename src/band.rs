use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use crate::{
    Deviation, Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price,
    PriceSource, Result, Series, error::require_finite, price_source::SourceReader,
    window::RollingWindow,
};

/// Standard deviation multiplier for one side of a [`Band`].
///
/// Wraps a finite, non-negative `f64`. Zero collapses that side onto the
/// center line.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is sound
/// because NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct Multiplier(f64);

impl Multiplier {
    /// Creates a new multiplier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `value` is negative, NaN or infinite.
    pub fn new(value: f64) -> Result<Self> {
        let value = require_finite("multiplier", value)?;
        if value < 0.0 {
            return Err(Error::invalid_parameter(
                "multiplier",
                format!("must not be negative, got {value}"),
            ));
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Multiplier {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Multiplier {}

impl Hash for Multiplier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self(2.0)
    }
}

impl Display for Multiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for the confidence [`Band`] indicator.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{BandConfig, IndicatorConfig, IndicatorConfigBuilder, Multiplier};
/// use std::num::NonZero;
///
/// // 20 bars, 2σ above, 1.5σ below
/// let config = BandConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .upper(Multiplier::new(2.0).unwrap())
///     .lower(Multiplier::new(1.5).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.lower().value(), 1.5);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BandConfig {
    length: usize,
    source: PriceSource,
    upper: Multiplier,
    lower: Multiplier,
    deviation: Deviation,
}

impl IndicatorConfig for BandConfig {
    type Builder = BandConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BandConfigBuilder::new()
    }

    #[inline]
    fn required_bars(&self) -> usize {
        self.length
    }
}

impl BandConfig {
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> PriceSource {
        self.source
    }

    /// Multiplier applied above the center line.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Multiplier {
        self.upper
    }

    /// Multiplier applied below the center line.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Multiplier {
        self.lower
    }

    #[inline]
    #[must_use]
    pub fn deviation(&self) -> Deviation {
        self.deviation
    }

    /// Band(20, Close, 2σ / 2σ), sample deviation.
    #[must_use]
    pub fn default_20() -> Self {
        Self {
            length: 20,
            source: PriceSource::Close,
            upper: Multiplier::default(),
            lower: Multiplier::default(),
            deviation: Deviation::Sample,
        }
    }
}

impl Display for BandConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BandConfig({}, {}, +{}, -{}, {})",
            self.length, self.source, self.upper, self.lower, self.deviation
        )
    }
}

/// Builder for [`BandConfig`].
///
/// Defaults: source = [`PriceSource::Close`], both multipliers `2.0`,
/// [`Deviation::Sample`]. Length must be set.
pub struct BandConfigBuilder {
    length: Option<usize>,
    source: PriceSource,
    upper: Multiplier,
    lower: Multiplier,
    deviation: Deviation,
}

impl BandConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            source: PriceSource::Close,
            upper: Multiplier::default(),
            lower: Multiplier::default(),
            deviation: Deviation::Sample,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length.get());
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
    pub fn upper(mut self, multiplier: Multiplier) -> Self {
        self.upper = multiplier;
        self
    }

    #[inline]
    #[must_use]
    pub fn lower(mut self, multiplier: Multiplier) -> Self {
        self.lower = multiplier;
        self
    }

    /// Same multiplier on both sides.
    #[inline]
    #[must_use]
    pub fn multiplier(self, multiplier: Multiplier) -> Self {
        self.upper(multiplier).lower(multiplier)
    }

    #[inline]
    #[must_use]
    pub fn deviation(mut self, deviation: Deviation) -> Self {
        self.deviation = deviation;
        self
    }
}

impl IndicatorConfigBuilder<BandConfig> for BandConfigBuilder {
    fn build(self) -> Result<BandConfig> {
        let length = crate::indicator::required_length("length", self.length)?;
        if self.deviation == Deviation::Sample && length < 2 {
            return Err(Error::invalid_parameter(
                "length",
                "sample deviation needs a window of at least 2",
            ));
        }

        Ok(BandConfig {
            length,
            source: self.source,
            upper: self.upper,
            lower: self.lower,
            deviation: self.deviation,
        })
    }
}

/// Band output: upper, middle and lower lines.
///
/// ```text
/// upper  = SMA + k_upper × σ
/// middle = SMA
/// lower  = SMA − k_lower × σ
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandValue {
    upper: Price,
    middle: Price,
    lower: Price,
}

impl BandValue {
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// SMA of the window.
    #[inline]
    #[must_use]
    pub fn middle(&self) -> Price {
        self.middle
    }

    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// `upper − lower`.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Display for BandValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Band(u: {}, m: {}, l: {})",
            self.upper, self.middle, self.lower
        )
    }
}

impl Series<BandValue> {
    #[must_use]
    pub fn upper(&self) -> Series {
        self.project(|v| Some(v.upper))
    }

    #[must_use]
    pub fn middle(&self) -> Series {
        self.project(|v| Some(v.middle))
    }

    #[must_use]
    pub fn lower(&self) -> Series {
        self.project(|v| Some(v.lower))
    }
}

/// Confidence band (Bollinger-style).
///
/// A simple moving average with lines offset by independent multiples of
/// the window's standard deviation. All three lines share the SMA's
/// warm-up prefix.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Band, BandConfig};
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
/// let mut band = Band::new(BandConfig::default_20());
/// # for i in 1..=19 { band.compute(&Bar(100.0, i)); }
///
/// if let Some(value) = band.compute(&Bar(100.0, 20)) {
///     assert_eq!(value.width(), 0.0);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Band {
    config: BandConfig,
    reader: SourceReader,
    window: RollingWindow,
    current: Option<BandValue>,
}

impl Indicator for Band {
    type Config = BandConfig;
    type Output = BandValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            reader: SourceReader::new(config.source),
            window: RollingWindow::new(config.length),
            current: None,
        }
    }

    #[inline]
    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<BandValue> {
        self.window.push(Some(self.reader.read(ohlcv)));

        self.current = self
            .window
            .mean()
            .zip(self.window.std_dev(self.config.deviation))
            .map(|(middle, spread)| BandValue {
                upper: middle + spread * self.config.upper.0,
                middle,
                lower: middle - spread * self.config.lower.0,
            });
        self.current
    }

    #[inline]
    fn value(&self) -> Option<BandValue> {
        self.current
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BAND({}, {}, +{}, -{})",
            self.config.length, self.config.source, self.config.upper, self.config.lower
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, bar, closes};

    fn band(length: usize, upper: f64, lower: f64) -> Band {
        Band::new(
            BandConfig::builder()
                .length(NonZero::new(length).unwrap())
                .upper(Multiplier::new(upper).unwrap())
                .lower(Multiplier::new(lower).unwrap())
                .build()
                .unwrap(),
        )
    }

    fn assert_band(value: Option<BandValue>, upper: f64, middle: f64, lower: f64) {
        let v = value.expect("expected Some(BandValue)");
        assert!((v.upper() - upper).abs() < 1e-10, "upper: expected {upper}, got {}", v.upper());
        assert!((v.middle() - middle).abs() < 1e-10, "middle: expected {middle}, got {}", v.middle());
        assert!((v.lower() - lower).abs() < 1e-10, "lower: expected {lower}, got {}", v.lower());
    }

    mod computation {
        use super::*;

        #[test]
        fn none_until_window_full() {
            let mut band = band(3, 2.0, 2.0);
            assert!(band.compute(&bar(10.0, 1)).is_none());
            assert!(band.compute(&bar(20.0, 2)).is_none());
        }

        #[test]
        fn sample_deviation_bands() {
            // [3, 5]: mean 4, sample σ = √2
            let mut band = band(2, 2.0, 2.0);
            band.compute(&bar(3.0, 1));
            let sd = 2.0_f64.sqrt();
            assert_band(band.compute(&bar(5.0, 2)), 4.0 + 2.0 * sd, 4.0, 4.0 - 2.0 * sd);
        }

        #[test]
        fn population_deviation_bands() {
            // [3, 5]: mean 4, population σ = 1
            let config = BandConfig::builder()
                .length(NonZero::new(2).unwrap())
                .deviation(Deviation::Population)
                .build()
                .unwrap();
            let mut band = Band::new(config);
            band.compute(&bar(3.0, 1));
            assert_band(band.compute(&bar(5.0, 2)), 6.0, 4.0, 2.0);
        }

        #[test]
        fn lower_line_sits_below_center() {
            let bars = closes(&[10.0, 12.0, 11.0, 14.0, 13.0, 15.0]);
            let config = BandConfig::builder()
                .length(NonZero::new(3).unwrap())
                .build()
                .unwrap();
            let s = Band::series(config, &bars).unwrap();

            for v in s.values().iter().flatten() {
                assert!(v.lower() <= v.middle() && v.middle() <= v.upper());
            }
        }

        #[test]
        fn independent_multipliers() {
            let mut band = band(2, 1.0, 3.0);
            band.compute(&bar(3.0, 1));
            let v = band.compute(&bar(5.0, 2)).unwrap();
            assert_approx!(v.middle() - v.lower(), 3.0 * (v.upper() - v.middle()));
        }

        #[test]
        fn zero_multiplier_collapses_side() {
            let mut band = band(2, 0.0, 2.0);
            band.compute(&bar(3.0, 1));
            let v = band.compute(&bar(5.0, 2)).unwrap();
            assert_approx!(v.upper(), v.middle());
        }

        #[test]
        fn constant_input_zero_width() {
            let mut band = band(3, 2.0, 2.0);
            band.compute(&bar(10.0, 1));
            band.compute(&bar(10.0, 2));
            assert_band(band.compute(&bar(10.0, 3)), 10.0, 10.0, 10.0);
        }
    }

    mod lines {
        use super::*;

        #[test]
        fn series_exposes_each_line() {
            let bars = closes(&[3.0, 5.0, 7.0]);
            let config = BandConfig::builder()
                .length(NonZero::new(2).unwrap())
                .deviation(Deviation::Population)
                .build()
                .unwrap();
            let s = Band::series(config, &bars).unwrap();

            assert_eq!(s.upper().values(), &[None, Some(6.0), Some(8.0)]);
            assert_eq!(s.middle().values(), &[None, Some(4.0), Some(6.0)]);
            assert_eq!(s.lower().values(), &[None, Some(2.0), Some(4.0)]);
        }
    }

    mod config {
        use super::*;

        #[test]
        fn multiplier_rejects_negative_and_nan() {
            assert!(Multiplier::new(-0.5).is_err());
            assert!(Multiplier::new(f64::NAN).is_err());
            assert!(Multiplier::new(f64::INFINITY).is_err());
            assert!(Multiplier::new(0.0).is_ok());
        }

        #[test]
        fn sample_deviation_needs_two_bars() {
            assert!(matches!(
                BandConfig::builder().length(NonZero::new(1).unwrap()).build(),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
            assert!(BandConfig::builder()
                .length(NonZero::new(1).unwrap())
                .deviation(Deviation::Population)
                .build()
                .is_ok());
        }

        #[test]
        fn defaults() {
            let config = BandConfig::builder()
                .length(NonZero::new(20).unwrap())
                .build()
                .unwrap();
            assert_eq!(config, BandConfig::default_20());
            assert_eq!(config.to_string(), "BandConfig(20, Close, +2, -2, Sample)");
        }
    }
}
