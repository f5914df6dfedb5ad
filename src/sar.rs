use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, Ohlcv, Price, Result, Series,
    error::require_finite,
};

/// Configuration for the parabolic stop-and-reverse ([`Sar`]).
///
/// `init_af` is both the starting acceleration factor and its increment;
/// `max_af` caps it. Valid configs satisfy `0 < init_af <= max_af`.
///
/// Implements `Eq` and `Hash` via bit-level comparison; NaN is rejected
/// by the builder.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{IndicatorConfig, IndicatorConfigBuilder, SarConfig};
///
/// let config = SarConfig::builder().init_af(0.05).max_af(0.25).build().unwrap();
/// assert_eq!(config.to_string(), "SarConfig(0.05, 0.25)");
///
/// assert!(SarConfig::builder().init_af(0.3).max_af(0.2).build().is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SarConfig {
    init_af: f64,
    max_af: f64,
}

impl PartialEq for SarConfig {
    fn eq(&self, other: &Self) -> bool {
        self.init_af.to_bits() == other.init_af.to_bits()
            && self.max_af.to_bits() == other.max_af.to_bits()
    }
}

impl Eq for SarConfig {}

impl Hash for SarConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.init_af.to_bits().hash(state);
        self.max_af.to_bits().hash(state);
    }
}

impl IndicatorConfig for SarConfig {
    type Builder = SarConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SarConfigBuilder {
            init_af: 0.02,
            max_af: 0.2,
        }
    }

    /// Bars 0 and 1 seed the recurrence.
    #[inline]
    fn required_bars(&self) -> usize {
        3
    }
}

impl SarConfig {
    #[inline]
    #[must_use]
    pub fn init_af(&self) -> f64 {
        self.init_af
    }

    #[inline]
    #[must_use]
    pub fn max_af(&self) -> f64 {
        self.max_af
    }

    /// SAR(0.02, 0.2).
    #[must_use]
    pub fn default_002_02() -> Self {
        Self {
            init_af: 0.02,
            max_af: 0.2,
        }
    }
}

impl Default for SarConfig {
    fn default() -> Self {
        Self::default_002_02()
    }
}

impl Display for SarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SarConfig({}, {})", self.init_af, self.max_af)
    }
}

/// Builder for [`SarConfig`]. Defaults: `init_af = 0.02`, `max_af = 0.2`.
pub struct SarConfigBuilder {
    init_af: f64,
    max_af: f64,
}

impl SarConfigBuilder {
    #[inline]
    #[must_use]
    pub fn init_af(mut self, init_af: f64) -> Self {
        self.init_af = init_af;
        self
    }

    #[inline]
    #[must_use]
    pub fn max_af(mut self, max_af: f64) -> Self {
        self.max_af = max_af;
        self
    }
}

impl IndicatorConfigBuilder<SarConfig> for SarConfigBuilder {
    fn build(self) -> Result<SarConfig> {
        let init_af = require_finite("init_af", self.init_af)?;
        let max_af = require_finite("max_af", self.max_af)?;

        if init_af <= 0.0 {
            return Err(Error::invalid_parameter(
                "init_af",
                format!("must be positive, got {init_af}"),
            ));
        }
        if init_af > max_af {
            return Err(Error::invalid_parameter(
                "max_af",
                format!("must be at least init_af {init_af}, got {max_af}"),
            ));
        }

        Ok(SarConfig { init_af, max_af })
    }
}

/// Trend direction of a [`SarValue`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Trend {
    /// SAR trails below price.
    Bull,
    /// SAR trails above price.
    Bear,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One bar of [`Sar`] output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarValue {
    sar: Price,
    trend: Trend,
}

impl SarValue {
    #[inline]
    #[must_use]
    pub fn sar(&self) -> Price {
        self.sar
    }

    /// Trend after this bar, reversal included.
    #[inline]
    #[must_use]
    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// SAR if the trend is bullish.
    #[inline]
    #[must_use]
    pub fn bull(&self) -> Option<Price> {
        (self.trend == Trend::Bull).then_some(self.sar)
    }

    /// SAR if the trend is bearish.
    #[inline]
    #[must_use]
    pub fn bear(&self) -> Option<Price> {
        (self.trend == Trend::Bear).then_some(self.sar)
    }
}

impl Series<SarValue> {
    /// Merged SAR line.
    #[must_use]
    pub fn sar(&self) -> Series {
        self.project(|v| Some(v.sar))
    }

    /// Bull branch; undefined on bearish bars.
    #[must_use]
    pub fn bull(&self) -> Series {
        self.project(|v| v.bull())
    }

    /// Bear branch; undefined on bullish bars.
    #[must_use]
    pub fn bear(&self) -> Series {
        self.project(|v| v.bear())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Extremes {
    high: Price,
    low: Price,
}

/// Parabolic stop-and-reverse.
///
/// Starts bullish with the extremes at the first bar's high and low and
/// the previous SAR at the second bar's close. From the third bar on, the
/// SAR accelerates toward the running extreme and flips sides when price
/// crosses it. While no reversal happens the SAR never penetrates the two
/// prior bars' lows (bull) or highs (bear).
///
/// Bars 0 and 1 are undefined.
#[derive(Clone, Debug)]
pub struct Sar {
    config: SarConfig,
    bars_seen: usize,
    bull: bool,
    af: f64,
    hp: Price,
    lp: Price,
    previous: Price,
    // [one bar back, two bars back]
    prior: [Extremes; 2],
    current: Option<SarValue>,
}

impl Sar {
    fn step(&mut self, high: Price, low: Price) -> Price {
        let extreme = if self.bull { self.hp } else { self.lp };
        let mut sar = self.previous + self.af * (extreme - self.previous);

        if self.bull && low < sar {
            tracing::trace!(sar, low, "bull to bear reversal");
            self.bull = false;
            sar = self.hp;
            self.lp = low;
            self.af = self.config.init_af;
        } else if !self.bull && high > sar {
            tracing::trace!(sar, high, "bear to bull reversal");
            self.bull = true;
            sar = self.lp;
            self.hp = high;
            self.af = self.config.init_af;
        } else if self.bull {
            if high > self.hp {
                self.hp = high;
                self.af = (self.af + self.config.init_af).min(self.config.max_af);
            }
            for prior in self.prior {
                if prior.low < sar {
                    sar = prior.low;
                }
            }
        } else {
            if low < self.lp {
                self.lp = low;
                self.af = (self.af + self.config.init_af).min(self.config.max_af);
            }
            for prior in self.prior {
                if prior.high > sar {
                    sar = prior.high;
                }
            }
        }

        sar
    }
}

impl Indicator for Sar {
    type Config = SarConfig;
    type Output = SarValue;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            bars_seen: 0,
            bull: true,
            af: config.init_af,
            hp: 0.0,
            lp: 0.0,
            previous: 0.0,
            prior: [Extremes::default(); 2],
            current: None,
        }
    }

    fn compute(&mut self, ohlcv: &impl Ohlcv) -> Option<SarValue> {
        let (high, low) = (ohlcv.high(), ohlcv.low());

        self.current = match self.bars_seen {
            0 => {
                self.hp = high;
                self.lp = low;
                None
            }
            1 => {
                self.previous = ohlcv.close();
                None
            }
            _ => {
                let sar = self.step(high, low);
                self.previous = sar;
                Some(SarValue {
                    sar,
                    trend: if self.bull { Trend::Bull } else { Trend::Bear },
                })
            }
        };

        self.prior = [Extremes { high, low }, self.prior[0]];
        self.bars_seen += 1;
        self.current
    }

    #[inline]
    fn value(&self) -> Option<SarValue> {
        self.current
    }
}

impl Display for Sar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SAR({}, {})", self.config.init_af, self.config.max_af)
    }
}
