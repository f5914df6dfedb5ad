//! Crossover rules that turn indicator lines into per-bar buy / close
//! decisions.
//!
//! Every [`Rule`] pairs one indicator config with one decision rule. The
//! output is a [`Signals`] value aligned with the input bars, ready for a
//! backtest loop to consume.

use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    num::NonZero,
};

use crate::{
    Band, BandConfig, Dmi, DmiConfig, Error, IndicatorConfig, IndicatorConfigBuilder, Macd,
    MacdConfig, Maer, MaerConfig, Multiplier, Ohlcv, Price, Psychological, PsychologicalConfig,
    Rci, RciConfig, Result, Rsi, RsiConfig, Sar, SarConfig, Series, SmaCross, SmaCrossConfig,
    Stochastics, StochasticsConfig, Timestamp, error::require_finite,
};

/// `true` at `i` when `a` moves from strictly below `b` at `i − 1` to
/// strictly above it at `i`. Any undefined operand gives `false`.
///
/// Compare against a constant with [`Series::level`].
///
/// # Errors
///
/// [`Error::MisalignedSeries`] if the two series have different open times.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Series, crossover};
///
/// let rsi = Series::from_values([40.0, 25.0, 35.0]);
/// let buy = crossover(&rsi.level(30.0), &rsi).unwrap();
///
/// assert_eq!(buy, vec![false, true, false]);
/// ```
pub fn crossover(a: &Series, b: &Series) -> Result<Vec<bool>> {
    let order = a.zip_with(b, |a, b| a.partial_cmp(&b))?;
    let order = order.values();

    Ok((0..order.len())
        .map(|i| {
            i > 0 && order[i - 1] == Some(Ordering::Less) && order[i] == Some(Ordering::Greater)
        })
        .collect())
}

impl<T: Copy> Series<T> {
    /// Constant line at `value`, aligned with this series.
    #[must_use]
    pub fn level(&self, value: Price) -> Series {
        Series::from_parts(self.open_times().to_vec(), vec![Some(value); self.len()])
    }
}

/// Buy / sell levels for the oscillator rules. `buy < sell`.
///
/// Implements `Eq` and `Hash` via bit-level comparison; NaN is rejected at
/// construction.
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    buy: f64,
    sell: f64,
}

impl Thresholds {
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if either level is not finite or
    /// `buy >= sell`.
    pub fn new(buy: f64, sell: f64) -> Result<Self> {
        let buy = require_finite("buy", buy)?;
        let sell = require_finite("sell", sell)?;

        if buy >= sell {
            return Err(Error::invalid_parameter(
                "sell",
                format!("must be above the buy level {buy}, got {sell}"),
            ));
        }

        Ok(Self { buy, sell })
    }

    #[inline]
    #[must_use]
    pub fn buy(&self) -> f64 {
        self.buy
    }

    #[inline]
    #[must_use]
    pub fn sell(&self) -> f64 {
        self.sell
    }
}

impl PartialEq for Thresholds {
    fn eq(&self, other: &Self) -> bool {
        self.buy.to_bits() == other.buy.to_bits() && self.sell.to_bits() == other.sell.to_bits()
    }
}

impl Eq for Thresholds {}

impl Hash for Thresholds {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buy.to_bits().hash(state);
        self.sell.to_bits().hash(state);
    }
}

impl Display for Thresholds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "buy {} / sell {}", self.buy, self.sell)
    }
}

/// Decision for one bar.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Action {
    /// Open a long position.
    Buy,
    /// Close the open position.
    Close,
}

/// Per-bar buy and close flags, aligned with the input bars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signals {
    open_times: Vec<Timestamp>,
    buy: Vec<bool>,
    close: Vec<bool>,
}

impl Signals {
    fn new(open_times: &[Timestamp], buy: Vec<bool>, close: Vec<bool>) -> Self {
        debug_assert!(open_times.len() == buy.len() && buy.len() == close.len());
        Self {
            open_times: open_times.to_vec(),
            buy,
            close,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open_times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open_times.is_empty()
    }

    #[must_use]
    pub fn open_times(&self) -> &[Timestamp] {
        &self.open_times
    }

    #[must_use]
    pub fn buy(&self) -> &[bool] {
        &self.buy
    }

    #[must_use]
    pub fn close(&self) -> &[bool] {
        &self.close
    }

    /// Bars with a decision. Buy wins when both flags are set.
    pub fn actions(&self) -> impl Iterator<Item = (Timestamp, Action)> + '_ {
        self.open_times
            .iter()
            .zip(self.buy.iter().zip(&self.close))
            .filter_map(|(&open_time, (&buy, &close))| {
                if buy {
                    Some((open_time, Action::Buy))
                } else if close {
                    Some((open_time, Action::Close))
                } else {
                    None
                }
            })
    }
}

/// The kinds of [`Rule`], used to enumerate parameter grids.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum RuleKind {
    SmaCross,
    MacdCross,
    BandCross,
    DmiCross,
    SarCross,
    RsiCross,
    StochasticsCross,
    PsychologicalLevel,
    RciCross,
    MaerCross,
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A signal generator: one indicator and the rule reading it.
///
/// | Rule | Buy | Close |
/// |---|---|---|
/// | `SmaCross` | short crosses above long | long crosses above short |
/// | `MacdCross` | MACD crosses above signal | signal crosses above MACD |
/// | `BandCross` | close crosses above lower band | upper band crosses above close |
/// | `DmiCross` | +DI crosses above −DI | −DI crosses above +DI |
/// | `SarCross` | close crosses above SAR | SAR crosses above close |
/// | `RsiCross`, `RciCross`, `MaerCross` | line crosses below buy level | line crosses above sell level |
/// | `StochasticsCross` | slow %D crosses below buy level and slow %K crosses above slow %D | slow %D crosses above sell level and slow %D crosses above slow %K |
/// | `PsychologicalLevel` | line below buy level | line above sell level |
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Rule {
    SmaCross(SmaCrossConfig),
    MacdCross(MacdConfig),
    BandCross(BandConfig),
    DmiCross(DmiConfig),
    SarCross(SarConfig),
    RsiCross(RsiConfig, Thresholds),
    StochasticsCross(StochasticsConfig, Thresholds),
    PsychologicalLevel(PsychologicalConfig, Thresholds),
    RciCross(RciConfig, Thresholds),
    MaerCross(MaerConfig, Thresholds),
}

impl Rule {
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::SmaCross(_) => RuleKind::SmaCross,
            Self::MacdCross(_) => RuleKind::MacdCross,
            Self::BandCross(_) => RuleKind::BandCross,
            Self::DmiCross(_) => RuleKind::DmiCross,
            Self::SarCross(_) => RuleKind::SarCross,
            Self::RsiCross(..) => RuleKind::RsiCross,
            Self::StochasticsCross(..) => RuleKind::StochasticsCross,
            Self::PsychologicalLevel(..) => RuleKind::PsychologicalLevel,
            Self::RciCross(..) => RuleKind::RciCross,
            Self::MaerCross(..) => RuleKind::MaerCross,
        }
    }

    /// Evaluates the rule over `bars`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying indicator's
    /// [`series`](Indicator::series) reports.
    pub fn signals(&self, bars: &[impl Ohlcv]) -> Result<Signals> {
        match *self {
            Self::SmaCross(config) => {
                let s = SmaCross::series(config, bars)?;
                both_ways(s.open_times(), &s.short(), &s.long())
            }
            Self::MacdCross(config) => {
                let s = Macd::series(config, bars)?;
                both_ways(s.open_times(), &s.macd(), &s.signal())
            }
            Self::BandCross(config) => {
                let s = Band::series(config, bars)?;
                let close = Series::close(bars)?;
                Ok(Signals::new(
                    s.open_times(),
                    crossover(&close, &s.lower())?,
                    crossover(&s.upper(), &close)?,
                ))
            }
            Self::DmiCross(config) => {
                let s = Dmi::series(config, bars)?;
                both_ways(s.open_times(), &s.plus(), &s.minus())
            }
            Self::SarCross(config) => {
                let s = Sar::series(config, bars)?;
                both_ways(s.open_times(), &Series::close(bars)?, &s.sar())
            }
            Self::RsiCross(config, thresholds) => {
                through_levels(&Rsi::series(config, bars)?, thresholds)
            }
            Self::StochasticsCross(config, thresholds) => {
                let s = Stochastics::series(config, bars)?;
                let (slow_k, slow_d) = (s.slow_k(), s.slow_d());

                let buy = and(
                    crossover(&slow_d.level(thresholds.buy), &slow_d)?,
                    crossover(&slow_k, &slow_d)?,
                );
                let close = and(
                    crossover(&slow_d, &slow_d.level(thresholds.sell))?,
                    crossover(&slow_d, &slow_k)?,
                );
                Ok(Signals::new(s.open_times(), buy, close))
            }
            Self::PsychologicalLevel(config, thresholds) => {
                let s = Psychological::series(config, bars)?;
                let line = s.values();
                let buy = line.iter().map(|v| v.is_some_and(|v| v < thresholds.buy));
                let close = line.iter().map(|v| v.is_some_and(|v| v > thresholds.sell));
                Ok(Signals::new(s.open_times(), buy.collect(), close.collect()))
            }
            Self::RciCross(config, thresholds) => {
                through_levels(&Rci::series(config, bars)?, thresholds)
            }
            Self::MaerCross(config, thresholds) => {
                through_levels(&Maer::series(config, bars)?, thresholds)
            }
        }
    }

    /// Every rule of every kind over its default parameter grid.
    ///
    /// # Errors
    ///
    /// Never in practice; the grids hold only valid parameters and are
    /// built through the validating builders.
    pub fn grid() -> Result<Vec<Rule>> {
        let mut rules = Vec::new();
        for kind in RuleKind::ALL {
            rules.extend(kind.grid()?);
        }
        Ok(rules)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmaCross(config) => write!(f, "SmaCross({config})"),
            Self::MacdCross(config) => write!(f, "MacdCross({config})"),
            Self::BandCross(config) => write!(f, "BandCross({config})"),
            Self::DmiCross(config) => write!(f, "DmiCross({config})"),
            Self::SarCross(config) => write!(f, "SarCross({config})"),
            Self::RsiCross(config, t) => write!(f, "RsiCross({config}, {t})"),
            Self::StochasticsCross(config, t) => write!(f, "StochasticsCross({config}, {t})"),
            Self::PsychologicalLevel(config, t) => write!(f, "PsychologicalLevel({config}, {t})"),
            Self::RciCross(config, t) => write!(f, "RciCross({config}, {t})"),
            Self::MaerCross(config, t) => write!(f, "MaerCross({config}, {t})"),
        }
    }
}

/// Buy when `a` crosses above `b`, close on the reverse.
fn both_ways(open_times: &[Timestamp], a: &Series, b: &Series) -> Result<Signals> {
    Ok(Signals::new(open_times, crossover(a, b)?, crossover(b, a)?))
}

/// Buy when `line` drops through the buy level, close when it rises
/// through the sell level.
fn through_levels(line: &Series, thresholds: Thresholds) -> Result<Signals> {
    Ok(Signals::new(
        line.open_times(),
        crossover(&line.level(thresholds.buy), line)?,
        crossover(line, &line.level(thresholds.sell))?,
    ))
}

fn and(a: Vec<bool>, b: Vec<bool>) -> Vec<bool> {
    a.into_iter().zip(b).map(|(a, b)| a && b).collect()
}

const fn nz(n: usize) -> NonZero<usize> {
    match NonZero::new(n) {
        Some(n) => n,
        None => panic!("grid lengths are positive"),
    }
}

const SMA_LENGTHS: [NonZero<usize>; 5] = [nz(5), nz(25), nz(75), nz(100), nz(200)];
const MACD_SHORT: [NonZero<usize>; 3] = [nz(6), nz(12), nz(18)];
const MACD_LONG: [NonZero<usize>; 3] = [nz(13), nz(26), nz(39)];
const MACD_SIGNAL: [NonZero<usize>; 3] = [nz(5), nz(9), nz(15)];
const BAND_LENGTHS: [NonZero<usize>; 7] = [nz(9), nz(10), nz(20), nz(21), nz(50), nz(75), nz(100)];
const BAND_SIGMAS: [f64; 3] = [1.0, 2.0, 3.0];
const DMI_SPANS: [NonZero<usize>; 5] = [nz(7), nz(14), nz(21), nz(28), nz(35)];
const SAR_INIT_AF: [f64; 4] = [0.01, 0.02, 0.05, 0.1];
const SAR_MAX_AF: [f64; 4] = [0.1, 0.15, 0.2, 0.25];
const RSI_SPANS: [NonZero<usize>; 5] = [nz(9), nz(14), nz(22), nz(42), nz(52)];
const STOCHASTICS_SPANS: [NonZero<usize>; 5] = [nz(5), nz(9), nz(14), nz(21), nz(30)];
const STOCHASTICS_K_SPANS: [NonZero<usize>; 4] = [nz(2), nz(3), nz(4), nz(5)];
const PSYCHOLOGICAL_SPANS: [NonZero<usize>; 3] = [nz(5), nz(12), nz(19)];
const RCI_SPANS: [NonZero<usize>; 10] = [
    nz(7),
    nz(8),
    nz(9),
    nz(21),
    nz(23),
    nz(26),
    nz(42),
    nz(45),
    nz(48),
    nz(52),
];
const MAER_SPANS: [NonZero<usize>; 5] = [nz(5), nz(25), nz(75), nz(100), nz(200)];

const OSCILLATOR_BUY: [f64; 6] = [10.0, 15.0, 20.0, 25.0, 30.0, 35.0];
const OSCILLATOR_SELL: [f64; 6] = [65.0, 70.0, 75.0, 80.0, 85.0, 90.0];
const RCI_BUY: [f64; 4] = [-100.0, -90.0, -80.0, -70.0];
const RCI_SELL: [f64; 4] = [70.0, 80.0, 90.0, 100.0];
const MAER_BUY: [f64; 6] = [-5.0, -6.0, -7.0, -8.0, -9.0, -10.0];
const MAER_SELL: [f64; 6] = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

fn threshold_grid(buy: &[f64], sell: &[f64]) -> Result<Vec<Thresholds>> {
    buy.iter()
        .flat_map(|&b| sell.iter().map(move |&s| Thresholds::new(b, s)))
        .collect()
}

impl RuleKind {
    pub const ALL: [RuleKind; 10] = [
        RuleKind::SmaCross,
        RuleKind::MacdCross,
        RuleKind::BandCross,
        RuleKind::DmiCross,
        RuleKind::SarCross,
        RuleKind::RsiCross,
        RuleKind::StochasticsCross,
        RuleKind::PsychologicalLevel,
        RuleKind::RciCross,
        RuleKind::MaerCross,
    ];

    /// Default parameter grid for this kind, in a stable order.
    ///
    /// # Errors
    ///
    /// Propagates builder validation, which the built-in grids pass.
    pub fn grid(self) -> Result<Vec<Rule>> {
        let mut rules = Vec::new();

        match self {
            Self::SmaCross => {
                for short in SMA_LENGTHS {
                    for long in SMA_LENGTHS {
                        rules.push(Rule::SmaCross(SmaCrossConfig::close(short, long)));
                    }
                }
            }
            Self::MacdCross => {
                for short in MACD_SHORT {
                    for long in MACD_LONG {
                        for signal in MACD_SIGNAL {
                            let config = MacdConfig::builder()
                                .short(short)
                                .long(long)
                                .signal(signal)
                                .build()?;
                            rules.push(Rule::MacdCross(config));
                        }
                    }
                }
            }
            Self::BandCross => {
                for length in BAND_LENGTHS {
                    for upper in BAND_SIGMAS {
                        for lower in BAND_SIGMAS {
                            let config = BandConfig::builder()
                                .length(length)
                                .upper(Multiplier::new(upper)?)
                                .lower(Multiplier::new(lower)?)
                                .build()?;
                            rules.push(Rule::BandCross(config));
                        }
                    }
                }
            }
            Self::DmiCross => {
                rules.extend(DMI_SPANS.map(|span| Rule::DmiCross(DmiConfig::with_span(span))));
            }
            Self::SarCross => {
                for init_af in SAR_INIT_AF {
                    for max_af in SAR_MAX_AF {
                        let config = SarConfig::builder().init_af(init_af).max_af(max_af).build()?;
                        rules.push(Rule::SarCross(config));
                    }
                }
            }
            Self::RsiCross => {
                let levels = threshold_grid(&OSCILLATOR_BUY, &OSCILLATOR_SELL)?;
                for span in RSI_SPANS {
                    for &t in &levels {
                        rules.push(Rule::RsiCross(RsiConfig::close(span), t));
                    }
                }
            }
            Self::StochasticsCross => {
                let levels = threshold_grid(&OSCILLATOR_BUY, &OSCILLATOR_SELL)?;
                for span in STOCHASTICS_SPANS {
                    for k_span in STOCHASTICS_K_SPANS {
                        let config = StochasticsConfig::builder()
                            .span(span)
                            .k_span(k_span)
                            .build()?;
                        for &t in &levels {
                            rules.push(Rule::StochasticsCross(config, t));
                        }
                    }
                }
            }
            Self::PsychologicalLevel => {
                let levels = threshold_grid(&OSCILLATOR_BUY, &OSCILLATOR_SELL)?;
                for span in PSYCHOLOGICAL_SPANS {
                    for &t in &levels {
                        let config = PsychologicalConfig::with_span(span);
                        rules.push(Rule::PsychologicalLevel(config, t));
                    }
                }
            }
            Self::RciCross => {
                let levels = threshold_grid(&RCI_BUY, &RCI_SELL)?;
                for span in RCI_SPANS {
                    let config = RciConfig::close(span)?;
                    for &t in &levels {
                        rules.push(Rule::RciCross(config, t));
                    }
                }
            }
            Self::MaerCross => {
                let levels = threshold_grid(&MAER_BUY, &MAER_SELL)?;
                for span in MAER_SPANS {
                    for &t in &levels {
                        rules.push(Rule::MaerCross(MaerConfig::close(span), t));
                    }
                }
            }
        }

        Ok(rules)
    }
}
