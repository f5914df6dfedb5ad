//! Technical indicators and crossover signals for daily OHLCV bars.
//!
//! Indicators accept any type implementing [`Ohlcv`] and return
//! typed results. Values are `None` until enough data has been
//! received for convergence, and where a ratio has a zero denominator.
//!
//! Each indicator type ([`Sma`], [`Ema`], [`Macd`], [`Band`], ...) exposes
//! [`new`](Sma::new), [`compute`](Sma::compute), [`value`](Sma::value)
//! and [`series`](Sma::series) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! On top of the indicators, a [`Rule`] turns one indicator into per-bar
//! buy / close [`Signals`], and [`sweep`] evaluates many rules over the
//! same history (in parallel with the `parallel` feature).

mod band;
mod dmi;
mod ema;
mod error;
mod indicator;
mod macd;
mod maer;
mod ohlcv;
mod price_source;
mod psychological;
mod rci;
mod ring_buffer;
mod rolling;
mod rsi;
mod sar;
mod series;
mod signal;
mod sma;
mod sma_cross;
mod stochastics;
mod sweep;
mod window;

pub use crate::error::{Error, Result};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Ohlcv, Price, Timestamp};
pub use crate::price_source::PriceSource;
pub use crate::rolling::{
    diff, ema, rolling_max, rolling_mean, rolling_min, rolling_std, rolling_sum,
};
pub use crate::series::Series;
pub use crate::window::{Deviation, EmaWeighting};

pub use crate::band::{Band, BandConfig, BandConfigBuilder, BandValue, Multiplier};
pub use crate::dmi::{
    Adx, AdxConfig, AdxConfigBuilder, Dmi, DmiConfig, DmiConfigBuilder, DmiValue, true_range,
};
pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder};
pub use crate::macd::{Macd, MacdConfig, MacdConfigBuilder, MacdValue};
pub use crate::maer::{Maer, MaerConfig, MaerConfigBuilder};
pub use crate::psychological::{Psychological, PsychologicalConfig, PsychologicalConfigBuilder};
pub use crate::rci::{Rci, RciConfig, RciConfigBuilder};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder};
pub use crate::sar::{Sar, SarConfig, SarConfigBuilder, SarValue, Trend};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder};
pub use crate::sma_cross::{SmaCross, SmaCrossConfig, SmaCrossConfigBuilder, SmaCrossValue};
pub use crate::stochastics::{
    Stochastics, StochasticsConfig, StochasticsConfigBuilder, StochasticsValue,
};

pub use crate::signal::{Action, Rule, RuleKind, Signals, Thresholds, crossover};
pub use crate::sweep::{SweepEntry, sweep, sweep_grid};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute`].
            #[inline]
            pub fn compute(&mut self, kline: &impl Ohlcv) -> Option<$output> {
                <Self as Indicator>::compute(self, kline)
            }

            /// See [`Indicator::value`].
            #[must_use]
            #[inline]
            pub fn value(&self) -> Option<$output> {
                <Self as Indicator>::value(self)
            }

            /// See [`Indicator::series`].
            ///
            /// # Errors
            ///
            /// See [`Indicator::series`].
            pub fn series(config: $config, bars: &[impl Ohlcv]) -> Result<Series<$output>> {
                <Self as Indicator>::series(config, bars)
            }
        }
    };
}

impl_indicator_methods!(Sma, SmaConfig, Price);
impl_indicator_methods!(Ema, EmaConfig, Price);
impl_indicator_methods!(SmaCross, SmaCrossConfig, SmaCrossValue);
impl_indicator_methods!(Macd, MacdConfig, MacdValue);
impl_indicator_methods!(Band, BandConfig, BandValue);
impl_indicator_methods!(Dmi, DmiConfig, DmiValue);
impl_indicator_methods!(Adx, AdxConfig, Price);
impl_indicator_methods!(Sar, SarConfig, SarValue);
impl_indicator_methods!(Rsi, RsiConfig, Price);
impl_indicator_methods!(Stochastics, StochasticsConfig, StochasticsValue);
impl_indicator_methods!(Psychological, PsychologicalConfig, Price);
impl_indicator_methods!(Rci, RciConfig, Price);
impl_indicator_methods!(Maer, MaerConfig, Price);

#[cfg(test)]
mod test_util;
