use crate::{Ohlcv, Price};

use std::fmt::{Debug, Display};

/// Value extracted from each [`Ohlcv`] bar before it enters an indicator.
///
/// Most indicators run on [`Close`](PriceSource::Close); the single-series
/// indicators ([`Sma`](crate::Sma), [`Ema`](crate::Ema), [`Rsi`](crate::Rsi),
/// ...) accept any source through their config builder.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    #[default]
    Close,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Traded volume.
    Volume,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// The first bar of a series has no previous close and uses
    /// `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    #[inline]
    pub(crate) fn extract(self, ohlcv: &impl Ohlcv, prev_close: Option<Price>) -> Price {
        match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Low => ohlcv.low(),
            Self::Close => ohlcv.close(),
            Self::HL2 => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::HLC3 => (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0,
            Self::OHLC4 => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
            Self::Volume => ohlcv.volume(),
            Self::TrueRange => true_range(ohlcv, prev_close),
        }
    }
}

#[inline]
pub(crate) fn true_range(ohlcv: &impl Ohlcv, prev_close: Option<Price>) -> Price {
    let hl = ohlcv.high() - ohlcv.low();

    match prev_close {
        Some(prev_close) => {
            let hc = (ohlcv.high() - prev_close).abs();
            let lc = (ohlcv.low() - prev_close).abs();
            hl.max(hc).max(lc)
        }
        None => hl,
    }
}

/// Feeds bars one at a time and remembers the previous close, so sources
/// that look back one bar ([`PriceSource::TrueRange`]) can be extracted.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SourceReader {
    source: PriceSource,
    prev_close: Option<Price>,
}

impl SourceReader {
    pub(crate) fn new(source: PriceSource) -> Self {
        Self {
            source,
            prev_close: None,
        }
    }

    #[inline]
    pub(crate) fn read(&mut self, ohlcv: &impl Ohlcv) -> Price {
        let price = self.source.extract(ohlcv, self.prev_close);
        self.prev_close = Some(ohlcv.close());
        price
    }
}
