/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp (seconds since the epoch, or any monotonic day
/// counter).
///
/// Batch entry points require strictly increasing values and report
/// [`Error::NonIncreasingOpenTime`](crate::Error::NonIncreasingOpenTime)
/// otherwise.
pub type Timestamp = u64;

/// One daily OHLCV bar, the input to every indicator.
///
/// Implement this on your own candle type to avoid per-bar conversion.
/// Indicators accept `&impl Ohlcv` and read only the fields they need:
/// most of them consume [`close`](Ohlcv::close) alone, the directional
/// and reversal indicators also read high and low.
///
/// The engine does not enforce `high >= close >= low`. Inconsistent bars
/// produce inconsistent (but finite) output.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Ohlcv, Price, Timestamp};
///
/// struct Candle {
///     o: f64, h: f64, l: f64, c: f64, v: f64,
///     day: u64,
/// }
///
/// impl Ohlcv for Candle {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
///     fn open_time(&self) -> Timestamp { self.day }
///     fn volume(&self) -> f64 { self.v }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing price of the bar.
    fn close(&self) -> Price;

    /// Bar open timestamp. Must be strictly increasing across a series.
    fn open_time(&self) -> Timestamp;

    /// Traded volume. Defaults to `0.0`.
    fn volume(&self) -> f64 {
        0.0
    }
}

/// Checks that `open_time` strictly increases across `bars`.
pub(crate) fn check_open_times(bars: &[impl Ohlcv]) -> crate::Result<()> {
    for (index, pair) in bars.windows(2).enumerate() {
        let (previous, open_time) = (pair[0].open_time(), pair[1].open_time());

        if open_time <= previous {
            tracing::debug!(index = index + 1, previous, open_time, "rejected bar order");

            return Err(crate::Error::NonIncreasingOpenTime {
                index: index + 1,
                previous,
                open_time,
            });
        }
    }

    Ok(())
}
