use crate::{Error, Ohlcv, Price, PriceSource, Result, Timestamp, price_source::SourceReader};

/// Indicator output aligned 1:1 with its input bars.
///
/// `open_times` is copied from the input; `values[i]` is `None` while the
/// indicator is warming up or where a ratio had a zero denominator.
/// Output never has fewer points than the input.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{Series, rolling_mean};
/// use std::num::NonZero;
///
/// let close = Series::from_values([10.0, 11.0, 12.0, 11.0]);
/// let sma = rolling_mean(&close, NonZero::new(3).unwrap()).unwrap();
///
/// assert_eq!(sma.values(), &[None, None, Some(11.0), Some(34.0 / 3.0)]);
/// assert_eq!(sma.open_times(), close.open_times());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Series<T = Price> {
    open_times: Vec<Timestamp>,
    values: Vec<Option<T>>,
}

impl<T: Copy> Series<T> {
    /// Builds a series from parallel timestamp and value vectors.
    ///
    /// # Errors
    ///
    /// [`Error::MisalignedSeries`] if the lengths differ,
    /// [`Error::NonIncreasingOpenTime`] if timestamps are not strictly
    /// increasing.
    pub fn new(open_times: Vec<Timestamp>, values: Vec<Option<T>>) -> Result<Self> {
        if open_times.len() != values.len() {
            return Err(Error::MisalignedSeries {
                left: open_times.len(),
                right: values.len(),
            });
        }

        if let Some(index) = open_times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::NonIncreasingOpenTime {
                index: index + 1,
                previous: open_times[index],
                open_time: open_times[index + 1],
            });
        }

        Ok(Self { open_times, values })
    }

    pub(crate) fn from_parts(open_times: Vec<Timestamp>, values: Vec<Option<T>>) -> Self {
        debug_assert_eq!(open_times.len(), values.len());
        Self { open_times, values }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn open_times(&self) -> &[Timestamp] {
        &self.open_times
    }

    #[must_use]
    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }

    /// Value at `index`; `None` if undefined or out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the bar opened at `open_time`.
    #[must_use]
    pub fn at(&self, open_time: Timestamp) -> Option<T> {
        self.open_times
            .binary_search(&open_time)
            .ok()
            .and_then(|index| self.get(index))
    }

    /// Most recent value.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values.last().copied().flatten()
    }

    /// Index of the first defined value.
    #[must_use]
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    /// `(open_time, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Option<T>)> + '_ {
        self.open_times.iter().copied().zip(self.values.iter().copied())
    }

    /// Maps every defined value, keeping timestamps. `f` returning `None`
    /// marks that point undefined.
    #[must_use]
    pub fn project<U: Copy>(&self, f: impl Fn(T) -> Option<U>) -> Series<U> {
        Series::from_parts(
            self.open_times.clone(),
            self.values.iter().map(|v| v.and_then(&f)).collect(),
        )
    }

    /// Combines two aligned series point by point. A point is undefined if
    /// either side is, or if `f` returns `None`.
    ///
    /// # Errors
    ///
    /// [`Error::MisalignedSeries`] if the timestamps differ.
    pub fn zip_with<U: Copy, R: Copy>(
        &self,
        other: &Series<U>,
        f: impl Fn(T, U) -> Option<R>,
    ) -> Result<Series<R>> {
        if self.open_times != other.open_times {
            return Err(Error::MisalignedSeries {
                left: self.len(),
                right: other.len(),
            });
        }

        Ok(Series::from_parts(
            self.open_times.clone(),
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| a.zip(*b).and_then(|(a, b)| f(a, b)))
                .collect(),
        ))
    }
}

impl Series<Price> {
    /// Extracts `source` from each bar.
    ///
    /// # Errors
    ///
    /// [`Error::NonIncreasingOpenTime`] if bar timestamps are not strictly
    /// increasing.
    pub fn from_bars(bars: &[impl Ohlcv], source: PriceSource) -> Result<Self> {
        crate::ohlcv::check_open_times(bars)?;

        let mut reader = SourceReader::new(source);
        Ok(Self::from_parts(
            bars.iter().map(Ohlcv::open_time).collect(),
            bars.iter().map(|bar| Some(reader.read(bar))).collect(),
        ))
    }

    /// Closing prices.
    ///
    /// # Errors
    ///
    /// See [`from_bars`](Self::from_bars).
    pub fn close(bars: &[impl Ohlcv]) -> Result<Self> {
        Self::from_bars(bars, PriceSource::Close)
    }

    /// Fully defined series with open times `0, 1, 2, ...`.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = Price>) -> Self {
        let values: Vec<Option<Price>> = values.into_iter().map(Some).collect();
        Self::from_parts((0..).take(values.len()).collect(), values)
    }
}
