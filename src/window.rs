use std::fmt::Display;

use crate::{Price, ring_buffer::RingBuffer};

/// Denominator convention for windowed standard deviation.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum Deviation {
    /// Sample deviation, divides by `n - 1`. Needs a window of at least 2.
    #[default]
    Sample,
    /// Population deviation, divides by `n`.
    Population,
}

impl Display for Deviation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Trailing window over possibly-undefined values.
///
/// Every reduction is `None` until the window is full, and `None` while any
/// value inside it is undefined. Reductions walk the window on each call so
/// they stay exact (a flat run sums to exactly zero) at `O(window)` per bar.
#[derive(Clone, Debug)]
pub(crate) struct RollingWindow {
    values: RingBuffer<Option<Price>>,
    missing: usize,
}

impl RollingWindow {
    pub(crate) fn new(length: usize) -> Self {
        Self {
            values: RingBuffer::new(length),
            missing: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: Option<Price>) {
        if value.is_none() {
            self.missing += 1;
        }

        if let Some(None) = self.values.push(value) {
            self.missing -= 1;
        }
    }

    #[inline]
    fn defined(&self) -> Option<impl Iterator<Item = Price> + '_> {
        (self.values.is_ready() && self.missing == 0).then(|| self.values.iter().flatten())
    }

    #[allow(clippy::cast_precision_loss)]
    #[inline]
    fn length(&self) -> f64 {
        self.values.capacity() as f64
    }

    pub(crate) fn sum(&self) -> Option<Price> {
        self.defined().map(Iterator::sum)
    }

    pub(crate) fn mean(&self) -> Option<Price> {
        self.sum().map(|sum| sum / self.length())
    }

    pub(crate) fn std_dev(&self, deviation: Deviation) -> Option<Price> {
        let mean = self.mean()?;
        let squares: f64 = self.defined()?.map(|v| (v - mean) * (v - mean)).sum();

        let denominator = match deviation {
            Deviation::Sample => self.length() - 1.0,
            Deviation::Population => self.length(),
        };

        (denominator > 0.0).then(|| (squares / denominator).sqrt())
    }

    pub(crate) fn min(&self) -> Option<Price> {
        self.defined()?.reduce(f64::min)
    }

    pub(crate) fn max(&self) -> Option<Price> {
        self.defined()?.reduce(f64::max)
    }

    /// Values oldest to newest, once the window is full and fully defined.
    pub(crate) fn values(&self) -> Option<impl Iterator<Item = Price> + '_> {
        self.defined()
    }
}

/// Exponential weighting convention for [`ema`](crate::ema).
///
/// Both use `α = 2 / (span + 1)` and are seeded from the first observation.
/// They agree once roughly `2 × span` values have been seen.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum EmaWeighting {
    /// `ema[i] = α × x[i] + (1 − α) × ema[i − 1]`, `ema[0] = x[0]`.
    #[default]
    Recursive,
    /// Finite-history normalised weights:
    /// `Σ (1 − α)^k × x[i − k] / Σ (1 − α)^k`.
    Adjusted,
}

impl Display for EmaWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Exponential smoothing state shared by [`Ema`](crate::Ema), MACD and the
/// [`ema`](crate::ema) primitive.
#[derive(Clone, Debug)]
pub(crate) struct ExpSmoother {
    alpha: f64,
    weighting: EmaWeighting,
    numerator: f64,
    denominator: f64,
    current: Option<Price>,
}

impl ExpSmoother {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(span: usize, weighting: EmaWeighting) -> Self {
        Self {
            alpha: 2.0 / (span + 1) as f64,
            weighting,
            numerator: 0.0,
            denominator: 0.0,
            current: None,
        }
    }

    /// Feeds one value. An undefined value leaves the state untouched and
    /// carries the previous output.
    #[inline]
    pub(crate) fn next(&mut self, value: Option<Price>) -> Option<Price> {
        let Some(value) = value else {
            return self.current;
        };

        self.current = Some(match (self.weighting, self.current) {
            (_, None) => {
                self.numerator = value;
                self.denominator = 1.0;
                value
            }
            (EmaWeighting::Recursive, Some(previous)) => {
                self.alpha * value + (1.0 - self.alpha) * previous
            }
            (EmaWeighting::Adjusted, Some(_)) => {
                let decay = 1.0 - self.alpha;
                self.numerator = decay.mul_add(self.numerator, value);
                self.denominator = decay.mul_add(self.denominator, 1.0);
                self.numerator / self.denominator
            }
        });

        self.current
    }
}
