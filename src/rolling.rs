//! Batch series primitives every indicator composes from.
//!
//! Windowed reductions follow one rule: the output at `i` is undefined for
//! `i < window - 1` and wherever the trailing window holds an undefined
//! value.

use std::num::NonZero;

use crate::{
    Deviation, EmaWeighting, Error, Price, Result, Series,
    window::{ExpSmoother, RollingWindow},
};

fn require_len(series: &Series, required: usize, indicator: impl Into<String>) -> Result<()> {
    if series.len() < required {
        let indicator = indicator.into();
        tracing::debug!(%indicator, required, actual = series.len(), "series too short");

        return Err(Error::InsufficientData {
            indicator,
            required,
            actual: series.len(),
        });
    }

    Ok(())
}

fn windowed(
    series: &Series,
    window: NonZero<usize>,
    name: &str,
    reduce: impl Fn(&RollingWindow) -> Option<Price>,
) -> Result<Series> {
    let window = window.get();
    require_len(series, window, format!("{name}({window})"))?;

    let mut rolling = RollingWindow::new(window);
    Ok(series.project_all(|value| {
        rolling.push(value);
        reduce(&rolling)
    }))
}

/// Sum of the trailing `window` values.
///
/// # Errors
///
/// [`Error::InsufficientData`] if the series is shorter than `window`.
pub fn rolling_sum(series: &Series, window: NonZero<usize>) -> Result<Series> {
    windowed(series, window, "rolling_sum", RollingWindow::sum)
}

/// Simple moving average of the trailing `window` values.
///
/// # Errors
///
/// [`Error::InsufficientData`] if the series is shorter than `window`.
pub fn rolling_mean(series: &Series, window: NonZero<usize>) -> Result<Series> {
    windowed(series, window, "rolling_mean", RollingWindow::mean)
}

/// Standard deviation of the trailing `window` values.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a sample deviation over a window of 1,
/// [`Error::InsufficientData`] if the series is shorter than `window`.
pub fn rolling_std(series: &Series, window: NonZero<usize>, deviation: Deviation) -> Result<Series> {
    if deviation == Deviation::Sample && window.get() < 2 {
        return Err(Error::invalid_parameter(
            "window",
            "sample deviation needs a window of at least 2",
        ));
    }

    windowed(series, window, "rolling_std", |w| w.std_dev(deviation))
}

/// Minimum of the trailing `window` values.
///
/// # Errors
///
/// [`Error::InsufficientData`] if the series is shorter than `window`.
pub fn rolling_min(series: &Series, window: NonZero<usize>) -> Result<Series> {
    windowed(series, window, "rolling_min", RollingWindow::min)
}

/// Maximum of the trailing `window` values.
///
/// # Errors
///
/// [`Error::InsufficientData`] if the series is shorter than `window`.
pub fn rolling_max(series: &Series, window: NonZero<usize>) -> Result<Series> {
    windowed(series, window, "rolling_max", RollingWindow::max)
}

/// Exponential moving average with `α = 2 / (span + 1)`.
///
/// Defined from the first defined input onward; there is no warm-up gap.
/// Early values lean on the seed and settle after roughly `2 × span`
/// points.
///
/// # Errors
///
/// [`Error::InsufficientData`] for an empty series.
pub fn ema(series: &Series, span: NonZero<usize>, weighting: EmaWeighting) -> Result<Series> {
    require_len(series, 1, format!("ema({span}, {weighting})"))?;

    let mut smoother = ExpSmoother::new(span.get(), weighting);
    Ok(series.project_all(|value| smoother.next(value)))
}

/// First difference `x[i] - x[i - 1]`; undefined at index 0.
#[must_use]
pub fn diff(series: &Series) -> Series {
    let mut previous: Option<Price> = None;
    series.project_all(|value| {
        let change = value.zip(previous).map(|(current, previous)| current - previous);
        previous = value;
        change
    })
}

impl Series {
    /// Stateful point-by-point map over every value, defined or not.
    pub(crate) fn project_all(&self, mut f: impl FnMut(Option<Price>) -> Option<Price>) -> Series {
        Series::from_parts(
            self.open_times().to_vec(),
            self.values().iter().map(|&v| f(v)).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, assert_some_near};

    fn nz(n: usize) -> NonZero<usize> {
        NonZero::new(n).unwrap()
    }

    fn close() -> Series {
        Series::from_values([10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0, 11.0])
    }

    mod mean {
        use super::*;

        #[test]
        fn warm_up_prefix_is_undefined() {
            let sma = rolling_mean(&close(), nz(3)).unwrap();
            assert_eq!(sma.get(0), None);
            assert_eq!(sma.get(1), None);
        }

        #[test]
        fn end_to_end_values() {
            let sma = rolling_mean(&close(), nz(3)).unwrap();
            assert_eq!(sma.get(2), Some(11.0));
            assert_eq!(sma.get(9), Some(10.0));
        }

        #[test]
        fn every_point_is_exact_window_mean() {
            let series = close();
            let sma = rolling_mean(&series, nz(4)).unwrap();
            let raw: Vec<f64> = series.values().iter().flatten().copied().collect();

            for i in 3..raw.len() {
                let expected = raw[i - 3..=i].iter().sum::<f64>() / 4.0;
                assert_approx!(sma.get(i).unwrap(), expected);
            }
        }

        #[test]
        fn output_is_aligned_with_input() {
            let series = close();
            let sma = rolling_mean(&series, nz(5)).unwrap();
            assert_eq!(sma.len(), series.len());
            assert_eq!(sma.open_times(), series.open_times());
        }

        #[test]
        fn window_longer_than_series_is_insufficient() {
            let err = rolling_mean(&Series::from_values([1.0, 2.0]), nz(3)).unwrap_err();
            assert_eq!(
                err,
                Error::InsufficientData {
                    indicator: "rolling_mean(3)".to_string(),
                    required: 3,
                    actual: 2,
                }
            );
        }

        #[test]
        fn undefined_input_is_propagated_not_zeroed() {
            let s = Series::new(vec![0, 1, 2, 3], vec![Some(1.0), None, Some(3.0), Some(5.0)])
                .unwrap();
            let sma = rolling_mean(&s, nz(2)).unwrap();
            assert_eq!(sma.values(), &[None, None, None, Some(4.0)]);
        }
    }

    mod std_dev {
        use super::*;

        #[test]
        fn sample_deviation() {
            // [10, 11, 12]: mean 11, squares 2, / 2 → 1
            let sd = rolling_std(&close(), nz(3), Deviation::Sample).unwrap();
            assert_some_near!(sd.get(2), 1.0);
        }

        #[test]
        fn population_deviation() {
            let sd = rolling_std(&close(), nz(3), Deviation::Population).unwrap();
            assert_some_near!(sd.get(2), (2.0_f64 / 3.0).sqrt());
        }

        #[test]
        fn sample_window_of_one_is_rejected() {
            assert!(matches!(
                rolling_std(&close(), nz(1), Deviation::Sample),
                Err(Error::InvalidParameter { name: "window", .. })
            ));
        }
    }

    mod extremes {
        use super::*;

        #[test]
        fn min_and_max() {
            let min = rolling_min(&close(), nz(3)).unwrap();
            let max = rolling_max(&close(), nz(3)).unwrap();
            // window [12, 11, 10]
            assert_eq!(min.get(4), Some(10.0));
            assert_eq!(max.get(4), Some(12.0));
        }

        #[test]
        fn sum() {
            let sum = rolling_sum(&close(), nz(2)).unwrap();
            assert_eq!(sum.get(1), Some(21.0));
        }
    }

    mod exponential {
        use super::*;

        #[test]
        fn seeded_from_first_observation() {
            let e = ema(&close(), nz(5), EmaWeighting::Recursive).unwrap();
            assert_eq!(e.get(0), Some(10.0));
        }

        #[test]
        fn follows_recurrence_everywhere() {
            let series = close();
            let e = ema(&series, nz(4), EmaWeighting::Recursive).unwrap();
            let alpha = 2.0 / 5.0;

            for i in 1..series.len() {
                let expected = alpha * series.get(i).unwrap() + (1.0 - alpha) * e.get(i - 1).unwrap();
                assert_approx!(e.get(i).unwrap(), expected);
            }
        }

        #[test]
        fn defined_at_every_index() {
            let e = ema(&close(), nz(26), EmaWeighting::Recursive).unwrap();
            assert!(e.values().iter().all(Option::is_some));
        }

        #[test]
        fn adjusted_weights_differ_early() {
            let series = close();
            let recursive = ema(&series, nz(5), EmaWeighting::Recursive).unwrap();
            let adjusted = ema(&series, nz(5), EmaWeighting::Adjusted).unwrap();
            assert_eq!(recursive.get(0), adjusted.get(0));
            assert!((recursive.get(1).unwrap() - adjusted.get(1).unwrap()).abs() > 1e-3);
        }

        #[test]
        fn empty_series_is_insufficient() {
            let none: [f64; 0] = [];
            let empty = Series::from_values(none);
            assert!(matches!(
                ema(&empty, nz(3), EmaWeighting::Recursive),
                Err(Error::InsufficientData { required: 1, actual: 0, .. })
            ));
        }
    }

    mod difference {
        use super::*;

        #[test]
        fn first_point_undefined() {
            let d = diff(&Series::from_values([1.0, 4.0, 2.0]));
            assert_eq!(d.values(), &[None, Some(3.0), Some(-2.0)]);
        }
    }
}
