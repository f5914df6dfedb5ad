#![allow(dead_code)]

use quantedge_bwb::{Ohlcv, Price, Series, Timestamp};
use serde::{Deserialize, de::DeserializeOwned};

/// Daily OHLCV bar parsed from CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv for RefBar {
    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn open_time(&self) -> Timestamp {
        self.open_time
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Single-line reference value; empty while undefined.
#[derive(Debug, Deserialize)]
pub struct RefValue {
    pub open_time: u64,
    pub expected: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RefMacdValue {
    pub open_time: u64,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RefBandValue {
    pub open_time: u64,
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RefDmiValue {
    pub open_time: u64,
    pub plus: Option<f64>,
    pub minus: Option<f64>,
}

/// `trend` is `1` for bull and `-1` for bear.
#[derive(Debug, Deserialize)]
pub struct RefSarValue {
    pub open_time: u64,
    pub sar: Option<f64>,
    pub trend: Option<i8>,
}

#[derive(Debug, Deserialize)]
pub struct RefStochasticsValue {
    pub open_time: u64,
    pub fast_k: Option<f64>,
    pub fast_d: Option<f64>,
    pub slow_d: Option<f64>,
}

const DATA_DIR: &str = "tests/fixtures/data";

/// Tolerance: 1e-9.
/// Reference values are computed in the same operation order, so only
/// last-bit rounding differences remain.
pub const TOLERANCE: f64 = 1e-9;

/// Load the reference daily bars.
pub fn load_reference_ohlcvs() -> Vec<RefBar> {
    load_records("daily-ohlcv.csv")
}

/// Load a reference file from the fixtures data directory.
pub fn load_records<D>(name: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let path = format!("{DATA_DIR}/{name}");
    let mut rdr =
        csv::Reader::from_path(&path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize()
        .map(|r| r.unwrap_or_else(|e| panic!("invalid record in {path}: {e}")))
        .collect()
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert a computed series matches reference rows point by point: same
/// open times, same undefined positions, values within [`TOLERANCE`].
pub fn assert_series_match(
    context: &str,
    actual: &Series,
    open_times: &[u64],
    expected: &[Option<f64>],
) {
    assert_eq!(actual.len(), expected.len(), "{context}: length mismatch");
    assert_eq!(actual.open_times(), open_times, "{context}: open times differ");

    for (i, (a, e)) in actual.values().iter().zip(expected).enumerate() {
        match (a, e) {
            (None, None) => {}
            (Some(a), Some(e)) => assert_near(*a, *e, TOLERANCE, &format!("{context} at bar {i}")),
            (a, e) => panic!("{context} definedness mismatch at bar {i}: got {a:?}, expected {e:?}"),
        }
    }
}

/// Open times column of any reference rows.
pub fn open_times<T>(rows: &[T], f: impl Fn(&T) -> u64) -> Vec<u64> {
    rows.iter().map(f).collect()
}

/// Generate a reference test for a single-line indicator.
///
/// Usage: `reference_test!(sma_5, Sma, SmaConfig::close(nz(5)), "sma-5-close.csv");`
#[allow(unused_macros)]
macro_rules! reference_test {
    ($name:ident, $ind:ty, $config:expr, $file:expr) => {
        #[test]
        fn $name() {
            use std::num::NonZero;

            #[allow(dead_code)]
            fn nz(n: usize) -> NonZero<usize> {
                NonZero::new(n).unwrap()
            }

            let bars = load_reference_ohlcvs();
            let reference: Vec<RefValue> = load_records($file);
            let series = <$ind>::series($config, &bars).unwrap();

            let expected: Vec<Option<f64>> = reference.iter().map(|r| r.expected).collect();
            assert_series_match(
                stringify!($name),
                &series,
                &open_times(&reference, |r| r.open_time),
                &expected,
            );
        }
    };
}

#[allow(unused_imports)]
pub(crate) use reference_test;
