mod fixtures;

use fixtures::{
    RefMacdValue, RefValue, assert_series_match, load_records, load_reference_ohlcvs, open_times,
    reference_test,
};
use quantedge_bwb::{Ema, EmaConfig, Macd, MacdConfig};

reference_test!(ema_12_close, Ema, EmaConfig::close(nz(12)), "ema-12-close.csv");

#[test]
fn macd_12_26_9_matches_reference() {
    let bars = load_reference_ohlcvs();
    let reference: Vec<RefMacdValue> = load_records("macd-12-26-9.csv");
    let times = open_times(&reference, |r| r.open_time);

    let macd = Macd::series(MacdConfig::default_12_26_9(), &bars).unwrap();

    let expected: Vec<_> = reference.iter().map(|r| r.macd).collect();
    assert_series_match("MACD line", &macd.macd(), &times, &expected);
    let expected: Vec<_> = reference.iter().map(|r| r.signal).collect();
    assert_series_match("MACD signal", &macd.signal(), &times, &expected);
}

#[test]
fn macd_histogram_is_line_minus_signal() {
    let bars = load_reference_ohlcvs();
    let reference: Vec<RefMacdValue> = load_records("macd-12-26-9.csv");
    let macd = Macd::series(MacdConfig::default_12_26_9(), &bars).unwrap();

    let expected: Vec<_> = reference
        .iter()
        .map(|r| r.macd.zip(r.signal).map(|(m, s)| m - s))
        .collect();
    assert_series_match(
        "MACD histogram",
        &macd.histogram(),
        &open_times(&reference, |r| r.open_time),
        &expected,
    );
}

#[test]
fn ema_first_value_is_first_close() {
    let bars = load_reference_ohlcvs();
    let reference: Vec<RefValue> = load_records("ema-12-close.csv");
    assert_eq!(reference[0].expected, Some(bars[0].close));
}
