mod fixtures;

use fixtures::{
    RefValue, assert_series_match, load_records, load_reference_ohlcvs, open_times,
    reference_test,
};
use quantedge_bwb::{Sma, SmaConfig, SmaCross, SmaCrossConfig};

reference_test!(sma_5_close, Sma, SmaConfig::close(nz(5)), "sma-5-close.csv");
reference_test!(sma_25_close, Sma, SmaConfig::close(nz(25)), "sma-25-close.csv");

#[test]
fn sma_cross_lines_match_single_smas() {
    let bars = load_reference_ohlcvs();
    let short: Vec<RefValue> = load_records("sma-5-close.csv");
    let long: Vec<RefValue> = load_records("sma-25-close.csv");

    let config = SmaCrossConfig::close(
        std::num::NonZero::new(5).unwrap(),
        std::num::NonZero::new(25).unwrap(),
    );
    let cross = SmaCross::series(config, &bars).unwrap();
    let times = open_times(&short, |r| r.open_time);

    let expected: Vec<_> = short.iter().map(|r| r.expected).collect();
    assert_series_match("SMA_CROSS short", &cross.short(), &times, &expected);
    let expected: Vec<_> = long.iter().map(|r| r.expected).collect();
    assert_series_match("SMA_CROSS long", &cross.long(), &times, &expected);
}
