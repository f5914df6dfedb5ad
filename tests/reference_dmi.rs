mod fixtures;

use fixtures::{
    RefDmiValue, RefValue, assert_series_match, load_records, load_reference_ohlcvs, open_times,
    reference_test,
};
use quantedge_bwb::{Adx, AdxConfig, Dmi, DmiConfig, true_range};

reference_test!(adx_14, Adx, AdxConfig::default_14(), "adx-14.csv");

#[test]
fn true_range_matches_reference() {
    let bars = load_reference_ohlcvs();
    let reference: Vec<RefValue> = load_records("true-range.csv");

    let expected: Vec<_> = reference.iter().map(|r| r.expected).collect();
    assert_series_match(
        "TR",
        &true_range(&bars).unwrap(),
        &open_times(&reference, |r| r.open_time),
        &expected,
    );
}

#[test]
fn dmi_14_matches_reference() {
    let bars = load_reference_ohlcvs();
    let reference: Vec<RefDmiValue> = load_records("dmi-14.csv");
    let times = open_times(&reference, |r| r.open_time);

    let dmi = Dmi::series(DmiConfig::default_14(), &bars).unwrap();

    let expected: Vec<_> = reference.iter().map(|r| r.plus).collect();
    assert_series_match("+DI(14)", &dmi.plus(), &times, &expected);
    let expected: Vec<_> = reference.iter().map(|r| r.minus).collect();
    assert_series_match("-DI(14)", &dmi.minus(), &times, &expected);
}
