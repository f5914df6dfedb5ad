//! Evaluates many [`Rule`]s over one bar history.
//!
//! With the `parallel` feature the rules are spread across the rayon
//! thread pool; results always come back in input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Ohlcv, Result, Rule, Signals};

/// Outcome of one rule in a sweep.
pub type SweepEntry = (Rule, Result<Signals>);

/// Runs every rule in `rules` over `bars`.
///
/// A rule that fails (typically [`InsufficientData`](crate::Error::InsufficientData)
/// for a long lookback on a short history) does not stop the sweep; its
/// error is returned in its slot.
///
/// # Example
///
/// ```
/// use quantedge_bwb::{DmiConfig, Rule, sweep};
/// # use quantedge_bwb::{Ohlcv, Price, Timestamp};
/// #
/// # struct Bar(f64, u64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 + 1.0 }
/// #     fn low(&self) -> Price { self.0 - 1.0 }
/// #     fn close(&self) -> Price { self.0 }
/// #     fn open_time(&self) -> Timestamp { self.1 }
/// # }
///
/// let bars: Vec<Bar> = (0..20).map(|t| Bar(100.0 + t as f64, t)).collect();
/// let rules = [Rule::DmiCross(DmiConfig::default_14())];
///
/// let results = sweep(&bars, &rules);
/// assert_eq!(results.len(), 1);
/// assert!(results[0].1.is_ok());
/// ```
pub fn sweep<B: Ohlcv + Sync>(bars: &[B], rules: &[Rule]) -> Vec<SweepEntry> {
    tracing::debug!(rules = rules.len(), bars = bars.len(), "starting sweep");
    evaluate_all(bars, rules)
}

/// Runs the full default grid of every rule kind.
///
/// # Errors
///
/// Only if building the grid fails; per-rule failures are reported in
/// their entries.
pub fn sweep_grid<B: Ohlcv + Sync>(bars: &[B]) -> Result<Vec<SweepEntry>> {
    Ok(sweep(bars, &Rule::grid()?))
}

#[cfg(feature = "parallel")]
fn evaluate_all<B: Ohlcv + Sync>(bars: &[B], rules: &[Rule]) -> Vec<SweepEntry> {
    rules.par_iter().map(|rule| evaluate(bars, *rule)).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all<B: Ohlcv>(bars: &[B], rules: &[Rule]) -> Vec<SweepEntry> {
    rules.iter().map(|rule| evaluate(bars, *rule)).collect()
}

fn evaluate<B: Ohlcv>(bars: &[B], rule: Rule) -> SweepEntry {
    let signals = rule.signals(bars);

    match &signals {
        Ok(s) => {
            tracing::debug!(%rule, actions = s.actions().count(), "rule evaluated");
        }
        Err(error) => tracing::debug!(%rule, %error, "rule skipped"),
    }

    (rule, signals)
}
