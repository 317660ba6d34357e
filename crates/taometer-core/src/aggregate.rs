// crates/taometer-core/src/aggregate.rs
//
// Yield aggregation: folds per-event (dividend, stake) pairs into a
// compounded period yield with coverage diagnostics.
//
// Events are processed in the order given. For a root-network run the
// caller supplies them ascending by (block, netuid); yields of events that
// share a block multiply into one combined factor, which compounds across
// blocks — algebraically the same ordered product computed here.

use serde::Serialize;

use crate::config::CalcConfig;
use crate::filter::EligibilityFilter;
use crate::schedule::EpochEvent;

/// Outcome of a single remote lookup. A tagged replacement for the
/// historical `-1` failure sentinel, so a legitimate value can never collide
/// with a failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The lookup succeeded.
    Value(T),
    /// The lookup failed (remote error, timeout, decode failure).
    Failed,
}

impl<T> Fetched<T> {
    /// The fetched value, if the lookup succeeded.
    pub fn value(self) -> Option<T> {
        match self {
            Fetched::Value(v) => Some(v),
            Fetched::Failed => None,
        }
    }
}

impl<T, E> From<Result<T, E>> for Fetched<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(v) => Fetched::Value(v),
            Err(_) => Fetched::Failed,
        }
    }
}

/// Running state of one aggregation pass.
#[derive(Debug, Clone)]
pub struct PeriodAccumulator {
    /// Product of `1 + epoch_yield` over eligible events.
    yield_product: f64,
    /// Sum of dividends over eligible events, in rao.
    dividend_sum: u64,
    /// Events skipped for failure, zero stake, or filter rejection.
    skipped: usize,
    /// Total events considered.
    total: usize,
}

impl PeriodAccumulator {
    fn new() -> Self {
        Self {
            yield_product: 1.0,
            dividend_sum: 0,
            skipped: 0,
            total: 0,
        }
    }

    fn compound(&mut self, dividend: u64, stake: u64) {
        let epoch_yield = dividend as f64 / stake as f64;
        self.yield_product *= 1.0 + epoch_yield;
        self.dividend_sum += dividend;
    }

    fn finish(self) -> YieldSummary {
        let coverage = if self.total == 0 {
            1.0
        } else {
            (self.total - self.skipped) as f64 / self.total as f64
        };
        YieldSummary {
            period_yield: self.yield_product - 1.0,
            total_dividends: self.dividend_sum,
            coverage,
            total_events: self.total,
            skipped_events: self.skipped,
        }
    }
}

/// Result of one aggregation pass over a window of epoch events.
#[derive(Debug, Clone, Serialize)]
pub struct YieldSummary {
    /// Compounded yield over the period (`yield_product - 1`).
    pub period_yield: f64,
    /// Sum of dividends over eligible events, in rao.
    pub total_dividends: u64,
    /// Fraction of events that yielded usable data; 1.0 for an empty window.
    pub coverage: f64,
    /// Number of events in the window.
    pub total_events: usize,
    /// Number of events skipped.
    pub skipped_events: usize,
}

/// Fold fetched dividends and stakes into a period yield.
///
/// Per event, in the order given:
/// - zero dividend contributes nothing and is not counted as skipped (a
///   true zero is a valid non-event);
/// - a failed dividend or stake lookup, a zero stake, or a filter rejection
///   counts as skipped;
/// - otherwise `1 + dividend/stake` multiplies into the yield product.
///
/// Coverage below `cfg.coverage_threshold` logs a low-confidence warning;
/// the computed value is still returned.
pub fn aggregate(
    events: &[EpochEvent],
    dividends: &[Fetched<u64>],
    stakes: &[Fetched<u64>],
    filter: &dyn EligibilityFilter,
    cfg: &CalcConfig,
) -> YieldSummary {
    debug_assert_eq!(events.len(), dividends.len());
    debug_assert_eq!(events.len(), stakes.len());

    let mut acc = PeriodAccumulator::new();

    for (i, event) in events.iter().enumerate() {
        acc.total += 1;

        if dividends[i] == Fetched::Value(0) {
            continue;
        }

        let (dividend, stake) = match (dividends[i].value(), stakes[i].value()) {
            (Some(d), Some(s)) => (d, s),
            _ => {
                tracing::debug!(block = event.block, netuid = event.netuid, "query failed, skipping event");
                acc.skipped += 1;
                continue;
            }
        };

        if stake == 0 {
            tracing::debug!(block = event.block, netuid = event.netuid, "zero stake, skipping event");
            acc.skipped += 1;
            continue;
        }

        if !filter.eligible(event, stake) {
            tracing::debug!(block = event.block, netuid = event.netuid, stake, "stake not eligible, skipping event");
            acc.skipped += 1;
            continue;
        }

        acc.compound(dividend, stake);
    }

    let summary = acc.finish();
    if summary.coverage < cfg.coverage_threshold {
        tracing::warn!(
            coverage = summary.coverage,
            skipped = summary.skipped_events,
            total = summary.total_events,
            "coverage below {:.0}%, results may be inaccurate",
            cfg.coverage_threshold * 100.0
        );
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NoFilters;

    fn events(n: usize) -> Vec<EpochEvent> {
        (0..n)
            .map(|i| EpochEvent {
                block: 1000 + (i as u64) * 361,
                netuid: 1,
                period: 361,
            })
            .collect()
    }

    fn values(raw: &[u64]) -> Vec<Fetched<u64>> {
        raw.iter().map(|&v| Fetched::Value(v)).collect()
    }

    #[test]
    fn test_zero_dividend_is_not_skipped_zero_stake_is() {
        let cfg = CalcConfig::default();
        let events = events(3);
        let dividends = values(&[100, 0, 50]);
        let stakes = values(&[1000, 500, 0]);

        let summary = aggregate(&events, &dividends, &stakes, &NoFilters, &cfg);

        assert!((summary.period_yield - 0.1).abs() < 1e-12);
        assert_eq!(summary.total_dividends, 100);
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.skipped_events, 1);
        assert!((summary.coverage - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_failed_lookups_are_skipped() {
        let cfg = CalcConfig::default();
        let events = events(3);
        let dividends = vec![Fetched::Value(100), Fetched::Failed, Fetched::Value(50)];
        let stakes = vec![Fetched::Value(1000), Fetched::Value(500), Fetched::Failed];

        let summary = aggregate(&events, &dividends, &stakes, &NoFilters, &cfg);

        assert_eq!(summary.skipped_events, 2);
        assert!((summary.period_yield - 0.1).abs() < 1e-12);
        assert_eq!(summary.total_dividends, 100);
    }

    #[test]
    fn test_yields_compound_geometrically() {
        let cfg = CalcConfig::default();
        let events = events(2);
        let dividends = values(&[100, 200]);
        let stakes = values(&[1000, 1000]);

        let summary = aggregate(&events, &dividends, &stakes, &NoFilters, &cfg);

        // (1.1)(1.2) - 1 = 0.32
        assert!((summary.period_yield - 0.32).abs() < 1e-12);
        assert_eq!(summary.total_dividends, 300);
    }

    #[test]
    fn test_compounding_is_order_invariant() {
        // Block-grouped root compounding reduces to a plain product, so the
        // result cannot depend on event order.
        let cfg = CalcConfig::default();
        let events = events(3);
        let forward = aggregate(
            &events,
            &values(&[100, 200, 300]),
            &values(&[1000, 2000, 3000]),
            &NoFilters,
            &cfg,
        );
        let reversed = aggregate(
            &events,
            &values(&[300, 200, 100]),
            &values(&[3000, 2000, 1000]),
            &NoFilters,
            &cfg,
        );
        assert!((forward.period_yield - reversed.period_yield).abs() < 1e-12);
    }

    #[test]
    fn test_empty_window_has_full_coverage_and_zero_yield() {
        let cfg = CalcConfig::default();
        let summary = aggregate(&[], &[], &[], &NoFilters, &cfg);
        assert_eq!(summary.period_yield, 0.0);
        assert_eq!(summary.total_dividends, 0);
        assert_eq!(summary.coverage, 1.0);
    }
}
