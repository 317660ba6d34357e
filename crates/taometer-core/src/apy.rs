// crates/taometer-core/src/apy.rs
//
// Annualization: extrapolates a measured period yield to a yearly
// percentage assuming the period compounds.

use crate::config::CalcConfig;

/// Number of compounding periods per year for a period of the given length.
pub fn compounding_periods(seconds_in_period: f64, cfg: &CalcConfig) -> f64 {
    cfg.seconds_per_year as f64 / seconds_in_period
}

/// Annualized percentage yield for a measured period yield.
///
/// `((1 + period_yield) ^ (seconds_per_year / seconds_in_period) - 1) · 100`.
///
/// Precondition: `period_yield > -1`. A period yield of exactly -100%
/// (total loss) has no real-valued annualization; callers must guard before
/// calling.
pub fn project(period_yield: f64, seconds_in_period: f64, cfg: &CalcConfig) -> f64 {
    let periods = compounding_periods(seconds_in_period, cfg);
    ((1.0 + period_yield).powf(periods) - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, Fetched};
    use crate::filter::NoFilters;
    use crate::schedule::EpochEvent;

    #[test]
    fn test_zero_yield_annualizes_to_zero() {
        let cfg = CalcConfig::default();
        assert_eq!(project(0.0, 86_400.0, &cfg), 0.0);
        assert_eq!(project(0.0, 3_600.0, &cfg), 0.0);
    }

    #[test]
    fn test_daily_yield_compounds_365_times() {
        let cfg = CalcConfig::default();
        // 0.1% per day compounded over 365 days.
        let expected = ((1.0f64 + 0.001).powf(365.0) - 1.0) * 100.0;
        let apy = project(0.001, 86_400.0, &cfg);
        assert!((apy - expected).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_then_project_matches_hand_computed_apy() {
        let cfg = CalcConfig::default();
        let events: Vec<EpochEvent> = (0..2)
            .map(|i| EpochEvent {
                block: 7220 * (i + 1),
                netuid: 1,
                period: 361,
            })
            .collect();
        let dividends = vec![Fetched::Value(40u64), Fetched::Value(60)];
        let stakes = vec![Fetched::Value(20_000u64), Fetched::Value(20_000)];

        let summary = aggregate(&events, &dividends, &stakes, &NoFilters, &cfg);

        // period_yield = 1.002 * 1.003 - 1 = 0.005006
        assert!((summary.period_yield - 0.005006).abs() < 1e-12);

        // 24h window rounded to 7220 blocks of 12s = 86,640 s per period.
        let seconds_in_period = 7220.0 * 12.0;
        let apy = project(summary.period_yield, seconds_in_period, &cfg);

        // Hand computed: (1.005006 ^ (31,536,000 / 86,640) - 1) * 100.
        let expected = (1.005006f64.powf(31_536_000.0 / 86_640.0) - 1.0) * 100.0;
        assert!((apy - expected).abs() < 1e-6);
    }

    #[test]
    fn test_year_period_is_identity() {
        let cfg = CalcConfig::default();
        let apy = project(0.05, cfg.seconds_per_year as f64, &cfg);
        assert!((apy - 5.0).abs() < 1e-9);
    }
}
