// crates/taometer-core/src/config.rs
//
// Calculation constants for taometer.
//
// Block time, thresholds, and unit conversions are carried in an explicit
// immutable structure passed into every component, so tests can vary them
// without touching global state.

use serde::Deserialize;

/// Number of rao in one TAO (10^9). All on-chain stake and dividend values
/// are denominated in rao.
pub const RAO_PER_TAO: u64 = 1_000_000_000;

/// Calculation constants shared by the scheduler, aggregator, filters, and
/// projector.
#[derive(Debug, Clone, Deserialize)]
pub struct CalcConfig {
    /// Average seconds per block on the observed chain.
    #[serde(default = "default_block_seconds")]
    pub block_seconds: u64,

    /// Seconds in a year used for annualization (365 days).
    #[serde(default = "default_seconds_per_year")]
    pub seconds_per_year: u64,

    /// Minimum fraction of epoch events that must yield usable data before
    /// the result is reported without a low-confidence warning.
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f64,

    /// Minimum alpha stake (in TAO) for an event to be eligible under the
    /// combined-stake filter.
    #[serde(default = "default_min_alpha_stake_tao")]
    pub min_alpha_stake_tao: f64,

    /// Threshold (in TAO) for the tao-weighted combined stake filter and the
    /// root-mode minimum stake.
    #[serde(default = "default_combined_stake_threshold_tao")]
    pub combined_stake_threshold_tao: f64,

    /// Fixed per-epoch block count used by the validating-emission take
    /// strategy to scale per-block emission to a per-epoch figure.
    #[serde(default = "default_blocks_per_epoch")]
    pub blocks_per_epoch: u64,
}

fn default_block_seconds() -> u64 {
    12
}

fn default_seconds_per_year() -> u64 {
    60 * 60 * 24 * 365
}

fn default_coverage_threshold() -> f64 {
    0.9
}

fn default_min_alpha_stake_tao() -> f64 {
    10.0
}

fn default_combined_stake_threshold_tao() -> f64 {
    4000.0
}

fn default_blocks_per_epoch() -> u64 {
    360
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            block_seconds: default_block_seconds(),
            seconds_per_year: default_seconds_per_year(),
            coverage_threshold: default_coverage_threshold(),
            min_alpha_stake_tao: default_min_alpha_stake_tao(),
            combined_stake_threshold_tao: default_combined_stake_threshold_tao(),
            blocks_per_epoch: default_blocks_per_epoch(),
        }
    }
}

/// Convert a rao-denominated amount to TAO.
pub fn rao_to_tao(rao: u64) -> f64 {
    rao as f64 / RAO_PER_TAO as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_chain() {
        let cfg = CalcConfig::default();
        assert_eq!(cfg.block_seconds, 12);
        assert_eq!(cfg.seconds_per_year, 31_536_000);
        assert_eq!(cfg.blocks_per_epoch, 360);
        assert!((cfg.coverage_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rao_to_tao() {
        assert_eq!(rao_to_tao(RAO_PER_TAO), 1.0);
        assert_eq!(rao_to_tao(RAO_PER_TAO / 2), 0.5);
        assert_eq!(rao_to_tao(0), 0.0);
    }
}
