// crates/taometer-core/src/filter.rs
//
// Pluggable eligibility filters applied per epoch event before a yield is
// compounded. Rejected events count as skipped and lower the coverage ratio.

use crate::config::rao_to_tao;
use crate::schedule::EpochEvent;

/// Decides whether an epoch event's stake is eligible to contribute yield.
pub trait EligibilityFilter: Send + Sync {
    /// Returns true when the event should contribute to the yield product.
    /// `stake_rao` is the stake fetched for the event, in rao.
    fn eligible(&self, event: &EpochEvent, stake_rao: u64) -> bool;
}

/// Accepts every event with nonzero dividend and nonzero stake.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilters;

impl EligibilityFilter for NoFilters {
    fn eligible(&self, _event: &EpochEvent, _stake_rao: u64) -> bool {
        true
    }
}

/// Minimum absolute stake threshold in TAO.
#[derive(Debug, Clone, Copy)]
pub struct MinStake {
    pub min_tao: f64,
}

impl EligibilityFilter for MinStake {
    fn eligible(&self, _event: &EpochEvent, stake_rao: u64) -> bool {
        rao_to_tao(stake_rao) >= self.min_tao
    }
}

/// Tao-weighted combined stake threshold.
///
/// The event's alpha stake is combined with the hotkey's root stake as
/// `root_stake · tao_weight + alpha_stake` and compared against the
/// threshold; the same combination is evaluated with the
/// delegation-inherited snapshot, and the event is accepted when either
/// clears the threshold. Root-side and inherited values are resolved once at
/// the as-of block and carried here as a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CombinedStake {
    /// Hotkey's own root-network stake, in TAO.
    pub root_stake_tao: f64,
    /// Delegation-inherited root stake, in TAO.
    pub inherited_root_tao: f64,
    /// Delegation-inherited alpha stake on the subnet, in TAO. May be
    /// negative when children's claims exceed the base stake.
    pub inherited_alpha_tao: f64,
    /// Chain-wide tao weight applied to root stake.
    pub tao_weight: f64,
    /// Combined-stake acceptance threshold, in TAO.
    pub threshold_tao: f64,
    /// Absolute minimum alpha stake, in TAO.
    pub min_alpha_tao: f64,
}

impl EligibilityFilter for CombinedStake {
    fn eligible(&self, _event: &EpochEvent, stake_rao: u64) -> bool {
        let alpha_tao = rao_to_tao(stake_rao);
        if alpha_tao < self.min_alpha_tao {
            return false;
        }

        let combined = self.root_stake_tao * self.tao_weight + alpha_tao;
        let inherited_combined =
            self.inherited_root_tao * self.tao_weight + self.inherited_alpha_tao;

        combined >= self.threshold_tao || inherited_combined >= self.threshold_tao
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RAO_PER_TAO;

    fn event() -> EpochEvent {
        EpochEvent {
            block: 100,
            netuid: 1,
            period: 361,
        }
    }

    #[test]
    fn test_no_filters_accepts_everything() {
        assert!(NoFilters.eligible(&event(), 1));
        assert!(NoFilters.eligible(&event(), 0));
    }

    #[test]
    fn test_min_stake_threshold() {
        let filter = MinStake { min_tao: 10.0 };
        assert!(!filter.eligible(&event(), 9 * RAO_PER_TAO));
        assert!(filter.eligible(&event(), 10 * RAO_PER_TAO));
    }

    #[test]
    fn test_combined_stake_requires_min_alpha() {
        let filter = CombinedStake {
            root_stake_tao: 1_000_000.0,
            inherited_root_tao: 1_000_000.0,
            inherited_alpha_tao: 1_000_000.0,
            tao_weight: 0.18,
            threshold_tao: 4000.0,
            min_alpha_tao: 10.0,
        };
        // Huge root stake cannot rescue an event below the alpha floor.
        assert!(!filter.eligible(&event(), 5 * RAO_PER_TAO));
    }

    #[test]
    fn test_combined_stake_accepts_when_either_combination_clears() {
        let base = CombinedStake {
            root_stake_tao: 0.0,
            inherited_root_tao: 0.0,
            inherited_alpha_tao: 0.0,
            tao_weight: 0.18,
            threshold_tao: 4000.0,
            min_alpha_tao: 10.0,
        };

        // Raw combination clears on alpha alone.
        assert!(base.eligible(&event(), 5000 * RAO_PER_TAO));

        // Raw fails but the inherited combination clears.
        let inherited = CombinedStake {
            inherited_root_tao: 30_000.0,
            ..base
        };
        assert!(inherited.eligible(&event(), 100 * RAO_PER_TAO));

        // Neither clears.
        assert!(!base.eligible(&event(), 100 * RAO_PER_TAO));
    }
}
