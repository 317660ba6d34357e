// crates/taometer-core/src/take.rs
//
// Effective-take blending: combines a validator's raw take rate with the
// dividend (or validating-emission) flows moving through its delegation
// graph into one effective take fraction.
//
// The blend is input-agnostic: the dividend-flow and emission-flow
// strategies feed the same formula with different `TakeFlows` values.

use serde::Serialize;

/// Aggregated economic flows for one hotkey across the queried subnets.
///
/// Values may be dividend aggregates or validating-emission aggregates
/// depending on the input strategy; the blend treats them uniformly.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TakeFlows {
    /// Total flow credited to the hotkey itself.
    pub total: f64,
    /// Portion of `total` attributable to parent keys (already reduced by
    /// the child-key take retained from parents).
    pub from_parents: f64,
    /// Flow earned through child keys, proportional to the stake the hotkey
    /// contributes to each child.
    pub to_children: f64,
    /// Fees retained by child keys on the hotkey's share of their flow.
    pub child_fees: f64,
}

/// Blend the owner's take rate with delegation flows.
///
/// `denominator = total - from_parents + to_children`. A zero denominator
/// means no attributable economic flow and yields exactly 0 (defined, not an
/// error). A negative-zero float result is normalized to positive zero; the
/// sign bit is a subtraction artifact, not a semantic distinction.
pub fn blend_effective_take(owner_take: f64, flows: &TakeFlows) -> f64 {
    let denominator = flows.total - flows.from_parents + flows.to_children;
    if denominator == 0.0 {
        return 0.0;
    }

    let blended =
        (owner_take * (denominator - flows.child_fees) + flows.child_fees) / denominator;

    if blended == 0.0 {
        blended.abs()
    } else {
        blended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delegation_returns_raw_take() {
        let flows = TakeFlows {
            total: 100.0,
            ..Default::default()
        };
        assert!((blend_effective_take(0.18, &flows) - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominator_is_exactly_positive_zero() {
        let flows = TakeFlows::default();
        let take = blend_effective_take(0.18, &flows);
        assert_eq!(take, 0.0);
        assert!(!take.is_sign_negative());

        // Flows cancelling out also hit the zero-denominator branch.
        let cancelling = TakeFlows {
            total: 50.0,
            from_parents: 75.0,
            to_children: 25.0,
            child_fees: 10.0,
        };
        let take = blend_effective_take(-0.5, &cancelling);
        assert_eq!(take, 0.0);
        assert!(!take.is_sign_negative());
    }

    #[test]
    fn test_negative_zero_result_is_normalized() {
        // A zero numerator over a negative denominator is -0.0 in IEEE
        // arithmetic; the blend must report positive zero.
        let flows = TakeFlows {
            total: 0.0,
            from_parents: 10.0,
            to_children: 0.0,
            child_fees: 0.0,
        };
        let take = blend_effective_take(0.0, &flows);
        assert_eq!(take, 0.0);
        assert!(!take.is_sign_negative());
    }

    #[test]
    fn test_child_fees_raise_effective_take() {
        let without_fees = blend_effective_take(
            0.1,
            &TakeFlows {
                total: 100.0,
                to_children: 20.0,
                ..Default::default()
            },
        );
        let with_fees = blend_effective_take(
            0.1,
            &TakeFlows {
                total: 100.0,
                to_children: 20.0,
                child_fees: 5.0,
                ..Default::default()
            },
        );
        assert!(with_fees > without_fees);
    }

    #[test]
    fn test_parent_flows_shrink_denominator() {
        // 10% owner take; 40 of the 100 units flow to parents, so the
        // attributable base is 60 and the blend stays the raw take.
        let flows = TakeFlows {
            total: 100.0,
            from_parents: 40.0,
            ..Default::default()
        };
        assert!((blend_effective_take(0.1, &flows) - 0.1).abs() < 1e-12);
    }
}
