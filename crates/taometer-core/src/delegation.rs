// crates/taometer-core/src/delegation.rs
//
// Delegation graph resolution: parent and child keys share stake through
// fixed-point proportions encoded on chain.
//
// Two distinct formulas live here and must stay distinct:
//   1. `resolve_effective_stake` — the additive stake delta used by the
//      inherited-stake eligibility filter (may go negative, never clamped).
//   2. `contribution_fraction` — a parent's share of the recipient's total
//      stake, used only for effective-take blending.

use serde::{Deserialize, Serialize};

/// One parent-or-child delegation link with its stake-sharing fraction.
///
/// Multiple edges of the same direction need not sum to 1; each is an
/// independent claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationEdge {
    /// Normalized stake-sharing fraction in [0, 1].
    pub proportion: f64,
    /// Hotkey of the counterparty (the parent or the child).
    pub hotkey: String,
}

impl DelegationEdge {
    /// Build an edge from the chain's u64 fixed-point proportion encoding.
    pub fn from_u64_proportion(raw: u64, hotkey: impl Into<String>) -> Self {
        Self {
            proportion: u64_normalized(raw),
            hotkey: hotkey.into(),
        }
    }
}

/// Normalize a u64 fixed-point chain value into [0, 1].
pub fn u64_normalized(raw: u64) -> f64 {
    raw as f64 / u64::MAX as f64
}

/// Normalize a u16 fixed-point chain value (take rates) into [0, 1].
pub fn u16_normalized(raw: u16) -> f64 {
    raw as f64 / u16::MAX as f64
}

/// Stake attributable to a hotkey after delegation redistribution.
///
/// `base_stake - Σ floor(base_stake · child.proportion)
///             + Σ floor(parent_stake · parent.proportion)`.
///
/// Parents whose stake the lookup cannot resolve contribute nothing. The
/// result may be negative when children's claims exceed the base stake; that
/// is a valid outcome and is not clamped here.
pub fn resolve_effective_stake(
    base_stake: u64,
    parents: &[DelegationEdge],
    children: &[DelegationEdge],
    parent_stake_lookup: impl Fn(&str) -> Option<u64>,
) -> i64 {
    let to_children: i64 = children
        .iter()
        .map(|edge| (base_stake as f64 * edge.proportion) as i64)
        .sum();

    let from_parents: i64 = parents
        .iter()
        .filter_map(|edge| {
            parent_stake_lookup(&edge.hotkey)
                .map(|stake| (stake as f64 * edge.proportion) as i64)
        })
        .sum();

    base_stake as i64 - to_children + from_parents
}

/// Fraction of the recipient's total stake contributed by one parent edge.
///
/// `parent_stake · proportion / recipient_total_stake`, 0 when the recipient
/// has no stake. This measures a contribution share, not a stake delta, and
/// feeds only the effective-take path.
pub fn contribution_fraction(parent_stake: u64, proportion: f64, recipient_total_stake: u64) -> f64 {
    if recipient_total_stake == 0 {
        return 0.0;
    }
    parent_stake as f64 * proportion / recipient_total_stake as f64
}

/// Clamp an effective stake to the subnet's maximum stake cap.
///
/// Applied only in the take-rate path; the inherited-stake filter path keeps
/// the unclamped (possibly negative) value.
pub fn clamp_to_cap(effective_stake: i64, cap: u64) -> u64 {
    if effective_stake <= 0 {
        0
    } else {
        (effective_stake as u64).min(cap)
    }
}
