// crates/taometer-chain/src/take_flows.rs
//
// Effective-take input strategies: walk the delegation graph and turn
// per-subnet chain state into the `TakeFlows` consumed by the core blend.
//
// Two strategies share the identical blending formula and differ only in
// the per-hotkey flow metric: dividend aggregates, or a validating share of
// per-epoch emission.

use taometer_core::{
    blend_effective_take, clamp_to_cap, contribution_fraction, CalcConfig, TaometerError,
};

use crate::client::ChainClient;
use crate::state;

/// Which per-hotkey flow metric feeds the effective-take blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStrategy {
    /// Per-subnet dividend aggregates.
    Dividends,
    /// Validating share of per-epoch emission:
    /// `emission · blocks_per_epoch · dividends / (dividends + incentive)`.
    ValidatingEmission,
}

/// Blended effective take rate for a hotkey across the given subnets.
///
/// Independent of the yield pipeline: runs its own pass over the delegation
/// graph and is reported alongside, never blended into, the APY number.
pub async fn effective_take(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    hotkey: &str,
    netuids: &[u16],
    block: u64,
    strategy: FlowStrategy,
) -> Result<f64, TaometerError> {
    let owner_take = state::delegate_take(client, hotkey, block).await?;

    let mut flows = taometer_core::TakeFlows::default();
    for &netuid in netuids {
        let cap = state::max_stake_cap(client, netuid, block).await?;

        let own_flow = hotkey_flow(client, cfg, hotkey, netuid, block, strategy).await?;
        flows.total += own_flow;
        flows.from_parents +=
            parent_flows(client, hotkey, netuid, own_flow, cap, block).await?;

        let (to_children, fees) =
            child_flows(client, cfg, hotkey, netuid, cap, block, strategy).await?;
        flows.to_children += to_children;
        flows.child_fees += fees;
    }

    let take = blend_effective_take(owner_take, &flows);
    tracing::info!(owner_take, effective_take = take, "effective take computed");
    Ok(take)
}

/// The flow metric for one hotkey on one subnet under the chosen strategy.
async fn hotkey_flow(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    hotkey: &str,
    netuid: u16,
    block: u64,
    strategy: FlowStrategy,
) -> Result<f64, TaometerError> {
    match strategy {
        FlowStrategy::Dividends => state::dividends_aggregate(client, hotkey, netuid, block).await,
        FlowStrategy::ValidatingEmission => {
            let emission = state::emission(client, hotkey, netuid, block).await?;
            let dividends = state::dividends_aggregate(client, hotkey, netuid, block).await?;
            let incentive = state::incentive(client, hotkey, netuid, block).await?;

            let weight_base = dividends + incentive;
            if weight_base == 0.0 {
                return Ok(0.0);
            }
            Ok(emission * cfg.blocks_per_epoch as f64 * dividends / weight_base)
        }
    }
}

/// Portion of the hotkey's own flow attributable to its parents, net of the
/// child-key take the hotkey retains from them.
async fn parent_flows(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    own_flow: f64,
    cap: u64,
    block: u64,
) -> Result<f64, TaometerError> {
    let child_key_take = state::childkey_take(client, hotkey, netuid, block).await?;
    let total_stake = clamped_total_stake(client, hotkey, cap, block).await?;
    if total_stake == 0 {
        return Ok(0.0);
    }

    let parents = state::parent_keys(client, hotkey, netuid, block).await?;

    let mut total = 0.0;
    for edge in &parents {
        let parent_stake = clamped_total_stake(client, &edge.hotkey, cap, block).await?;
        let fraction = contribution_fraction(parent_stake, edge.proportion, total_stake);
        let parent_flow = fraction * own_flow;
        total += parent_flow - child_key_take * parent_flow;
    }
    Ok(total)
}

/// Flow the hotkey earns through its child keys, and the fees those children
/// retain on the hotkey's share.
async fn child_flows(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    hotkey: &str,
    netuid: u16,
    cap: u64,
    block: u64,
    strategy: FlowStrategy,
) -> Result<(f64, f64), TaometerError> {
    let own_stake = clamped_total_stake(client, hotkey, cap, block).await?;
    let children = state::child_keys(client, hotkey, netuid, block).await?;

    let mut to_children = 0.0;
    let mut fees = 0.0;
    for edge in &children {
        let child_total = clamped_total_stake(client, &edge.hotkey, cap, block).await?;
        if child_total == 0 {
            continue;
        }

        let fraction = contribution_fraction(own_stake, edge.proportion, child_total);
        let child_flow = hotkey_flow(client, cfg, &edge.hotkey, netuid, block, strategy).await?;
        let child_take = state::childkey_take(client, &edge.hotkey, netuid, block).await?;

        to_children += fraction * child_flow;
        fees += fraction * child_flow * child_take;
    }
    Ok((to_children, fees))
}

/// Total stake clamped to the subnet's maximum stake cap. The cap applies
/// only here, in the take-rate path; the inherited-stake filter path keeps
/// the unclamped value.
async fn clamped_total_stake(
    client: &dyn ChainClient,
    hotkey: &str,
    cap: u64,
    block: u64,
) -> Result<u64, TaometerError> {
    let stake = state::total_stake(client, hotkey, block).await?;
    Ok(clamp_to_cap(i64::try_from(stake).unwrap_or(i64::MAX), cap))
}
