// crates/taometer-chain/src/runner.rs
//
// Run orchestration: derives the epoch-event schedule, drives the batched
// fetcher, applies the eligibility policy, and hands the fold to
// taometer-core. All accumulation happens after every query of a phase has
// settled and control is back on the single driving task.

use std::collections::HashMap;

use serde::Serialize;

use taometer_core::{
    aggregate, derive_events, derive_root_events, interval_blocks, project, rao_to_tao,
    resolve_effective_stake, root_interval_blocks, CalcConfig, CombinedStake, EligibilityFilter,
    Interval, MinStake, NoFilters, TaometerError, YieldSummary,
};

use crate::client::ChainClient;
use crate::fetcher::{fetch_all, ProgressCounter};
use crate::state;

/// Runtime knobs for one APY run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of remote lookups in flight at once.
    pub batch_size: usize,
    /// Evaluate the combined-stake filter against the delegation-inherited
    /// stake snapshot as well as the raw one.
    pub inherited: bool,
    /// Disable all eligibility filtering.
    pub no_filters: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            inherited: false,
            no_filters: false,
        }
    }
}

/// Result of one APY run over one interval.
///
/// `None` fields signal "no epoch events in the window", which is distinct
/// from a computed zero. Low coverage warns but still reports the value.
#[derive(Debug, Clone, Serialize)]
pub struct ApyOutcome {
    /// Annualized percentage yield.
    pub apy: Option<f64>,
    /// Total dividends earned over the window, in rao.
    pub total_dividends: Option<u64>,
    /// Aggregation diagnostics for the window.
    pub summary: Option<YieldSummary>,
}

impl ApyOutcome {
    fn empty() -> Self {
        Self {
            apy: None,
            total_dividends: None,
            summary: None,
        }
    }
}

/// Compute the APY of a hotkey on one subnet over an interval, as of `block`.
pub async fn subnet_apy(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    netuid: u16,
    hotkey: &str,
    interval: Interval,
    block: u64,
    opts: &RunOptions,
) -> Result<ApyOutcome, TaometerError> {
    if netuid == 0 {
        return Err(TaometerError::Config(
            "netuid 0 is the root network; use the root-network entry point".to_string(),
        ));
    }

    let subnet = client.subnet_info(netuid, block).await?;
    tracing::info!(
        netuid,
        block,
        last_epoch_block = subnet.last_epoch_block,
        tempo = subnet.tempo,
        "deriving epoch events"
    );

    let mut events = derive_events(
        netuid,
        subnet.tempo,
        interval,
        block,
        subnet.last_epoch_block,
        cfg,
    );
    if events.is_empty() {
        tracing::info!(netuid, "no epoch events inside the window");
        return Ok(ApyOutcome::empty());
    }
    // Schedule is derived newest-first; compound oldest-first.
    events.reverse();

    let dividends = {
        let progress = ProgressCounter::new(events.len());
        let tasks: Vec<_> = events
            .iter()
            .map(|e| {
                let block = e.block;
                move || state::alpha_dividends(client, hotkey, netuid, block)
            })
            .collect();
        tracing::info!(count = events.len(), "fetching dividends");
        fetch_all(tasks, opts.batch_size, || log_progress(&progress)).await
    };

    let stakes = {
        let progress = ProgressCounter::new(events.len());
        let tasks: Vec<_> = events
            .iter()
            .map(|e| {
                let block = e.block;
                move || state::alpha_stake(client, hotkey, netuid, block)
            })
            .collect();
        tracing::info!(count = events.len(), "fetching stakes");
        fetch_all(tasks, opts.batch_size, || log_progress(&progress)).await
    };

    let filter = build_subnet_filter(client, cfg, netuid, hotkey, block, opts).await?;
    let summary = aggregate(&events, &dividends, &stakes, filter.as_ref(), cfg);

    let seconds_in_period = (interval_blocks(subnet.tempo, interval, cfg) * cfg.block_seconds) as f64;
    let apy = project(summary.period_yield, seconds_in_period, cfg);
    tracing::info!(
        apy,
        period_yield = summary.period_yield,
        coverage = summary.coverage,
        "subnet run complete"
    );

    Ok(ApyOutcome {
        apy: Some(apy),
        total_dividends: Some(summary.total_dividends),
        summary: Some(summary),
    })
}

/// Compute the root-network APY of a hotkey over an interval, as of `block`.
///
/// Every subnet contributes its own epoch recurrence; pooled events are
/// compounded in ascending `(block, netuid)` order, so subnets whose
/// recurrence coincides on a block multiply into the same block's factor.
pub async fn root_apy(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    hotkey: &str,
    interval: Interval,
    block: u64,
    opts: &RunOptions,
) -> Result<ApyOutcome, TaometerError> {
    let subnets = client.all_subnets(block).await?;
    if subnets.is_empty() {
        return Err(TaometerError::Invariant(format!(
            "chain reports zero subnets at block {}",
            block
        )));
    }

    let events = derive_root_events(&subnets, interval, block, cfg);
    if events.is_empty() {
        tracing::info!("no epoch events inside the window");
        return Ok(ApyOutcome::empty());
    }
    tracing::info!(
        subnets = subnets.len(),
        events = events.len(),
        "derived pooled root epoch events"
    );

    let dividends = {
        let progress = ProgressCounter::new(events.len());
        let tasks: Vec<_> = events
            .iter()
            .map(|e| {
                let (netuid, block) = (e.netuid, e.block);
                move || state::root_dividends(client, hotkey, netuid, block)
            })
            .collect();
        tracing::info!(count = events.len(), "fetching root dividends");
        fetch_all(tasks, opts.batch_size, || log_progress(&progress)).await
    };

    let stakes = {
        let progress = ProgressCounter::new(events.len());
        let tasks: Vec<_> = events
            .iter()
            .map(|e| {
                let block = e.block;
                move || state::root_stake(client, hotkey, block)
            })
            .collect();
        tracing::info!(count = events.len(), "fetching root stakes");
        fetch_all(tasks, opts.batch_size, || log_progress(&progress)).await
    };

    let filter: Box<dyn EligibilityFilter> = if opts.no_filters {
        Box::new(NoFilters)
    } else {
        Box::new(MinStake {
            min_tao: cfg.combined_stake_threshold_tao,
        })
    };
    let summary = aggregate(&events, &dividends, &stakes, filter.as_ref(), cfg);

    let seconds_in_period = (root_interval_blocks(interval, cfg) * cfg.block_seconds) as f64;
    let apy = project(summary.period_yield, seconds_in_period, cfg);
    tracing::info!(
        apy,
        period_yield = summary.period_yield,
        coverage = summary.coverage,
        "root run complete"
    );

    Ok(ApyOutcome {
        apy: Some(apy),
        total_dividends: Some(summary.total_dividends),
        summary: Some(summary),
    })
}

/// Choose the eligibility policy for a subnet run.
///
/// Inherited mode resolves the delegation graph once at the as-of block:
/// per-event resolution would multiply query volume by the number of edges
/// without changing which events clear the threshold.
async fn build_subnet_filter(
    client: &dyn ChainClient,
    cfg: &CalcConfig,
    netuid: u16,
    hotkey: &str,
    block: u64,
    opts: &RunOptions,
) -> Result<Box<dyn EligibilityFilter>, TaometerError> {
    if opts.no_filters {
        return Ok(Box::new(NoFilters));
    }

    if !opts.inherited {
        return Ok(Box::new(MinStake {
            min_tao: cfg.min_alpha_stake_tao,
        }));
    }

    let tao_weight = state::tao_weight(client, block).await?;
    let root_stake = state::root_stake(client, hotkey, block).await?;
    let alpha_stake = state::alpha_stake(client, hotkey, netuid, block).await?;
    let inherited_root = inherited_stake(client, hotkey, 0, root_stake, block).await?;
    let inherited_alpha = inherited_stake(client, hotkey, netuid, alpha_stake, block).await?;

    Ok(Box::new(CombinedStake {
        root_stake_tao: rao_to_tao(root_stake),
        inherited_root_tao: tao_signed(inherited_root),
        inherited_alpha_tao: tao_signed(inherited_alpha),
        tao_weight,
        threshold_tao: cfg.combined_stake_threshold_tao,
        min_alpha_tao: cfg.min_alpha_stake_tao,
    }))
}

/// Stake attributable to the hotkey on one subnet after delegation
/// redistribution, in rao. May be negative; the filter compares it as-is.
async fn inherited_stake(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    base_stake: u64,
    block: u64,
) -> Result<i64, TaometerError> {
    let parents = state::parent_keys(client, hotkey, netuid, block).await?;
    let children = state::child_keys(client, hotkey, netuid, block).await?;

    let mut parent_stakes = HashMap::new();
    for edge in &parents {
        let stake = state::alpha_stake(client, &edge.hotkey, netuid, block).await?;
        parent_stakes.insert(edge.hotkey.clone(), stake);
    }

    Ok(resolve_effective_stake(base_stake, &parents, &children, |key| {
        parent_stakes.get(key).copied()
    }))
}

fn tao_signed(rao: i64) -> f64 {
    rao as f64 / taometer_core::RAO_PER_TAO as f64
}

fn log_progress(progress: &ProgressCounter) {
    let done = progress.tick();
    if done % 100 == 0 || done == progress.total() {
        tracing::info!("fetched {}/{}", done, progress.total());
    }
}
