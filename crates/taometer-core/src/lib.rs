// crates/taometer-core/src/lib.rs
//
// taometer-core: yield aggregation, APY projection, delegation resolution,
// and effective-take blending for validator hotkeys.
//
// This crate is pure computation: no I/O, no async. All on-chain values are
// tracked in rao (1 TAO = 1,000,000,000 rao); yields and take rates are
// unit-free fractions.

pub mod aggregate;
pub mod apy;
pub mod config;
pub mod delegation;
pub mod error;
pub mod filter;
pub mod schedule;
pub mod take;

// Re-export key types for ergonomic access from downstream crates.
pub use aggregate::{aggregate, Fetched, YieldSummary};
pub use apy::{compounding_periods, project};
pub use config::{rao_to_tao, CalcConfig, RAO_PER_TAO};
pub use delegation::{
    clamp_to_cap, contribution_fraction, resolve_effective_stake, u16_normalized, u64_normalized,
    DelegationEdge,
};
pub use error::TaometerError;
pub use filter::{CombinedStake, EligibilityFilter, MinStake, NoFilters};
pub use schedule::{
    derive_events, derive_root_events, interval_blocks, root_interval_blocks, EpochEvent, Interval,
    SubnetInfo,
};
pub use take::{blend_effective_take, TakeFlows};
