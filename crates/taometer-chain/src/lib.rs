// crates/taometer-chain/src/lib.rs
//
// taometer-chain: async chain access and run orchestration.
//
// Exposes the `ChainClient` capability trait (one production HTTP
// implementation; tests substitute an in-memory fake), typed state-query
// helpers, the order-preserving batched fetcher, and the subnet/root APY
// and effective-take runners.

pub mod client;
pub mod fetcher;
pub mod runner;
pub mod state;
pub mod take_flows;

pub use client::{ChainClient, HttpChainClient};
pub use fetcher::{fetch_all, ProgressCounter};
pub use runner::{root_apy, subnet_apy, ApyOutcome, RunOptions};
pub use take_flows::{effective_take, FlowStrategy};
