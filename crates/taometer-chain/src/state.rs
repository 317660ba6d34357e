// crates/taometer-chain/src/state.rs
//
// Typed helpers over the opaque `query_state` surface: each helper knows
// one state item's name, parameter order, and decoding. Unset storage
// (`Value::Null`) decodes to zero, matching the chain's default values.

use serde_json::{json, Value};

use taometer_core::{u16_normalized, u64_normalized, DelegationEdge, TaometerError};

use crate::client::ChainClient;

/// Chain-state item names. Opaque strings as far as the engine is concerned.
pub mod items {
    pub const ALPHA_DIVIDENDS: &str = "AlphaDividendsPerSubnet";
    pub const TAO_DIVIDENDS: &str = "TaoDividendsPerSubnet";
    pub const TOTAL_HOTKEY_ALPHA: &str = "TotalHotkeyAlpha";
    pub const TOTAL_HOTKEY_STAKE: &str = "TotalHotkeyStake";
    pub const PARENT_KEYS: &str = "ParentKeys";
    pub const CHILD_KEYS: &str = "ChildKeys";
    pub const CHILDKEY_TAKE: &str = "ChildkeyTake";
    pub const DELEGATES: &str = "Delegates";
    pub const TAO_WEIGHT: &str = "TaoWeight";
    pub const DIVIDENDS: &str = "Dividends";
    pub const EMISSION: &str = "Emission";
    pub const INCENTIVE: &str = "Incentive";
    pub const MAX_STAKE: &str = "MaxStake";
}

fn decode_u64(value: &Value) -> u64 {
    value.as_u64().unwrap_or(0)
}

fn decode_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

fn decode_u16(value: &Value) -> u16 {
    u16::try_from(decode_u64(value)).unwrap_or(u16::MAX)
}

/// Alpha dividends credited to a hotkey on a subnet at a block, in rao.
pub async fn alpha_dividends(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<u64, TaometerError> {
    let v = client
        .query_state(items::ALPHA_DIVIDENDS, block, &[json!(netuid), json!(hotkey)])
        .await?;
    Ok(decode_u64(&v))
}

/// Root (TAO) dividends credited to a hotkey for a subnet at a block, in rao.
pub async fn root_dividends(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<u64, TaometerError> {
    let v = client
        .query_state(items::TAO_DIVIDENDS, block, &[json!(netuid), json!(hotkey)])
        .await?;
    Ok(decode_u64(&v))
}

/// Total alpha stake of a hotkey on a subnet at a block, in rao.
pub async fn alpha_stake(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<u64, TaometerError> {
    let v = client
        .query_state(items::TOTAL_HOTKEY_ALPHA, block, &[json!(hotkey), json!(netuid)])
        .await?;
    Ok(decode_u64(&v))
}

/// Root-network stake of a hotkey at a block, in rao.
pub async fn root_stake(
    client: &dyn ChainClient,
    hotkey: &str,
    block: u64,
) -> Result<u64, TaometerError> {
    alpha_stake(client, hotkey, 0, block).await
}

/// Total stake of a hotkey across subnets at a block, in rao.
pub async fn total_stake(
    client: &dyn ChainClient,
    hotkey: &str,
    block: u64,
) -> Result<u64, TaometerError> {
    let v = client
        .query_state(items::TOTAL_HOTKEY_STAKE, block, &[json!(hotkey)])
        .await?;
    Ok(decode_u64(&v))
}

/// Chain-wide weight applied to root stake when combining it with alpha
/// stake, normalized to [0, 1].
pub async fn tao_weight(client: &dyn ChainClient, block: u64) -> Result<f64, TaometerError> {
    let v = client.query_state(items::TAO_WEIGHT, block, &[]).await?;
    Ok(u64_normalized(decode_u64(&v)))
}

/// Parent delegation edges of a hotkey on a subnet.
pub async fn parent_keys(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<Vec<DelegationEdge>, TaometerError> {
    let v = client
        .query_state(items::PARENT_KEYS, block, &[json!(hotkey), json!(netuid)])
        .await?;
    decode_edges(&v, items::PARENT_KEYS)
}

/// Child delegation edges of a hotkey on a subnet.
pub async fn child_keys(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<Vec<DelegationEdge>, TaometerError> {
    let v = client
        .query_state(items::CHILD_KEYS, block, &[json!(hotkey), json!(netuid)])
        .await?;
    decode_edges(&v, items::CHILD_KEYS)
}

/// Take rate a hotkey charges its child keys on a subnet, in [0, 1].
pub async fn childkey_take(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<f64, TaometerError> {
    let v = client
        .query_state(items::CHILDKEY_TAKE, block, &[json!(hotkey), json!(netuid)])
        .await?;
    Ok(u16_normalized(decode_u16(&v)))
}

/// The hotkey's registered delegate take rate, in [0, 1].
pub async fn delegate_take(
    client: &dyn ChainClient,
    hotkey: &str,
    block: u64,
) -> Result<f64, TaometerError> {
    let v = client
        .query_state(items::DELEGATES, block, &[json!(hotkey)])
        .await?;
    Ok(u16_normalized(decode_u16(&v)))
}

/// Per-subnet maximum stake cap, in rao. Unset decodes to no cap.
pub async fn max_stake_cap(
    client: &dyn ChainClient,
    netuid: u16,
    block: u64,
) -> Result<u64, TaometerError> {
    let v = client
        .query_state(items::MAX_STAKE, block, &[json!(netuid)])
        .await?;
    Ok(match v.as_u64() {
        Some(0) | None => u64::MAX,
        Some(cap) => cap,
    })
}

/// The hotkey's dividend aggregate on a subnet (consensus output, unit-free).
pub async fn dividends_aggregate(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<f64, TaometerError> {
    let v = client
        .query_state(items::DIVIDENDS, block, &[json!(netuid), json!(hotkey)])
        .await?;
    Ok(decode_f64(&v))
}

/// The hotkey's per-block emission on a subnet, in rao.
pub async fn emission(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<f64, TaometerError> {
    let v = client
        .query_state(items::EMISSION, block, &[json!(netuid), json!(hotkey)])
        .await?;
    Ok(decode_f64(&v))
}

/// The hotkey's incentive aggregate on a subnet (consensus output, unit-free).
pub async fn incentive(
    client: &dyn ChainClient,
    hotkey: &str,
    netuid: u16,
    block: u64,
) -> Result<f64, TaometerError> {
    let v = client
        .query_state(items::INCENTIVE, block, &[json!(netuid), json!(hotkey)])
        .await?;
    Ok(decode_f64(&v))
}

/// Decode a delegation edge list: `[[u64_proportion, hotkey], ...]`.
fn decode_edges(value: &Value, item: &str) -> Result<Vec<DelegationEdge>, TaometerError> {
    if value.is_null() {
        return Ok(Vec::new());
    }

    let entries = value
        .as_array()
        .ok_or_else(|| TaometerError::Serialization(format!("{}: expected an array", item)))?;

    entries
        .iter()
        .map(|entry| {
            let pair = entry.as_array().filter(|p| p.len() == 2).ok_or_else(|| {
                TaometerError::Serialization(format!("{}: expected [proportion, hotkey] pairs", item))
            })?;
            let raw_proportion = pair[0].as_u64().ok_or_else(|| {
                TaometerError::Serialization(format!("{}: non-numeric proportion", item))
            })?;
            let hotkey = pair[1].as_str().ok_or_else(|| {
                TaometerError::Serialization(format!("{}: non-string hotkey", item))
            })?;
            Ok(DelegationEdge::from_u64_proportion(raw_proportion, hotkey))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_edges_null_is_empty() {
        assert!(decode_edges(&Value::Null, "ParentKeys").unwrap().is_empty());
    }

    #[test]
    fn test_decode_edges_pairs() {
        let raw = json!([[u64::MAX, "hk-parent"], [0, "hk-other"]]);
        let edges = decode_edges(&raw, "ParentKeys").unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].hotkey, "hk-parent");
        assert_eq!(edges[0].proportion, 1.0);
        assert_eq!(edges[1].proportion, 0.0);
    }

    #[test]
    fn test_decode_edges_rejects_malformed() {
        assert!(decode_edges(&json!([["not-a-number", "hk"]]), "ChildKeys").is_err());
        assert!(decode_edges(&json!(42), "ChildKeys").is_err());
    }
}
