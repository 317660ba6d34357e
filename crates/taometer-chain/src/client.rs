// crates/taometer-chain/src/client.rs
//
// The chain-query capability: a single async trait the engine depends on,
// with one production HTTP implementation. Tests substitute an in-memory
// fake implementing the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taometer_core::{SubnetInfo, TaometerError};

/// Remote chain-query capability.
///
/// State item names are opaque strings to the engine; `Value::Null` results
/// mean "storage entry unset" and decode to zero downstream. All queries are
/// "as of" a fixed block height.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Query a named chain-state item at a block.
    async fn query_state(
        &self,
        item: &str,
        block: u64,
        params: &[Value],
    ) -> Result<Value, TaometerError>;

    /// Subnet metadata (tempo, epoch position) at a block.
    async fn subnet_info(&self, netuid: u16, block: u64) -> Result<SubnetInfo, TaometerError>;

    /// Metadata for every registered subnet at a block.
    async fn all_subnets(&self, block: u64) -> Result<Vec<SubnetInfo>, TaometerError>;

    /// Current chain height.
    async fn chain_head(&self) -> Result<u64, TaometerError>;
}

/// JSON-RPC request envelope, mirrored by the node endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RpcRequest {
    method: String,
    params: Value,
}

/// JSON-RPC response envelope, mirrored by the node endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RpcResponse {
    success: bool,
    result: Option<Value>,
    error: Option<String>,
}

/// Production client: POSTs JSON-RPC envelopes to a node HTTP endpoint.
///
/// Transport timeouts and retries are the HTTP layer's concern; a failed
/// call surfaces as `TaometerError::Query` and, per-event, degrades to a
/// `Fetched::Failed` in the batched fetcher.
pub struct HttpChainClient {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpChainClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, TaometerError> {
        let request = RpcRequest {
            method: method.to_string(),
            params,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| TaometerError::Query(format!("{}: {}", method, e)))?;

        let rpc: RpcResponse = resp
            .json()
            .await
            .map_err(|e| TaometerError::Query(format!("{}: invalid response: {}", method, e)))?;

        if !rpc.success {
            return Err(TaometerError::Query(
                rpc.error
                    .unwrap_or_else(|| format!("{}: unspecified node error", method)),
            ));
        }
        Ok(rpc.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn query_state(
        &self,
        item: &str,
        block: u64,
        params: &[Value],
    ) -> Result<Value, TaometerError> {
        self.call(
            "state_query",
            serde_json::json!({ "item": item, "block": block, "params": params }),
        )
        .await
    }

    async fn subnet_info(&self, netuid: u16, block: u64) -> Result<SubnetInfo, TaometerError> {
        let value = self
            .call(
                "subnet_info",
                serde_json::json!({ "netuid": netuid, "block": block }),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn all_subnets(&self, block: u64) -> Result<Vec<SubnetInfo>, TaometerError> {
        let value = self
            .call("subnet_list", serde_json::json!({ "block": block }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn chain_head(&self) -> Result<u64, TaometerError> {
        let value = self.call("chain_head", Value::Null).await?;
        value
            .as_u64()
            .ok_or_else(|| TaometerError::Query("chain_head: non-numeric height".to_string()))
    }
}
