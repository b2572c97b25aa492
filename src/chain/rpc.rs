//! JSON-RPC implementation of the vault configuration reader.
//!
//! Each read is a single `eth_call` against the vault contract. Transient
//! transport failures are retried with exponential backoff; a revert, or
//! running out of retries, surfaces to the caller as `None`.

use crate::domain::{Address, Amount};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use rust_decimal::Decimal as RustDecimal;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{AmountLimits, VaultConfigReader};

// 4-byte selectors for the vault's configuration getters.
const SEL_TREASURY: &str = "0x61d027b3"; // treasury()
const SEL_TREASURY_FEE_PERCENT: &str = "0xd54ad2a1"; // treasuryFeePercent()
const SEL_TOKEN0: &str = "0x0dfe1681"; // token0()
const SEL_TOKEN1: &str = "0xd21220a7"; // token1()
const SEL_TICK_SPACING: &str = "0xd0c93a7c"; // tickSpacing()
const SEL_AMOUNT_LIMITS: &str = "0x6f9ea8ae"; // getAmountLimits()
const SEL_POSITION_MANAGER: &str = "0x791b98bc"; // positionManager()

#[derive(Debug, Clone, Error)]
enum RpcError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    Http(u16),
    #[error("call reverted: {0}")]
    Reverted(String),
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Vault configuration reader backed by an Ethereum JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfigReader {
    client: Client,
    rpc_url: String,
}

impl RpcConfigReader {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
        }
    }

    async fn eth_call(&self, to: &Address, selector: &str) -> Result<Vec<u8>, RpcError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": to.as_str(), "data": selector}, "latest"],
        });

        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(RpcError::Network(e.to_string())))?;

            let status = response.status();
            if status.is_server_error() {
                return Err(backoff::Error::transient(RpcError::Http(status.as_u16())));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RpcError::Http(status.as_u16())));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(RpcError::Parse(e.to_string())))
        })
        .await?;

        if let Some(err) = body.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("execution reverted");
            return Err(RpcError::Reverted(message.to_string()));
        }

        let result = body
            .get("result")
            .and_then(|r| r.as_str())
            .ok_or_else(|| RpcError::Parse("missing result field".to_string()))?;
        let hex_data = result.strip_prefix("0x").unwrap_or(result);
        hex::decode(hex_data).map_err(|e| RpcError::Parse(e.to_string()))
    }

    async fn read_address(&self, vault: &Address, selector: &str, field: &str) -> Option<Address> {
        match self.eth_call(vault, selector).await {
            Ok(data) => decode_address(&data, 0),
            Err(e) => {
                debug!(vault = %vault, field, error = %e, "config read unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl VaultConfigReader for RpcConfigReader {
    async fn treasury(&self, vault: &Address) -> Option<Address> {
        self.read_address(vault, SEL_TREASURY, "treasury").await
    }

    async fn treasury_fee_percent(&self, vault: &Address) -> Option<Amount> {
        match self.eth_call(vault, SEL_TREASURY_FEE_PERCENT).await {
            Ok(data) => decode_uint(&data, 0),
            Err(e) => {
                debug!(vault = %vault, field = "treasuryFeePercent", error = %e, "config read unavailable");
                None
            }
        }
    }

    async fn token_pair(&self, vault: &Address) -> Option<(Address, Address)> {
        let token0 = self.read_address(vault, SEL_TOKEN0, "token0").await?;
        let token1 = self.read_address(vault, SEL_TOKEN1, "token1").await?;
        Some((token0, token1))
    }

    async fn tick_spacing(&self, vault: &Address) -> Option<i64> {
        match self.eth_call(vault, SEL_TICK_SPACING).await {
            Ok(data) => decode_i64(&data, 0),
            Err(e) => {
                debug!(vault = %vault, field = "tickSpacing", error = %e, "config read unavailable");
                None
            }
        }
    }

    async fn amount_limits(&self, vault: &Address) -> Option<AmountLimits> {
        match self.eth_call(vault, SEL_AMOUNT_LIMITS).await {
            Ok(data) => Some(AmountLimits {
                min_amount0: decode_uint(&data, 0)?,
                max_amount0: decode_uint(&data, 1)?,
                min_amount1: decode_uint(&data, 2)?,
                max_amount1: decode_uint(&data, 3)?,
            }),
            Err(e) => {
                debug!(vault = %vault, field = "amountLimits", error = %e, "config read unavailable");
                None
            }
        }
    }

    async fn position_manager(&self, vault: &Address) -> Option<Address> {
        self.read_address(vault, SEL_POSITION_MANAGER, "positionManager")
            .await
    }
}

fn word(data: &[u8], index: usize) -> Option<&[u8]> {
    let start = index * 32;
    data.get(start..start + 32)
}

/// ABI address word: last 20 bytes of a 32-byte word.
fn decode_address(data: &[u8], index: usize) -> Option<Address> {
    word(data, index).map(|w| Address::new(format!("0x{}", hex::encode(&w[12..]))))
}

/// ABI uint word, within the range the Amount type carries losslessly.
fn decode_uint(data: &[u8], index: usize) -> Option<Amount> {
    let w = word(data, index)?;
    if w[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&w[16..]);
    let value = i128::try_from(u128::from_be_bytes(bytes)).ok()?;
    RustDecimal::try_from_i128_with_scale(value, 0)
        .ok()
        .map(Amount::from)
}

/// ABI small-int word (tick spacing fits well inside i64).
fn decode_i64(data: &[u8], index: usize) -> Option<i64> {
    let w = word(data, index)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&w[24..]);
    i64::try_from(u64::from_be_bytes(bytes)).ok()
}
