//! Minimal JSON-RPC read client.
//!
//! The protocol only ever reads chain state (forwarder nonces, approval
//! state); all writes go through the relay. A thin `eth_call` client is
//! enough here.

use approval_types::{Address, ApprovalError, Bytes, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	result: Option<String>,
	error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
}

/// Read-only `eth_call` client over HTTP JSON-RPC.
#[derive(Clone)]
pub struct EthCallClient {
	http: reqwest::Client,
	url: String,
}

impl EthCallClient {
	pub fn new(url: &str, timeout: Duration) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ApprovalError::Config(format!("failed to build HTTP client: {}", e)))?;
		Ok(Self {
			http,
			url: url.to_string(),
		})
	}

	/// Executes `eth_call` against the latest block and returns the raw
	/// return data. Any transport or endpoint failure maps to
	/// `UpstreamUnavailable`.
	pub async fn call(&self, to: Address, data: Bytes) -> Result<Vec<u8>> {
		let payload = serde_json::json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "eth_call",
			"params": [
				{ "to": to.to_checksum(None), "data": data.to_string() },
				"latest"
			]
		});

		debug!(target_contract = %to, "Executing eth_call");

		let response = self
			.http
			.post(&self.url)
			.json(&payload)
			.send()
			.await
			.map_err(|e| self.unavailable(e.to_string()))?;

		let body: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| self.unavailable(format!("malformed JSON-RPC response: {}", e)))?;

		if let Some(err) = body.error {
			return Err(self.unavailable(format!("RPC error {}: {}", err.code, err.message)));
		}

		let result = body
			.result
			.ok_or_else(|| self.unavailable("JSON-RPC response without result".to_string()))?;
		hex::decode(result.trim_start_matches("0x"))
			.map_err(|e| self.unavailable(format!("non-hex return data: {}", e)))
	}

	fn unavailable(&self, reason: String) -> ApprovalError {
		ApprovalError::UpstreamUnavailable {
			endpoint: self.url.clone(),
			reason,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rpc_error_body_deserializes() {
		let body: JsonRpcResponse = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#,
		)
		.unwrap();
		assert!(body.result.is_none());
		assert_eq!(body.error.unwrap().code, -32000);
	}

	#[test]
	fn test_result_body_deserializes() {
		let body: JsonRpcResponse =
			serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x002a"}"#).unwrap();
		assert_eq!(body.result.unwrap(), "0x002a");
	}
}
