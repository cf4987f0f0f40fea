//! Relay submission for signed meta-transactions.
//!
//! The relay executes the forwarded call on the signer's behalf and pays
//! gas itself. This client draws one hard line: transport failures
//! (`UpstreamUnavailable`, retryable after a fresh preparation) versus
//! on-chain rejection (`RelayRejected`, never retryable with the same
//! signature). No request is ever resubmitted automatically.

use approval_types::{ApprovalError, MetaTxRequest, Result, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Wire request accepted by `POST /meta/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySubmission {
	pub request: MetaTxRequest,
	/// Hex-encoded 65-byte signature.
	pub signature: String,
}

/// Successful relay response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayReceipt {
	#[serde(rename = "txHash")]
	pub tx_hash: TxHash,
}

/// Error body the relay returns for an on-chain revert.
#[derive(Debug, Clone, Deserialize)]
struct RelayErrorBody {
	error: String,
	#[serde(default)]
	reason: Option<String>,
}

/// A relay endpoint able to execute forwarded calls.
#[async_trait]
pub trait RelayClient: Send + Sync {
	/// Submits a signed request for on-chain execution and returns the
	/// resulting transaction hash.
	async fn submit(&self, submission: &RelaySubmission) -> Result<TxHash>;
}

/// HTTP relay client.
pub struct HttpRelay {
	http: reqwest::Client,
	endpoint: String,
}

impl HttpRelay {
	/// `base_url` is the relay service root; the submit route is appended.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ApprovalError::Config(format!("failed to build HTTP client: {}", e)))?;
		Ok(Self {
			http,
			endpoint: format!("{}/meta/submit", base_url.trim_end_matches('/')),
		})
	}

	fn transport_error(&self, reason: String) -> ApprovalError {
		ApprovalError::UpstreamUnavailable {
			endpoint: self.endpoint.clone(),
			reason,
		}
	}
}

#[async_trait]
impl RelayClient for HttpRelay {
	async fn submit(&self, submission: &RelaySubmission) -> Result<TxHash> {
		info!(
			sender = %submission.request.from,
			target = %submission.request.to,
			nonce = %submission.request.nonce,
			"Submitting signed request to relay"
		);

		let response = self
			.http
			.post(&self.endpoint)
			.json(submission)
			.send()
			.await
			.map_err(|e| self.transport_error(e.to_string()))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| self.transport_error(format!("unreadable relay response: {}", e)))?;

		match classify_response(status.as_u16(), &body) {
			RelayOutcome::Executed(tx_hash) => {
				info!(tx_hash = %tx_hash, "Relay executed forwarded call");
				Ok(tx_hash)
			}
			RelayOutcome::Reverted(reason) => {
				warn!(reason = %reason, "Relay reported on-chain revert");
				Err(ApprovalError::RelayRejected { reason })
			}
			RelayOutcome::TransportFailure(reason) => Err(self.transport_error(reason)),
		}
	}
}

/// Classification of a relay HTTP response.
#[derive(Debug, PartialEq, Eq)]
enum RelayOutcome {
	Executed(TxHash),
	/// The forwarded call reverted on-chain; the reason is kept verbatim
	/// internally and sanitized only at the user-message boundary.
	Reverted(String),
	TransportFailure(String),
}

/// Maps an HTTP status and body onto the protocol's error split.
///
/// 2xx with a txHash is success. An error body counts as an on-chain
/// rejection only when its reason is revert-shaped, whatever the status:
/// a relay-side auth or validation failure (401 "invalid api key") is
/// transport trouble, not something the user's signature caused.
fn classify_response(status: u16, body: &str) -> RelayOutcome {
	if (200..300).contains(&status) {
		return match serde_json::from_str::<RelayReceipt>(body) {
			Ok(receipt) => RelayOutcome::Executed(receipt.tx_hash),
			Err(e) => RelayOutcome::TransportFailure(format!("malformed relay receipt: {}", e)),
		};
	}

	if let Ok(err_body) = serde_json::from_str::<RelayErrorBody>(body) {
		let reason = err_body.reason.unwrap_or(err_body.error);
		if looks_like_revert(&reason) {
			return RelayOutcome::Reverted(reason);
		}
		return RelayOutcome::TransportFailure(reason);
	}

	RelayOutcome::TransportFailure(format!("relay returned HTTP {}", status))
}

/// A reason is revert-shaped when it carries the EVM's revert marker or
/// matches one of the forwarder/multisig failure phrases.
fn looks_like_revert(reason: &str) -> bool {
	reason.to_ascii_lowercase().contains("revert")
		|| approval_types::match_known_revert(reason).is_some()
}

#[cfg(test)]
mod tests {
	use super::*;
	use approval_types::{Address, Bytes, U256, B256};

	fn submission() -> RelaySubmission {
		RelaySubmission {
			request: MetaTxRequest {
				from: Address::repeat_byte(0x01),
				to: Address::repeat_byte(0x02),
				value: U256::ZERO,
				gas: U256::from(300_000u64),
				nonce: U256::from(1u64),
				deadline: 1_700_003_600,
				data: Bytes::from(vec![0xaa]),
			},
			signature: format!("0x{}", "11".repeat(65)),
		}
	}

	#[test]
	fn test_submission_wire_format() {
		let json = serde_json::to_value(submission()).unwrap();
		// Numerics stay decimal strings through the relay hop
		assert_eq!(json["request"]["gas"], "300000");
		assert!(json["signature"].as_str().unwrap().starts_with("0x"));
	}

	#[test]
	fn test_success_response_yields_tx_hash() {
		let body = format!(r#"{{"txHash":"0x{}"}}"#, "ab".repeat(32));
		let outcome = classify_response(200, &body);
		assert_eq!(
			outcome,
			RelayOutcome::Executed(B256::repeat_byte(0xab))
		);
	}

	#[test]
	fn test_revert_body_is_an_onchain_rejection() {
		let outcome = classify_response(
			400,
			r#"{"error":"execution reverted","reason":"nonce already used"}"#,
		);
		assert_eq!(outcome, RelayOutcome::Reverted("nonce already used".to_string()));
	}

	#[test]
	fn test_5xx_revert_shape_is_still_a_rejection() {
		let outcome =
			classify_response(500, r#"{"error":"execution reverted: already approved"}"#);
		assert_eq!(
			outcome,
			RelayOutcome::Reverted("execution reverted: already approved".to_string())
		);
	}

	#[test]
	fn test_relay_side_auth_failure_is_not_an_onchain_rejection() {
		let outcome = classify_response(401, r#"{"error":"invalid api key"}"#);
		assert_eq!(
			outcome,
			RelayOutcome::TransportFailure("invalid api key".to_string())
		);

		let outcome = classify_response(400, r#"{"error":"malformed request body"}"#);
		assert!(matches!(outcome, RelayOutcome::TransportFailure(_)));
	}

	#[test]
	fn test_plain_5xx_is_transport_failure() {
		let outcome = classify_response(502, "Bad Gateway");
		assert!(matches!(outcome, RelayOutcome::TransportFailure(_)));
	}

	#[test]
	fn test_malformed_success_body_is_transport_failure() {
		let outcome = classify_response(200, "not-json");
		assert!(matches!(outcome, RelayOutcome::TransportFailure(_)));
	}

	#[test]
	fn test_error_split_matches_retry_semantics() {
		let reverted = ApprovalError::RelayRejected {
			reason: "expired deadline".to_string(),
		};
		let transport = ApprovalError::UpstreamUnavailable {
			endpoint: "relay".to_string(),
			reason: "timeout".to_string(),
		};
		assert!(!reverted.is_retryable());
		assert!(transport.is_retryable());
	}
}
