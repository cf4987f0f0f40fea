//! Meta-transaction preparation.
//!
//! A preparation validates the caller's numerics, reads a fresh
//! replay-protection nonce from the forwarder and produces the canonical
//! unsigned request plus its typed-data document. The nonce read is
//! advisory, not a reservation: two concurrent preparations for the same
//! sender may observe the same nonce, and the on-chain execution rejects
//! whichever signed request arrives stale. Client-side locking would not
//! prevent multi-device races anyway.

use crate::calldata::{decode_nonce, nonce_call_data};
use crate::rpc::EthCallClient;
use crate::typed_data::{forward_request_document, parse_numeric};
use approval_config::ChainContext;
use approval_types::{
	Address, ApprovalError, Bytes, MetaTxRequest, Result, TypedData, U256,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Deadline applied when the caller does not supply one: now + 1 hour.
pub const DEFAULT_DEADLINE_SECS: u64 = 3600;

/// Source of forwarder replay-protection nonces.
///
/// One nonce sequence exists per (sender, forwarder) pair. Implementations
/// must read current chain state and never fabricate a value.
#[async_trait]
pub trait NonceSource: Send + Sync {
	async fn forwarder_nonce(&self, forwarder: Address, sender: Address) -> Result<U256>;
}

/// Nonce source backed by an `eth_call` to the forwarder contract.
pub struct RpcNonceSource {
	client: EthCallClient,
}

impl RpcNonceSource {
	pub fn new(client: EthCallClient) -> Self {
		Self { client }
	}
}

#[async_trait]
impl NonceSource for RpcNonceSource {
	async fn forwarder_nonce(&self, forwarder: Address, sender: Address) -> Result<U256> {
		let raw = self.client.call(forwarder, nonce_call_data(sender)).await?;
		decode_nonce(&raw).map_err(|e| ApprovalError::UpstreamUnavailable {
			endpoint: forwarder.to_checksum(None),
			reason: format!("undecodable nonce return data: {}", e),
		})
	}
}

/// Builds unsigned meta-transaction requests for the configured forwarder.
pub struct Preparer {
	context: ChainContext,
	nonce_source: Arc<dyn NonceSource>,
}

impl Preparer {
	pub fn new(context: ChainContext, nonce_source: Arc<dyn NonceSource>) -> Self {
		Self {
			context,
			nonce_source,
		}
	}

	/// Prepares a forwarded call for signing.
	///
	/// Input validation happens before any network I/O; a malformed gas or
	/// value field never triggers a nonce read. The returned pair is valid
	/// for one relay submission only.
	pub async fn prepare(
		&self,
		sender: Address,
		target: Address,
		call_data: Bytes,
		gas: &str,
		value: &str,
		deadline: Option<u64>,
	) -> Result<(MetaTxRequest, TypedData)> {
		let gas = parse_numeric("gas", gas)?;
		let value = parse_numeric("value", value)?;
		let deadline = deadline.unwrap_or_else(|| now_secs() + DEFAULT_DEADLINE_SECS);

		let nonce = self
			.nonce_source
			.forwarder_nonce(self.context.forwarder, sender)
			.await?;
		debug!(sender = %sender, nonce = %nonce, "Read forwarder nonce");

		let request = MetaTxRequest {
			from: sender,
			to: target,
			value,
			gas,
			nonce,
			deadline,
			data: call_data,
		};
		let document = forward_request_document(&self.context.forwarder_domain(), &request);

		info!(
			sender = %sender,
			target = %target,
			nonce = %nonce,
			deadline,
			"Prepared meta-transaction request"
		);
		Ok((request, document))
	}
}

fn now_secs() -> u64 {
	chrono::Utc::now().timestamp() as u64
}

#[cfg(test)]
mod tests {
	use super::*;
	use approval_config::ConfigLoader;
	use std::sync::atomic::{AtomicU64, Ordering};

	const CONFIG: &str = r#"
		[chain]
		chain_id = 80002
		rpc_url = "https://rpc.example"
		forwarder = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
		multisig = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"

		[protocol]
		name = "HRApprovalForwarder"
		version = "1"
	"#;

	/// Nonce source that counts reads and hands out increasing nonces.
	struct CountingNonceSource {
		reads: AtomicU64,
	}

	impl CountingNonceSource {
		fn new() -> Self {
			Self {
				reads: AtomicU64::new(0),
			}
		}
	}

	#[async_trait]
	impl NonceSource for CountingNonceSource {
		async fn forwarder_nonce(&self, _forwarder: Address, _sender: Address) -> Result<U256> {
			let n = self.reads.fetch_add(1, Ordering::SeqCst);
			Ok(U256::from(n))
		}
	}

	struct FailingNonceSource;

	#[async_trait]
	impl NonceSource for FailingNonceSource {
		async fn forwarder_nonce(&self, forwarder: Address, _sender: Address) -> Result<U256> {
			Err(ApprovalError::UpstreamUnavailable {
				endpoint: forwarder.to_checksum(None),
				reason: "connection refused".to_string(),
			})
		}
	}

	fn preparer(source: Arc<dyn NonceSource>) -> Preparer {
		Preparer::new(ConfigLoader::from_toml(CONFIG).unwrap(), source)
	}

	#[tokio::test]
	async fn test_prepare_reads_a_fresh_nonce_every_time() {
		let source = Arc::new(CountingNonceSource::new());
		let preparer = preparer(source.clone());
		let sender = Address::repeat_byte(0x0a);
		let target = Address::repeat_byte(0x0b);

		let (first, _) = preparer
			.prepare(sender, target, Bytes::new(), "300000", "0", None)
			.await
			.unwrap();
		let (second, _) = preparer
			.prepare(sender, target, Bytes::new(), "300000", "0", None)
			.await
			.unwrap();

		assert_eq!(first.nonce, U256::ZERO);
		assert_eq!(second.nonce, U256::from(1u64));
		assert_eq!(source.reads.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_default_deadline_is_one_hour_out() {
		let preparer = preparer(Arc::new(CountingNonceSource::new()));
		let before = now_secs();
		let (request, _) = preparer
			.prepare(
				Address::repeat_byte(0x0a),
				Address::repeat_byte(0x0b),
				Bytes::new(),
				"300000",
				"0",
				None,
			)
			.await
			.unwrap();
		let after = now_secs();

		assert!(request.deadline >= before + DEFAULT_DEADLINE_SECS);
		assert!(request.deadline <= after + DEFAULT_DEADLINE_SECS);
	}

	#[tokio::test]
	async fn test_invalid_gas_fails_before_any_network_call() {
		let source = Arc::new(CountingNonceSource::new());
		let preparer = preparer(source.clone());

		let err = preparer
			.prepare(
				Address::repeat_byte(0x0a),
				Address::repeat_byte(0x0b),
				Bytes::new(),
				"-1",
				"0",
				None,
			)
			.await
			.unwrap_err();

		assert!(matches!(err, ApprovalError::InvalidArgument(_)));
		// The nonce source must not have been touched
		assert_eq!(source.reads.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_nonce_read_failure_surfaces_upstream_unavailable() {
		let preparer = preparer(Arc::new(FailingNonceSource));
		let err = preparer
			.prepare(
				Address::repeat_byte(0x0a),
				Address::repeat_byte(0x0b),
				Bytes::new(),
				"300000",
				"0",
				None,
			)
			.await
			.unwrap_err();
		assert!(err.is_retryable());
	}

	#[tokio::test]
	async fn test_document_matches_the_prepared_request() {
		let preparer = preparer(Arc::new(CountingNonceSource::new()));
		let sender = Address::repeat_byte(0x0a);
		let (request, document) = preparer
			.prepare(
				sender,
				Address::repeat_byte(0x0b),
				Bytes::from(vec![0xaa]),
				"300000",
				"5",
				Some(1_700_000_000),
			)
			.await
			.unwrap();

		assert_eq!(document.message_field("nonce").unwrap(), &request.nonce.to_string());
		assert_eq!(document.message_field("value").unwrap(), "5");
		assert_eq!(document.message_field("deadline").unwrap(), "1700000000");
		assert_eq!(document.domain.name, "HRApprovalForwarder");
		assert_eq!(document.domain.chain_id, 80002);
	}
}
