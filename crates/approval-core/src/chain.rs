//! On-chain approval state reads.
//!
//! The multisig contract is the source of truth for who has approved;
//! this module decodes its view into the shared `ApprovalState` shape.

use alloy_sol_types::{sol, SolCall};
use approval_config::ChainContext;
use approval_meta::EthCallClient;
use approval_types::{
	Address, ApprovalError, ApprovalState, Bytes, OnChainApproval, Result, TxHash, U256,
};
use async_trait::async_trait;
use tracing::debug;

sol! {
	struct RecordedApproval {
		string role;
		address approver;
		uint64 approvedAt;
		bool confirmed;
	}

	function getApprovalState(bytes32 requestId)
		external
		view
		returns (RecordedApproval[] memory approvals, uint256 threshold, uint256 approvalCount);
}

/// Read access to the multisig's recorded approvals for one request.
#[async_trait]
pub trait ApprovalStateReader: Send + Sync {
	async fn approval_state(&self, onchain_id: TxHash) -> Result<ApprovalState>;
}

/// Reader backed by an `eth_call` to the multisig contract.
pub struct RpcApprovalStateReader {
	client: EthCallClient,
	multisig: Address,
}

impl RpcApprovalStateReader {
	pub fn new(context: &ChainContext) -> Result<Self> {
		Ok(Self {
			client: EthCallClient::new(&context.rpc_url, context.request_timeout)?,
			multisig: context.multisig,
		})
	}
}

#[async_trait]
impl ApprovalStateReader for RpcApprovalStateReader {
	async fn approval_state(&self, onchain_id: TxHash) -> Result<ApprovalState> {
		let data = Bytes::from(getApprovalStateCall { requestId: onchain_id }.abi_encode());
		let raw = self.client.call(self.multisig, data).await?;
		let state = decode_approval_state(&raw, &self.multisig)?;
		debug!(
			onchain_id = %onchain_id,
			approvals = state.approvals.len(),
			threshold = state.threshold,
			"Read on-chain approval state"
		);
		Ok(state)
	}
}

fn decode_approval_state(raw: &[u8], multisig: &Address) -> Result<ApprovalState> {
	let decoded = getApprovalStateCall::abi_decode_returns(raw, true).map_err(|e| {
		ApprovalError::UpstreamUnavailable {
			endpoint: multisig.to_checksum(None),
			reason: format!("undecodable approval state return data: {}", e),
		}
	})?;

	let narrow = |value: U256, field: &str| -> Result<u32> {
		u32::try_from(value).map_err(|_| ApprovalError::UpstreamUnavailable {
			endpoint: multisig.to_checksum(None),
			reason: format!("on-chain {} exceeds u32", field),
		})
	};

	let approvals = decoded
		.approvals
		.into_iter()
		.map(|entry| OnChainApproval {
			role: entry.role,
			approver: entry.approver,
			approved_at: (entry.approvedAt > 0).then_some(entry.approvedAt),
			confirmed: entry.confirmed,
			// Per-approval transaction hashes live in the ledger, not on-chain.
			tx_hash: None,
		})
		.collect();

	Ok(ApprovalState {
		approvals,
		threshold: narrow(decoded.threshold, "threshold")?,
		approval_count: narrow(decoded.approvalCount, "approval count")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_sol_types::SolValue;

	#[test]
	fn test_decodes_a_populated_approval_state() {
		let approvals = vec![
			RecordedApproval {
				role: "SUPERVISOR".to_string(),
				approver: Address::repeat_byte(0x01),
				approvedAt: 1_700_000_000,
				confirmed: true,
			},
			RecordedApproval {
				role: "HR".to_string(),
				approver: Address::ZERO,
				approvedAt: 0,
				confirmed: false,
			},
		];
		let raw = (approvals, U256::from(3u64), U256::from(1u64)).abi_encode_params();

		let state = decode_approval_state(&raw, &Address::repeat_byte(0xee)).unwrap();
		assert_eq!(state.threshold, 3);
		assert_eq!(state.approval_count, 1);
		assert_eq!(state.approvals.len(), 2);
		assert!(state.approvals[0].confirmed);
		assert_eq!(state.approvals[0].approved_at, Some(1_700_000_000));
		assert_eq!(state.approvals[1].approved_at, None);
		assert!(state.approvals.iter().all(|a| a.tx_hash.is_none()));
	}

	#[test]
	fn test_garbage_return_data_maps_to_upstream_unavailable() {
		let err = decode_approval_state(&[0xde, 0xad], &Address::repeat_byte(0xee)).unwrap_err();
		assert!(err.is_retryable());
	}
}
