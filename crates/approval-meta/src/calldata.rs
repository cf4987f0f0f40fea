//! ABI call data for the approval multisig and the trusted forwarder.

use alloy_sol_types::{sol, SolCall};
use approval_types::{Address, Bytes, B256, U256};

sol! {
	/// Approval multisig surface used by the protocol.
	function registerRequest(bytes32 requestId, address requester);
	function approveRequest(bytes32 requestId);
	function rejectRequest(bytes32 requestId, string reason);

	/// Replay-protection nonce read on the trusted forwarder.
	function getNonce(address from) returns (uint256);
}

/// Call data binding a request hash to its requester on-chain.
pub fn register_call_data(request_id: B256, requester: Address) -> Bytes {
	registerRequestCall {
		requestId: request_id,
		requester,
	}
	.abi_encode()
	.into()
}

/// Call data for a role approval of the given on-chain request.
pub fn approve_call_data(request_id: B256) -> Bytes {
	approveRequestCall {
		requestId: request_id,
	}
	.abi_encode()
	.into()
}

/// Call data for a role rejection with its stated reason.
pub fn reject_call_data(request_id: B256, reason: &str) -> Bytes {
	rejectRequestCall {
		requestId: request_id,
		reason: reason.to_string(),
	}
	.abi_encode()
	.into()
}

/// Call data for the forwarder nonce read.
pub fn nonce_call_data(sender: Address) -> Bytes {
	getNonceCall { from: sender }.abi_encode().into()
}

/// Decodes the forwarder's `getNonce` return value.
pub fn decode_nonce(raw: &[u8]) -> Result<U256, alloy_sol_types::Error> {
	getNonceCall::abi_decode_returns(raw, true).map(|ret| ret._0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_sol_types::SolValue;

	#[test]
	fn test_call_data_is_deterministic_and_distinct() {
		let id = B256::repeat_byte(0x11);
		let approve = approve_call_data(id);
		assert_eq!(approve, approve_call_data(id));

		let reject = reject_call_data(id, "insufficient balance");
		assert_ne!(approve, reject);
		// Selector comes first
		assert_ne!(approve[..4], reject[..4]);
	}

	#[test]
	fn test_register_encodes_both_arguments() {
		let id = B256::repeat_byte(0x22);
		let requester = Address::repeat_byte(0x33);
		let data = register_call_data(id, requester);
		// selector + two static words
		assert_eq!(data.len(), 4 + 32 + 32);
	}

	#[test]
	fn test_nonce_roundtrip() {
		let encoded = U256::from(42u64).abi_encode();
		assert_eq!(decode_nonce(&encoded).unwrap(), U256::from(42u64));
	}

	#[test]
	fn test_decode_nonce_rejects_garbage() {
		assert!(decode_nonce(&[0x01, 0x02]).is_err());
	}
}
