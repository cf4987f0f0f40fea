//! Meta-transaction request object.

use crate::common::{Address, Bytes, U256};
use crate::serde_helpers::{u256_decimal, u64_decimal};
use serde::{Deserialize, Serialize};

/// The canonical unsigned forwarded-call request.
///
/// Ephemeral: consumed exactly once by a successful relay submission. If the
/// relay fails, the object is discarded and a new one is prepared with a
/// fresh nonce; nonces are never reused across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaTxRequest {
	pub from: Address,
	pub to: Address,
	#[serde(with = "u256_decimal")]
	pub value: U256,
	#[serde(with = "u256_decimal")]
	pub gas: U256,
	#[serde(with = "u256_decimal")]
	pub nonce: U256,
	/// Absolute expiry, Unix seconds. Short-lived by design.
	#[serde(with = "u64_decimal")]
	pub deadline: u64,
	/// ABI-encoded call data for the target contract.
	pub data: Bytes,
}
