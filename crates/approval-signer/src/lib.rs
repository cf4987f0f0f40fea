//! Signature authority for the approval protocol.
//!
//! Defines the payload to be signed and how to verify it, never the key
//! custody: the `SignerInterface` trait is satisfied by whatever mechanism
//! the caller controls (external wallet, HSM, local key). Verification is
//! offline ECDSA recovery and never errors on malformed input.

use alloy_primitives::PrimitiveSignature;
use approval_types::{Address, ApprovalError, TypedData};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod digest;
pub mod implementations;

pub use implementations::local::LocalWallet;

#[derive(Debug, Error)]
pub enum SignerError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Invalid payload: {0}")]
	InvalidPayload(String),
	/// The human behind the wallet declined. Not a system failure.
	#[error("Signature request rejected by user")]
	RejectedByUser,
}

impl From<SignerError> for ApprovalError {
	fn from(err: SignerError) -> Self {
		match err {
			SignerError::RejectedByUser => ApprovalError::SignatureRejectedByUser,
			SignerError::InvalidPayload(msg) => ApprovalError::InvalidArgument(msg),
			other => ApprovalError::Other(anyhow::anyhow!(other)),
		}
	}
}

/// Custody-agnostic signing capability.
///
/// Signing is the single suspension point in the approval flow that depends
/// on external human/device interaction; implementations may block on
/// wallet confirmation for as long as the caller's timeout allows.
#[async_trait]
pub trait SignerInterface: Send + Sync {
	/// Address the produced signatures recover to.
	async fn address(&self) -> Result<Address, SignerError>;

	/// Signs the EIP-712 digest of the document. Returns the 65-byte
	/// r || s || v signature.
	async fn sign_typed_data(&self, typed: &TypedData) -> Result<Vec<u8>, SignerError>;
}

/// High-level signing service wrapping a custody provider.
pub struct SignerService {
	provider: Box<dyn SignerInterface>,
}

impl SignerService {
	pub fn new(provider: Box<dyn SignerInterface>) -> Self {
		Self { provider }
	}

	pub async fn address(&self) -> Result<Address, SignerError> {
		self.provider.address().await
	}

	pub async fn sign(&self, typed: &TypedData) -> Result<Vec<u8>, SignerError> {
		self.provider.sign_typed_data(typed).await
	}
}

/// Verifies a (payload, signature, address) triple offline.
///
/// Recovers the signer from the typed-data digest and compares against the
/// expected address. Malformed signatures or payloads return `false`,
/// never an error.
pub fn verify(typed: &TypedData, signature: &[u8], expected: Address) -> bool {
	let digest = match digest::typed_data_digest(typed) {
		Ok(d) => d,
		Err(_) => return false,
	};
	let sig = match PrimitiveSignature::try_from(signature) {
		Ok(s) => s,
		Err(_) => return false,
	};
	match sig.recover_address_from_prehash(&digest) {
		Ok(recovered) => {
			debug!(recovered = %recovered, expected = %expected, "Recovered typed-data signer");
			// Address equality is byte-level, so case differences in any
			// textual representation cannot matter here.
			recovered == expected
		}
		Err(_) => false,
	}
}

/// Verifies against a hex-encoded signature string (with or without 0x).
pub fn verify_hex(typed: &TypedData, signature_hex: &str, expected: Address) -> bool {
	match hex::decode(signature_hex.trim_start_matches("0x")) {
		Ok(bytes) => verify(typed, &bytes, expected),
		Err(_) => false,
	}
}
