//! Local private-key signer.
//!
//! Holds a key in process memory and signs typed-data digests with it.
//! Suitable for the relayer's own account and for tests; end users sign
//! through their wallets, which satisfy the same trait at the boundary.

use crate::{digest, SignerError, SignerInterface};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use approval_types::{Address, TypedData};
use async_trait::async_trait;
use tracing::debug;

pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key (0x prefix optional).
	pub fn new(private_key_hex: &str) -> Result<Self, SignerError> {
		let stripped = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
		if stripped.len() != 64 {
			return Err(SignerError::InvalidKey(
				"private key must be 64 hex characters (32 bytes)".to_string(),
			));
		}
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| SignerError::InvalidKey(format!("invalid private key: {}", e)))?;

		Ok(Self { signer })
	}
}

#[async_trait]
impl SignerInterface for LocalWallet {
	async fn address(&self) -> Result<Address, SignerError> {
		Ok(self.signer.address())
	}

	async fn sign_typed_data(&self, typed: &TypedData) -> Result<Vec<u8>, SignerError> {
		let digest = digest::typed_data_digest(typed)?;
		debug!(
			primary_type = %typed.primary_type,
			digest = %digest,
			"Signing typed-data digest with local key"
		);

		let signature = self
			.signer
			.sign_hash_sync(&digest)
			.map_err(|e| SignerError::SigningFailed(e.to_string()))?;

		Ok(signature.as_bytes().to_vec())
	}
}
