//! Configuration types for the approval protocol.

use approval_types::{Address, Eip712Domain};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw configuration as it appears on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
	/// Chain connectivity and contract addresses
	pub chain: ChainSection,
	/// Structured-signing protocol identity
	pub protocol: ProtocolSection,
	/// Network timeouts
	#[serde(default)]
	pub timeouts: TimeoutSection,
}

/// Chain connectivity settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSection {
	/// Chain ID for domain separation and replay protection
	pub chain_id: u64,
	/// JSON-RPC endpoint URL
	pub rpc_url: String,
	/// Trusted forwarder contract address
	pub forwarder: String,
	/// Approval multisig contract address
	pub multisig: String,
}

/// Protocol name/version baked into the signing domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolSection {
	pub name: String,
	pub version: String,
}

/// Network timeouts, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutSection {
	pub request_secs: u64,
}

impl Default for TimeoutSection {
	fn default() -> Self {
		Self { request_secs: 30 }
	}
}

/// Validated chain context consumed by the approval flow.
///
/// Every address has been checksum-normalized; absence of any required
/// field fails configuration loading, so a context always carries a full
/// set of targets.
#[derive(Debug, Clone)]
pub struct ChainContext {
	pub chain_id: u64,
	pub rpc_url: String,
	pub forwarder: Address,
	pub multisig: Address,
	pub protocol_name: String,
	pub protocol_version: String,
	pub request_timeout: Duration,
}

impl ChainContext {
	/// Signing domain for requests verified by the forwarder.
	pub fn forwarder_domain(&self) -> Eip712Domain {
		Eip712Domain {
			name: self.protocol_name.clone(),
			version: self.protocol_version.clone(),
			chain_id: self.chain_id,
			verifying_contract: self.forwarder,
		}
	}

	/// Forwarder address in EIP-55 checksum form.
	pub fn forwarder_checksummed(&self) -> String {
		self.forwarder.to_checksum(None)
	}

	/// Multisig address in EIP-55 checksum form.
	pub fn multisig_checksummed(&self) -> String {
		self.multisig.to_checksum(None)
	}
}
