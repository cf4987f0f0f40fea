//! Configuration loading from files and environment.

use crate::types::{ChainContext, RawConfig};
use approval_types::{errors::Result, Address, ApprovalError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load and validate configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ChainContext> {
		let path = path.as_ref();
		info!("Loading chain configuration from {:?}", path);

		let contents = std::fs::read_to_string(path).map_err(|e| {
			ApprovalError::Config(format!("Failed to read config file {:?}: {}", path, e))
		})?;
		Self::from_toml(&contents)
	}

	/// Load and validate configuration from a TOML string.
	pub fn from_toml(contents: &str) -> Result<ChainContext> {
		let raw: RawConfig = toml::from_str(contents)
			.map_err(|e| ApprovalError::Config(format!("Failed to parse config: {}", e)))?;
		Self::validate(raw)
	}

	/// Load from a file with environment variable overrides applied.
	pub fn from_env_and_file<P: AsRef<Path>>(path: P) -> Result<ChainContext> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|e| {
			ApprovalError::Config(format!("Failed to read config file {:?}: {}", path, e))
		})?;
		let mut raw: RawConfig = toml::from_str(&contents)
			.map_err(|e| ApprovalError::Config(format!("Failed to parse config: {}", e)))?;

		Self::apply_env_overrides(&mut raw);
		Self::validate(raw)
	}

	/// Apply environment variable overrides.
	fn apply_env_overrides(raw: &mut RawConfig) {
		if let Ok(url) = std::env::var("APPROVAL_RPC_URL") {
			debug!("Overriding RPC URL from environment");
			raw.chain.rpc_url = url;
		}
		if let Ok(addr) = std::env::var("APPROVAL_FORWARDER") {
			debug!("Overriding forwarder address from environment");
			raw.chain.forwarder = addr;
		}
		if let Ok(addr) = std::env::var("APPROVAL_MULTISIG") {
			debug!("Overriding multisig address from environment");
			raw.chain.multisig = addr;
		}
	}

	/// Validate the raw configuration into a usable chain context.
	///
	/// The whole approval flow is blocked on any missing or malformed field;
	/// a partial target set never leaves this function.
	fn validate(raw: RawConfig) -> Result<ChainContext> {
		if raw.chain.chain_id == 0 {
			return Err(ApprovalError::Config("chain.chain_id must be set".to_string()));
		}
		if raw.chain.rpc_url.trim().is_empty() {
			return Err(ApprovalError::Config("chain.rpc_url must be set".to_string()));
		}
		if raw.protocol.name.trim().is_empty() {
			return Err(ApprovalError::Config("protocol.name must be set".to_string()));
		}
		if raw.protocol.version.trim().is_empty() {
			return Err(ApprovalError::Config("protocol.version must be set".to_string()));
		}

		let forwarder = parse_address("chain.forwarder", &raw.chain.forwarder)?;
		let multisig = parse_address("chain.multisig", &raw.chain.multisig)?;

		Ok(ChainContext {
			chain_id: raw.chain.chain_id,
			rpc_url: raw.chain.rpc_url.trim().to_string(),
			forwarder,
			multisig,
			protocol_name: raw.protocol.name,
			protocol_version: raw.protocol.version,
			request_timeout: Duration::from_secs(raw.timeouts.request_secs),
		})
	}
}

/// Parses and checksum-normalizes a contract address.
fn parse_address(field: &str, value: &str) -> Result<Address> {
	let value = value.trim();
	if value.is_empty() {
		return Err(ApprovalError::Config(format!("{} must be set", field)));
	}
	value
		.parse::<Address>()
		.map_err(|e| ApprovalError::Config(format!("{} is not a valid address: {}", field, e)))
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALID: &str = r#"
		[chain]
		chain_id = 80002
		rpc_url = "https://rpc-amoy.polygon.technology"
		forwarder = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
		multisig = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"

		[protocol]
		name = "HRApprovalForwarder"
		version = "1"
	"#;

	#[test]
	fn test_valid_config_loads_with_checksummed_addresses() {
		let ctx = ConfigLoader::from_toml(VALID).unwrap();
		assert_eq!(ctx.chain_id, 80002);
		// Lowercase input is accepted and normalized to EIP-55
		assert_eq!(
			ctx.forwarder_checksummed(),
			"0x5FbDB2315678afecb367f032d93F642f64180aa3"
		);
		assert_eq!(ctx.request_timeout, Duration::from_secs(30));
	}

	#[test]
	fn test_domain_is_derived_from_config() {
		let ctx = ConfigLoader::from_toml(VALID).unwrap();
		let domain = ctx.forwarder_domain();
		assert_eq!(domain.name, "HRApprovalForwarder");
		assert_eq!(domain.version, "1");
		assert_eq!(domain.chain_id, 80002);
		assert_eq!(domain.verifying_contract, ctx.forwarder);
	}

	#[test]
	fn test_missing_field_blocks_the_flow() {
		let without_multisig = r#"
			[chain]
			chain_id = 1
			rpc_url = "https://rpc.example"
			forwarder = "0x5fbdb2315678afecb367f032d93f642f64180aa3"

			[protocol]
			name = "HRApprovalForwarder"
			version = "1"
		"#;
		let err = ConfigLoader::from_toml(without_multisig).unwrap_err();
		assert!(matches!(err, ApprovalError::Config(_)));
	}

	#[test]
	fn test_malformed_address_is_rejected() {
		let bad = VALID.replace("0xe7f1725e7734ce288f8367e1bb143e90bb3f0512", "not-an-address");
		let err = ConfigLoader::from_toml(&bad).unwrap_err();
		assert!(matches!(err, ApprovalError::Config(_)));
	}

	#[test]
	fn test_empty_rpc_url_is_rejected() {
		let bad = VALID.replace("https://rpc-amoy.polygon.technology", "  ");
		assert!(ConfigLoader::from_toml(&bad).is_err());
	}
}
