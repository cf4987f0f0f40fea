//! EIP-712 digest computation for typed-data documents.
//!
//! Computes the domain separator, the struct hash of a flat primary type
//! (address / uintN / bytes / bytes32 / string / bool fields), and the
//! final digest `keccak256(0x1901 || domainHash || structHash)`.

use crate::SignerError;
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolValue};
use approval_types::serde_helpers::parse_decimal;
use approval_types::{Eip712Domain, TypedData};

/// Minimal ABI encoder for the static words of a struct hash preimage.
struct WordEncoder {
	buf: Vec<u8>,
}

impl WordEncoder {
	fn new() -> Self {
		Self { buf: Vec::new() }
	}

	fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	fn finish(self) -> Vec<u8> {
		self.buf
	}
}

/// Domain separator: keccak256(abi.encode(typeHash, nameHash, versionHash,
/// chainId, verifyingContract)).
pub fn domain_separator(domain: &Eip712Domain) -> B256 {
	let domain_type_hash = keccak256(
		"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
	);

	sol! {
		struct DomainSeparator {
			bytes32 typeHash;
			bytes32 nameHash;
			bytes32 versionHash;
			uint256 chainId;
			address verifyingContract;
		}
	}

	let encoded = DomainSeparator {
		typeHash: domain_type_hash,
		nameHash: keccak256(domain.name.as_bytes()),
		versionHash: keccak256(domain.version.as_bytes()),
		chainId: U256::from(domain.chain_id),
		verifyingContract: domain.verifying_contract,
	};

	keccak256(encoded.abi_encode())
}

/// Canonical type string of the primary type, e.g.
/// `ForwardRequest(address from,...,bytes data)`.
pub fn encode_type(typed: &TypedData) -> Result<String, SignerError> {
	let fields = typed.primary_fields().ok_or_else(|| {
		SignerError::InvalidPayload(format!("unknown primary type: {}", typed.primary_type))
	})?;
	let inner = fields
		.iter()
		.map(|f| format!("{} {}", f.field_type, f.name))
		.collect::<Vec<_>>()
		.join(",");
	Ok(format!("{}({})", typed.primary_type, inner))
}

/// Struct hash of the message under the primary type definition.
pub fn struct_hash(typed: &TypedData) -> Result<B256, SignerError> {
	let type_hash = keccak256(encode_type(typed)?.as_bytes());
	let fields = typed
		.primary_fields()
		.ok_or_else(|| SignerError::InvalidPayload("missing primary type".to_string()))?;

	let mut enc = WordEncoder::new();
	enc.push_b256(&type_hash);

	for field in fields {
		let value = typed.message_field(&field.name).ok_or_else(|| {
			SignerError::InvalidPayload(format!("message is missing field '{}'", field.name))
		})?;
		encode_field(&mut enc, &field.field_type, &field.name, value)?;
	}

	Ok(keccak256(enc.finish()))
}

fn encode_field(
	enc: &mut WordEncoder,
	field_type: &str,
	name: &str,
	value: &serde_json::Value,
) -> Result<(), SignerError> {
	match field_type {
		"address" => {
			let raw = value.as_str().ok_or_else(|| bad_field(name, "address string"))?;
			let addr = raw
				.parse::<Address>()
				.map_err(|e| SignerError::InvalidPayload(format!("field '{}': {}", name, e)))?;
			enc.push_address(&addr);
		}
		t if t.starts_with("uint") => {
			// Numerics arrive as decimal strings; plain JSON integers are
			// tolerated for small values.
			let parsed = match value {
				serde_json::Value::String(s) => parse_decimal(s)
					.map_err(|e| SignerError::InvalidPayload(format!("field '{}': {}", name, e)))?,
				serde_json::Value::Number(n) => {
					let v = n.as_u64().ok_or_else(|| bad_field(name, "unsigned integer"))?;
					U256::from(v)
				}
				_ => return Err(bad_field(name, "decimal string")),
			};
			enc.push_u256(parsed);
		}
		"bytes32" => {
			let raw = value.as_str().ok_or_else(|| bad_field(name, "bytes32 hex string"))?;
			let word = raw
				.parse::<B256>()
				.map_err(|e| SignerError::InvalidPayload(format!("field '{}': {}", name, e)))?;
			enc.push_b256(&word);
		}
		"bytes" => {
			let raw = value.as_str().ok_or_else(|| bad_field(name, "bytes hex string"))?;
			let bytes = hex::decode(raw.trim_start_matches("0x"))
				.map_err(|e| SignerError::InvalidPayload(format!("field '{}': {}", name, e)))?;
			enc.push_b256(&keccak256(bytes));
		}
		"string" => {
			let raw = value.as_str().ok_or_else(|| bad_field(name, "string"))?;
			enc.push_b256(&keccak256(raw.as_bytes()));
		}
		"bool" => {
			let b = value.as_bool().ok_or_else(|| bad_field(name, "bool"))?;
			enc.push_u256(U256::from(b as u8));
		}
		other => {
			return Err(SignerError::InvalidPayload(format!(
				"unsupported field type '{}' for '{}'",
				other, name
			)));
		}
	}
	Ok(())
}

fn bad_field(name: &str, expected: &str) -> SignerError {
	SignerError::InvalidPayload(format!("field '{}' is not a {}", name, expected))
}

/// Final EIP-712 digest of a typed-data document.
pub fn typed_data_digest(typed: &TypedData) -> Result<B256, SignerError> {
	let domain_hash = domain_separator(&typed.domain);
	let message_hash = struct_hash(typed)?;

	let mut preimage = Vec::with_capacity(66);
	preimage.push(0x19);
	preimage.push(0x01);
	preimage.extend_from_slice(domain_hash.as_slice());
	preimage.extend_from_slice(message_hash.as_slice());
	Ok(keccak256(preimage))
}
