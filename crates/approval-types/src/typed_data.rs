//! Canonical typed-data documents for structured signing.
//!
//! A document carries the domain, the type map, the primary type and the
//! message, and is what wallets display to the signer. The type map is kept
//! ordered so that rendering the same document twice is byte-identical.

use crate::common::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// EIP-712 domain descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Domain {
	pub name: String,
	pub version: String,
	#[serde(rename = "chainId")]
	pub chain_id: u64,
	#[serde(rename = "verifyingContract")]
	pub verifying_contract: Address,
}

/// One field of a typed-data struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
	pub name: String,
	#[serde(rename = "type")]
	pub field_type: String,
}

impl TypeField {
	pub fn new(name: &str, field_type: &str) -> Self {
		Self {
			name: name.to_string(),
			field_type: field_type.to_string(),
		}
	}
}

/// Complete structured-signing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedData {
	pub domain: Eip712Domain,
	pub types: BTreeMap<String, Vec<TypeField>>,
	#[serde(rename = "primaryType")]
	pub primary_type: String,
	pub message: serde_json::Value,
}

impl TypedData {
	/// Field definitions of the primary type, if present.
	pub fn primary_fields(&self) -> Option<&[TypeField]> {
		self.types.get(&self.primary_type).map(|v| v.as_slice())
	}

	/// Looks up a message field by name.
	pub fn message_field(&self, name: &str) -> Option<&serde_json::Value> {
		self.message.as_object().and_then(|m| m.get(name))
	}
}

/// The standard EIP712Domain type definition.
pub fn domain_type_fields() -> Vec<TypeField> {
	vec![
		TypeField::new("name", "string"),
		TypeField::new("version", "string"),
		TypeField::new("chainId", "uint256"),
		TypeField::new("verifyingContract", "address"),
	]
}
