//! Serde helpers for values crossing process boundaries.
//!
//! Large integers are transmitted as decimal strings, never as native
//! floating-point numbers, so they survive JSON round-trips through
//! processes with 53-bit number precision.

use crate::common::U256;

/// Parses a decimal string into a U256.
///
/// Rejects anything that is not a plain base-10 unsigned integer: signs,
/// decimal points, exponents and hex prefixes all fail.
pub fn parse_decimal(raw: &str) -> Result<U256, String> {
	let raw = raw.trim();
	if raw.is_empty() {
		return Err("empty numeric string".to_string());
	}
	if raw.starts_with('-') {
		return Err(format!("negative value not allowed: {}", raw));
	}
	if !raw.bytes().all(|b| b.is_ascii_digit()) {
		return Err(format!("not a base-10 integer: {}", raw));
	}
	U256::from_str_radix(raw, 10).map_err(|e| format!("integer out of range: {}", e))
}

/// U256 as a decimal string on the wire.
pub mod u256_decimal {
	use super::parse_decimal;
	use crate::common::U256;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
		let raw = String::deserialize(deserializer)?;
		parse_decimal(&raw).map_err(serde::de::Error::custom)
	}
}

/// u64 as a decimal string on the wire.
pub mod u64_decimal {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.trim()
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("not a u64: {}", e)))
	}
}
