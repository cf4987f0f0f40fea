//! Typed-data document construction for forwarded calls.

use approval_types::serde_helpers::parse_decimal;
use approval_types::typed_data::{domain_type_fields, TypeField};
use approval_types::{ApprovalError, Eip712Domain, MetaTxRequest, Result, TypedData, U256};
use std::collections::BTreeMap;

/// Primary type carried by every forwarded call.
pub const FORWARD_REQUEST_TYPE: &str = "ForwardRequest";

/// Field layout of the forwarder's request struct.
pub fn forward_request_type_fields() -> Vec<TypeField> {
	vec![
		TypeField::new("from", "address"),
		TypeField::new("to", "address"),
		TypeField::new("value", "uint256"),
		TypeField::new("gas", "uint256"),
		TypeField::new("nonce", "uint256"),
		TypeField::new("deadline", "uint48"),
		TypeField::new("data", "bytes"),
	]
}

/// Parses a caller-supplied numeric field.
///
/// Only plain unsigned decimal integers are representable; negative,
/// fractional or exponent forms fail with `InvalidArgument` naming the
/// offending field.
pub fn parse_numeric(field: &str, raw: &str) -> Result<U256> {
	parse_decimal(raw).map_err(|e| ApprovalError::InvalidArgument(format!("{}: {}", field, e)))
}

/// Builds the canonical typed-data document for a forwarded call.
///
/// Numerics are rendered as decimal strings so the document survives any
/// JSON hop without precision loss; they are parsed back to full-width
/// integers at sign time.
pub fn forward_request_document(domain: &Eip712Domain, request: &MetaTxRequest) -> TypedData {
	let mut types = BTreeMap::new();
	types.insert("EIP712Domain".to_string(), domain_type_fields());
	types.insert(FORWARD_REQUEST_TYPE.to_string(), forward_request_type_fields());

	let message = serde_json::json!({
		"from": request.from.to_checksum(None),
		"to": request.to.to_checksum(None),
		"value": request.value.to_string(),
		"gas": request.gas.to_string(),
		"nonce": request.nonce.to_string(),
		"deadline": request.deadline.to_string(),
		"data": request.data.to_string(),
	});

	TypedData {
		domain: domain.clone(),
		types,
		primary_type: FORWARD_REQUEST_TYPE.to_string(),
		message,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approval_types::{Address, Bytes};

	fn domain() -> Eip712Domain {
		Eip712Domain {
			name: "HRApprovalForwarder".to_string(),
			version: "1".to_string(),
			chain_id: 80002,
			verifying_contract: Address::repeat_byte(0x01),
		}
	}

	fn request() -> MetaTxRequest {
		MetaTxRequest {
			from: Address::repeat_byte(0x02),
			to: Address::repeat_byte(0x03),
			value: U256::ZERO,
			gas: U256::from(300_000u64),
			nonce: U256::from(9u64),
			deadline: 1_700_003_600,
			data: Bytes::from(vec![0xde, 0xad]),
		}
	}

	#[test]
	fn test_document_carries_decimal_string_numerics() {
		let doc = forward_request_document(&domain(), &request());
		assert_eq!(doc.primary_type, FORWARD_REQUEST_TYPE);
		assert_eq!(doc.message_field("gas").unwrap(), "300000");
		assert_eq!(doc.message_field("nonce").unwrap(), "9");
		assert_eq!(doc.message_field("deadline").unwrap(), "1700003600");
		assert_eq!(doc.message_field("data").unwrap(), "0xdead");
	}

	#[test]
	fn test_document_includes_both_type_definitions() {
		let doc = forward_request_document(&domain(), &request());
		assert!(doc.types.contains_key("EIP712Domain"));
		assert_eq!(doc.types[FORWARD_REQUEST_TYPE].len(), 7);
	}

	#[test]
	fn test_parse_numeric_names_the_field() {
		let err = parse_numeric("gas", "-1").unwrap_err();
		assert!(matches!(err, ApprovalError::InvalidArgument(ref m) if m.starts_with("gas:")));

		assert!(parse_numeric("value", "1e18").is_err());
		assert!(parse_numeric("value", "10").is_ok());
	}
}
