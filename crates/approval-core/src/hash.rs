//! Content-derived on-chain identifiers.
//!
//! A request is registered on-chain under a hash of its own content, so
//! the identifier can be recomputed from the ledger record alone and a
//! tampered record no longer matches its registration.

use approval_types::{keccak256, ApprovalError, Request, RequestKind, Result, TxHash};

/// Computes the on-chain identifier for a ledger request.
///
/// The preimage length-prefixes every variable-length field so distinct
/// requests can never share an encoding.
pub fn request_content_hash(request: &Request) -> Result<TxHash> {
	let details = serde_json::to_vec(&request.details)
		.map_err(|e| ApprovalError::InvalidArgument(format!("unencodable request details: {}", e)))?;

	let mut preimage = Vec::with_capacity(96 + details.len() + request.reason.len());
	preimage.extend_from_slice(request.id.0.as_bytes());
	preimage.extend_from_slice(request.requester_wallet.as_slice());
	push_field(&mut preimage, request.requester.as_bytes());
	preimage.push(match request.kind {
		RequestKind::Leave => 1,
		RequestKind::Overtime => 2,
	});
	push_field(&mut preimage, &details);
	push_field(&mut preimage, request.reason.as_bytes());

	Ok(keccak256(&preimage))
}

fn push_field(preimage: &mut Vec<u8>, field: &[u8]) {
	preimage.extend_from_slice(&(field.len() as u32).to_be_bytes());
	preimage.extend_from_slice(field);
}
