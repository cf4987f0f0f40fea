//! Error taxonomy for the approval protocol.
//!
//! The variants carry the retry semantics of the protocol: callers decide
//! retry eligibility from the category, never from string matching.

use crate::entities::StageStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApprovalError>;

#[derive(Error, Debug)]
pub enum ApprovalError {
	/// Malformed input, caller's fault. Never retried automatically.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// No destination contract address is resolvable for the operation.
	#[error("Missing target contract: {0}")]
	MissingTarget(String),

	/// Transient network or infrastructure failure. Safe to retry with
	/// backoff, but a meta-transaction retry still needs a fresh nonce.
	#[error("Upstream unavailable ({endpoint}): {reason}")]
	UpstreamUnavailable { endpoint: String, reason: String },

	/// The forwarded call reverted on-chain. A retry requires a freshly
	/// prepared and signed request; the same signature is never resent.
	#[error("Relay rejected: {reason}")]
	RelayRejected { reason: String },

	/// The acting identity does not hold the stage's assigned role.
	#[error("Not authorized: {0}")]
	NotAuthorized(String),

	/// The acting identity is the request's own requester.
	#[error("A requester may not approve their own request")]
	SelfApprovalForbidden,

	/// The stage is no longer open for a decision.
	#[error("Stage {stage} is not pending (status: {status:?})")]
	NotPending { stage: u32, status: StageStatus },

	/// The human declined to sign. A normal cancellation, not a failure.
	#[error("Signature request was rejected by the user")]
	SignatureRejectedByUser,

	/// The approval flow cannot proceed with a partial chain configuration.
	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// Revert reasons the relay is expected to surface. Anything outside this
/// set is generalized before reaching the user.
pub(crate) const KNOWN_REVERT_REASONS: &[(&str, &str)] = &[
	("expired deadline", "The signed request expired. Please sign again."),
	("nonce already used", "This request was already submitted. Please sign again."),
	("signature mismatch", "The signature did not match the signer. Please sign again."),
	("already approved", "You have already approved this request."),
	("not an assigned approver", "You are not an assigned approver for this request."),
];

/// Matches a raw revert string against the known reason set, returning the
/// user-facing replacement on a hit.
pub fn match_known_revert(reason: &str) -> Option<&'static str> {
	let lowered = reason.to_ascii_lowercase();
	KNOWN_REVERT_REASONS
		.iter()
		.find(|(needle, _)| lowered.contains(needle))
		.map(|(_, message)| *message)
}

impl ApprovalError {
	/// Whether a caller may retry the same operation without new input.
	pub fn is_retryable(&self) -> bool {
		matches!(self, ApprovalError::UpstreamUnavailable { .. })
	}

	/// Message suitable for the end user.
	///
	/// Business-rule violations are surfaced verbatim; transport failures
	/// collapse to a generic retry hint; raw revert strings are matched
	/// against the known set and otherwise generalized.
	pub fn user_message(&self) -> String {
		match self {
			ApprovalError::UpstreamUnavailable { .. } => {
				"A service is temporarily unavailable. Please try again.".to_string()
			}
			ApprovalError::RelayRejected { reason } => match_known_revert(reason)
				.unwrap_or("The request was rejected on-chain. Please sign a new request.")
				.to_string(),
			ApprovalError::SignatureRejectedByUser => "Signing was cancelled.".to_string(),
			other => other.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_only_transport_failures_are_retryable() {
		let transport = ApprovalError::UpstreamUnavailable {
			endpoint: "relay".to_string(),
			reason: "connection refused".to_string(),
		};
		assert!(transport.is_retryable());

		assert!(!ApprovalError::RelayRejected {
			reason: "nonce already used".to_string()
		}
		.is_retryable());
		assert!(!ApprovalError::InvalidArgument("gas".to_string()).is_retryable());
		assert!(!ApprovalError::SelfApprovalForbidden.is_retryable());
	}

	#[test]
	fn test_known_revert_reasons_map_to_actionable_messages() {
		let err = ApprovalError::RelayRejected {
			reason: "execution reverted: Nonce already used".to_string(),
		};
		assert_eq!(
			err.user_message(),
			"This request was already submitted. Please sign again."
		);
	}

	#[test]
	fn test_unknown_revert_reasons_are_generalized() {
		let err = ApprovalError::RelayRejected {
			reason: "execution reverted: PANIC_CODE_0x32".to_string(),
		};
		// The raw revert string must never leak through unverified
		assert!(!err.user_message().contains("PANIC_CODE"));
	}

	#[test]
	fn test_transport_errors_get_generic_message() {
		let err = ApprovalError::UpstreamUnavailable {
			endpoint: "https://rpc.example".to_string(),
			reason: "timed out".to_string(),
		};
		assert!(err.user_message().contains("try again"));
	}
}
