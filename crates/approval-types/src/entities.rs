//! Entities of the approval protocol.
//!
//! The ledger entities (`Request`, `ApprovalStage`) are the off-chain record
//! of who must approve and what they decided. `OnChainApproval` is a
//! read-only projection of the multisig contract state; it is never written
//! by this subsystem. `ReconciledApproval` is derived on every read and
//! never persisted.

use crate::common::{Address, TxHash};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a leave/overtime request in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for RequestId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Unique identifier of an approval stage row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId(pub Uuid);

impl StageId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for StageId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for StageId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// What the employee is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
	Leave,
	Overtime,
}

/// Request lifecycle status.
///
/// Transitions are monotonic: draft -> pending -> {approved, rejected}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
	Draft,
	Pending,
	Approved,
	Rejected,
}

impl RequestStatus {
	/// Whether moving to `next` is a legal forward transition.
	pub fn can_transition_to(self, next: RequestStatus) -> bool {
		matches!(
			(self, next),
			(RequestStatus::Draft, RequestStatus::Pending)
				| (RequestStatus::Pending, RequestStatus::Approved)
				| (RequestStatus::Pending, RequestStatus::Rejected)
		)
	}

	pub fn is_terminal(self) -> bool {
		matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
	}
}

/// Domain-specific request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestDetails {
	Leave {
		#[serde(rename = "startDate")]
		start_date: NaiveDate,
		#[serde(rename = "endDate")]
		end_date: NaiveDate,
	},
	Overtime {
		date: NaiveDate,
		hours: u32,
	},
}

/// An employee's leave or overtime ask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	pub id: RequestId,
	/// Ledger identity of the requester.
	pub requester: String,
	/// The requester's registered wallet address.
	#[serde(rename = "requesterWallet")]
	pub requester_wallet: Address,
	pub kind: RequestKind,
	pub status: RequestStatus,
	pub details: RequestDetails,
	pub reason: String,
	/// Content-derived hash binding the request on-chain. Immutable once set.
	#[serde(rename = "onchainId")]
	pub onchain_id: Option<TxHash>,
	#[serde(rename = "createdAt")]
	pub created_at: DateTime<Utc>,
}

/// Pipeline role an approval stage is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
	Supervisor,
	Chief,
	Hr,
}

impl ApproverRole {
	/// Parses a role label as recorded off- or on-chain.
	///
	/// Labels are compared after trimming and uppercasing since on-chain
	/// role strings are not consistently cased.
	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim().to_ascii_uppercase().as_str() {
			"SUPERVISOR" => Some(Self::Supervisor),
			"CHIEF" => Some(Self::Chief),
			"HR" => Some(Self::Hr),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Supervisor => "SUPERVISOR",
			Self::Chief => "CHIEF",
			Self::Hr => "HR",
		}
	}
}

impl fmt::Display for ApproverRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Decision status of a ledger stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
	Draft,
	Pending,
	Approved,
	Rejected,
	Blocked,
	Cancelled,
}

impl StageStatus {
	/// A decided stage is terminal; decisions are never edited.
	pub fn is_terminal(self) -> bool {
		matches!(
			self,
			StageStatus::Approved | StageStatus::Rejected | StageStatus::Cancelled
		)
	}
}

/// Specification for one stage at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
	/// 1-based pipeline position; the sequence must be contiguous.
	pub stage: u32,
	pub role: ApproverRole,
	/// Optional fixed approver; when absent the role alone qualifies.
	pub approver: Option<String>,
}

/// One row of the approval ledger: (request, pipeline position).
///
/// The ledger stage is a claim for display purposes; actual authorization
/// enforcement lives on-chain and is corroborated by reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStage {
	pub id: StageId,
	#[serde(rename = "requestId")]
	pub request_id: RequestId,
	/// 1-based, strictly increasing, gapless per request.
	pub stage: u32,
	pub role: ApproverRole,
	pub approver: Option<String>,
	pub status: StageStatus,
	pub comment: Option<String>,
	#[serde(rename = "decidedAt")]
	pub decided_at: Option<DateTime<Utc>>,
	/// Cryptographic signature that carried the decision, hex-encoded.
	pub signature: Option<String>,
	#[serde(rename = "txHash")]
	pub tx_hash: Option<TxHash>,
}

/// One approval recorded by the multisig contract, read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainApproval {
	/// Role label as stored on-chain; may be absent or inconsistently cased.
	pub role: String,
	pub approver: Address,
	#[serde(rename = "approvedAt")]
	pub approved_at: Option<u64>,
	pub confirmed: bool,
	#[serde(rename = "txHash")]
	pub tx_hash: Option<TxHash>,
}

impl OnChainApproval {
	/// Role label normalized for comparison (trimmed, uppercased).
	pub fn normalized_role(&self) -> String {
		self.role.trim().to_ascii_uppercase()
	}
}

/// Snapshot of the multisig contract's view of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalState {
	pub approvals: Vec<OnChainApproval>,
	/// Quorum threshold configured on the contract.
	pub threshold: u32,
	#[serde(rename = "approvalCount")]
	pub approval_count: u32,
}

/// Result of matching one ledger stage to zero-or-one on-chain approval.
///
/// Computed on every read, never cached beyond the request scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledApproval {
	pub stage: u32,
	/// Normalized role label. Rows synthesized from on-chain entries may
	/// carry labels outside the known role set.
	pub role: String,
	pub status: StageStatus,
	pub approver: Option<String>,
	#[serde(rename = "decidedAt")]
	pub decided_at: Option<u64>,
	#[serde(rename = "txHash")]
	pub tx_hash: Option<TxHash>,
}

/// Approve or reject, as submitted by an approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
	Approve,
	Reject,
}

/// The identity acting on a stage.
///
/// Authorization is a capability check on role membership, not identity
/// equality: any qualified individual may satisfy a role.
#[derive(Debug, Clone)]
pub struct Actor {
	pub id: String,
	pub wallet: Address,
	pub roles: Vec<ApproverRole>,
}

impl Actor {
	pub fn has_role(&self, role: ApproverRole) -> bool {
		self.roles.contains(&role)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::Address;

	#[test]
	fn test_request_status_transitions_are_monotonic() {
		use RequestStatus::*;
		assert!(Draft.can_transition_to(Pending));
		assert!(Pending.can_transition_to(Approved));
		assert!(Pending.can_transition_to(Rejected));

		// Never reversed, never skipped
		assert!(!Draft.can_transition_to(Approved));
		assert!(!Approved.can_transition_to(Pending));
		assert!(!Rejected.can_transition_to(Pending));
		assert!(!Pending.can_transition_to(Draft));
	}

	#[test]
	fn test_role_label_normalization() {
		assert_eq!(
			ApproverRole::from_label("  supervisor "),
			Some(ApproverRole::Supervisor)
		);
		assert_eq!(ApproverRole::from_label("Chief"), Some(ApproverRole::Chief));
		assert_eq!(ApproverRole::from_label("hr"), Some(ApproverRole::Hr));
		assert_eq!(ApproverRole::from_label("manager"), None);
		assert_eq!(ApproverRole::from_label(""), None);
	}

	#[test]
	fn test_actor_role_capability() {
		let actor = Actor {
			id: "emp-7".to_string(),
			wallet: Address::ZERO,
			roles: vec![ApproverRole::Chief, ApproverRole::Hr],
		};
		assert!(actor.has_role(ApproverRole::Chief));
		assert!(!actor.has_role(ApproverRole::Supervisor));
	}
}
