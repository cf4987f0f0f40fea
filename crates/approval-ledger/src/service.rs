//! Ledger rules: stage creation, listing, and terminal decisions.

use crate::LedgerStore;
use approval_types::{
	Actor, ApprovalError, ApprovalStage, Decision, Request, RequestDetails, RequestId,
	RequestStatus, Result, StageId, StageSpec, StageStatus, TxHash,
};
use approval_types::{Address, RequestKind};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// High-level ledger operations with the protocol's business rules applied.
pub struct LedgerService {
	store: Arc<dyn LedgerStore>,
}

impl LedgerService {
	pub fn new(store: Arc<dyn LedgerStore>) -> Self {
		Self { store }
	}

	/// Creates a draft request for the given employee.
	pub async fn create_request(
		&self,
		requester: &str,
		requester_wallet: Address,
		details: RequestDetails,
		reason: &str,
	) -> Result<Request> {
		let kind = match details {
			RequestDetails::Leave { .. } => RequestKind::Leave,
			RequestDetails::Overtime { .. } => RequestKind::Overtime,
		};
		let request = Request {
			id: RequestId::new(),
			requester: requester.to_string(),
			requester_wallet,
			kind,
			status: RequestStatus::Draft,
			details,
			reason: reason.to_string(),
			onchain_id: None,
			created_at: Utc::now(),
		};
		self.store.create_request(&request).await?;
		info!(request_id = %request.id, kind = ?request.kind, "Created draft request");
		Ok(request)
	}

	pub async fn get_request(&self, id: RequestId) -> Result<Request> {
		self.store.get_request(id).await
	}

	/// Moves a request forward along draft -> pending -> {approved, rejected}.
	///
	/// Transitions are monotonic and never reversed.
	pub async fn set_status(&self, id: RequestId, next: RequestStatus) -> Result<Request> {
		let mut request = self.store.get_request(id).await?;
		if !request.status.can_transition_to(next) {
			return Err(ApprovalError::InvalidArgument(format!(
				"illegal status transition {:?} -> {:?} for request {}",
				request.status, next, id
			)));
		}
		request.status = next;
		self.store.update_request(&request).await?;
		info!(request_id = %id, status = ?next, "Request status advanced");
		Ok(request)
	}

	/// Binds the content-derived on-chain identifier to a request.
	///
	/// The binding is immutable: rebinding to a different hash fails, while
	/// rebinding the same hash is a no-op so a replayed confirmation cannot
	/// corrupt the record.
	pub async fn bind_onchain_id(&self, id: RequestId, onchain_id: TxHash) -> Result<Request> {
		let mut request = self.store.get_request(id).await?;
		match request.onchain_id {
			Some(existing) if existing == onchain_id => Ok(request),
			Some(existing) => Err(ApprovalError::InvalidArgument(format!(
				"request {} is already bound to {}",
				id, existing
			))),
			None => {
				request.onchain_id = Some(onchain_id);
				self.store.update_request(&request).await?;
				info!(request_id = %id, onchain_id = %onchain_id, "Bound on-chain identifier");
				Ok(request)
			}
		}
	}

	/// Creates the approval pipeline for a request.
	///
	/// Stage specs must form a contiguous sequence starting at 1, in order.
	pub async fn create_stages(
		&self,
		request_id: RequestId,
		specs: Vec<StageSpec>,
	) -> Result<Vec<ApprovalStage>> {
		if specs.is_empty() {
			return Err(ApprovalError::InvalidArgument(
				"at least one approval stage is required".to_string(),
			));
		}
		for (index, spec) in specs.iter().enumerate() {
			let expected = index as u32 + 1;
			if spec.stage != expected {
				return Err(ApprovalError::InvalidArgument(format!(
					"stage numbers must be contiguous from 1; position {} has stage {}",
					expected, spec.stage
				)));
			}
		}

		// The request must exist before its pipeline does
		let request = self.store.get_request(request_id).await?;

		let stages: Vec<ApprovalStage> = specs
			.into_iter()
			.map(|spec| ApprovalStage {
				id: StageId::new(),
				request_id: request.id,
				stage: spec.stage,
				role: spec.role,
				approver: spec.approver,
				status: StageStatus::Pending,
				comment: None,
				decided_at: None,
				signature: None,
				tx_hash: None,
			})
			.collect();

		self.store.insert_stages(&stages).await?;
		info!(request_id = %request_id, count = stages.len(), "Created approval stages");
		Ok(stages)
	}

	pub async fn get_stage(&self, id: StageId) -> Result<ApprovalStage> {
		self.store.get_stage(id).await
	}

	/// All stages of a request in pipeline order.
	pub async fn list_stages(&self, request_id: RequestId) -> Result<Vec<ApprovalStage>> {
		let mut stages = self.store.list_stages(request_id).await?;
		stages.sort_by_key(|s| s.stage);
		Ok(stages)
	}

	/// Records an approver's decision on a stage.
	///
	/// A successful decision is terminal: decisions are never edited, only
	/// appended as new stages would be for a re-submission.
	pub async fn decide(
		&self,
		stage_id: StageId,
		actor: &Actor,
		decision: Decision,
		comment: Option<String>,
		signature: Option<String>,
		tx_hash: Option<TxHash>,
	) -> Result<ApprovalStage> {
		let mut stage = self.store.get_stage(stage_id).await?;
		let request = self.store.get_request(stage.request_id).await?;

		ensure_eligible(&stage, &request, actor)?;

		stage.status = match decision {
			Decision::Approve => StageStatus::Approved,
			Decision::Reject => StageStatus::Rejected,
		};
		stage.approver = Some(actor.id.clone());
		stage.comment = comment;
		stage.decided_at = Some(Utc::now());
		stage.signature = signature;
		stage.tx_hash = tx_hash;

		self.store.update_stage(&stage).await?;
		info!(
			stage_id = %stage_id,
			stage = stage.stage,
			role = %stage.role,
			status = ?stage.status,
			"Stage decided"
		);
		Ok(stage)
	}

	/// Verifies that `actor` may decide `stage` without recording anything.
	///
	/// Lets callers fail fast before spending a signature or a relay round
	/// trip on a decision the ledger would refuse anyway.
	pub async fn check_eligibility(&self, stage_id: StageId, actor: &Actor) -> Result<ApprovalStage> {
		let stage = self.store.get_stage(stage_id).await?;
		let request = self.store.get_request(stage.request_id).await?;
		ensure_eligible(&stage, &request, actor)?;
		Ok(stage)
	}

	/// Attaches the relay transaction hash to an already decided stage.
	pub async fn record_submission(&self, stage_id: StageId, tx_hash: TxHash) -> Result<ApprovalStage> {
		let mut stage = self.store.get_stage(stage_id).await?;
		stage.tx_hash = Some(tx_hash);
		self.store.update_stage(&stage).await?;
		Ok(stage)
	}
}

/// Shared decision gate: stage must still be pending, the requester may
/// never decide their own request, and the actor must hold the stage's role.
pub fn ensure_eligible(stage: &ApprovalStage, request: &Request, actor: &Actor) -> Result<()> {
	if stage.status != StageStatus::Pending {
		return Err(ApprovalError::NotPending {
			stage: stage.stage,
			status: stage.status,
		});
	}
	if actor.id == request.requester || actor.wallet == request.requester_wallet {
		return Err(ApprovalError::SelfApprovalForbidden);
	}
	// Role capability, not identity equality: any qualified individual
	// may satisfy the stage's assigned role.
	if !actor.has_role(stage.role) {
		return Err(ApprovalError::NotAuthorized(format!(
			"{} does not hold role {}",
			actor.id, stage.role
		)));
	}
	Ok(())
}
