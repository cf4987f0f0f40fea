//! Reconciliation of the approval ledger with on-chain multisig state.
//!
//! The ledger and the contract are independently updated records of the
//! same real-world approvals. This crate merges them as a pure function:
//! no I/O, no shared state, and stable output for identical inputs, so the
//! merged view never flickers between renders of the same data.

use approval_types::{
	ApprovalStage, ApproverRole, OnChainApproval, ReconciledApproval, StageStatus,
};
use serde::{Deserialize, Serialize};

/// Progress summary over a reconciled timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
	pub approved_count: u32,
	pub total: u32,
	/// Integer percentage, floored.
	pub progress_percent: u8,
	pub complete: bool,
}

/// Merges ordered ledger stages with the unordered on-chain approval set.
///
/// Matching per stage, in stage order: first an unclaimed on-chain entry
/// with the same normalized role; then the entry at the stage's own index;
/// then the first unclaimed entry of any role. The two fallbacks exist
/// because on-chain role labels are sometimes absent or inconsistently
/// cased; they only ever claim entries whose label carries no recognizable
/// role, and with missing or duplicated labels they can still attribute an
/// approval to the wrong stage. That is a documented best-effort
/// degradation, not a guaranteed-correct mapping.
///
/// Once the contract's quorum threshold is reached, the threshold is
/// authoritative over per-stage bookkeeping: every stage is APPROVED
/// regardless of individual matching.
pub fn reconcile(
	stages: &[ApprovalStage],
	on_chain: &[OnChainApproval],
	quorum_threshold: u32,
) -> Vec<ReconciledApproval> {
	let quorum_reached = quorum_threshold > 0 && on_chain.len() as u32 >= quorum_threshold;

	// A request approved purely on-chain still renders a history.
	if stages.is_empty() {
		return on_chain
			.iter()
			.enumerate()
			.map(|(index, approval)| synthesize(index, approval, quorum_reached))
			.collect();
	}

	let mut claimed = vec![false; on_chain.len()];
	let mut result = Vec::with_capacity(stages.len());

	let mut ordered: Vec<&ApprovalStage> = stages.iter().collect();
	ordered.sort_by_key(|s| s.stage);

	for stage in ordered {
		let matched = claim_for_stage(stage, on_chain, &mut claimed);
		result.push(merge(stage, matched, quorum_reached));
	}

	result
}

/// Derives the progress summary from a reconciled timeline.
pub fn summarize(rows: &[ReconciledApproval]) -> ReconciliationSummary {
	let total = rows.len() as u32;
	let approved_count = rows
		.iter()
		.filter(|r| r.status == StageStatus::Approved)
		.count() as u32;
	let progress_percent = if total == 0 {
		0
	} else {
		((approved_count as u64 * 100) / total as u64) as u8
	};
	ReconciliationSummary {
		approved_count,
		total,
		progress_percent,
		complete: total > 0 && approved_count == total,
	}
}

fn claim_for_stage<'a>(
	stage: &ApprovalStage,
	on_chain: &'a [OnChainApproval],
	claimed: &mut [bool],
) -> Option<&'a OnChainApproval> {
	// Role match against the normalized on-chain label
	let wanted = stage.role.as_str();
	for (index, approval) in on_chain.iter().enumerate() {
		if !claimed[index] && approval.normalized_role() == wanted {
			claimed[index] = true;
			return Some(approval);
		}
	}

	// Positional fallback: the entry at the stage's own index
	let position = (stage.stage as usize).checked_sub(1)?;
	if let Some(approval) = on_chain.get(position) {
		if !claimed[position] && fallback_claimable(approval) {
			claimed[position] = true;
			return Some(approval);
		}
	}

	// Last resort: first unclaimed entry of any role
	for (index, approval) in on_chain.iter().enumerate() {
		if !claimed[index] && fallback_claimable(approval) {
			claimed[index] = true;
			return Some(approval);
		}
	}

	None
}

/// An entry whose label names a known role is only ever claimed by that
/// role's stage; the fallbacks pick up the unlabeled remainder.
fn fallback_claimable(approval: &OnChainApproval) -> bool {
	ApproverRole::from_label(&approval.role).is_none()
}

fn merge(
	stage: &ApprovalStage,
	matched: Option<&OnChainApproval>,
	quorum_reached: bool,
) -> ReconciledApproval {
	let chain_confirmed = matched.map(|a| a.confirmed).unwrap_or(false);
	let status = if quorum_reached || chain_confirmed || stage.status == StageStatus::Approved {
		StageStatus::Approved
	} else {
		stage.status
	};

	ReconciledApproval {
		stage: stage.stage,
		role: stage.role.as_str().to_string(),
		status,
		approver: stage
			.approver
			.clone()
			.or_else(|| matched.map(|a| a.approver.to_checksum(None))),
		decided_at: stage
			.decided_at
			.map(|t| t.timestamp() as u64)
			.or_else(|| matched.and_then(|a| a.approved_at)),
		// The ledger's recorded hash wins; the on-chain entry's is the fallback
		tx_hash: stage.tx_hash.or_else(|| matched.and_then(|a| a.tx_hash)),
	}
}

fn synthesize(
	index: usize,
	approval: &OnChainApproval,
	quorum_reached: bool,
) -> ReconciledApproval {
	let status = if quorum_reached || approval.confirmed {
		StageStatus::Approved
	} else {
		StageStatus::Pending
	};
	ReconciledApproval {
		stage: index as u32 + 1,
		role: approval.normalized_role(),
		status,
		approver: Some(approval.approver.to_checksum(None)),
		decided_at: approval.approved_at,
		tx_hash: approval.tx_hash,
	}
}
