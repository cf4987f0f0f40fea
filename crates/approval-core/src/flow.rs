//! End-to-end approval flow orchestration.
//!
//! Drives the full meta-transaction cycle for each user action: prepare
//! the forwarded call, collect the wallet signature, submit through the
//! relay and record the outcome in the ledger. Every network hop runs
//! under the configured request timeout; the signing step runs under its
//! own, longer timeout because a human sits behind it.

use crate::chain::ApprovalStateReader;
use crate::hash::request_content_hash;
use approval_config::ChainContext;
use approval_ledger::LedgerService;
use approval_meta::{approve_call_data, register_call_data, reject_call_data, Preparer};
use approval_relay::{RelayClient, RelaySubmission};
use approval_signer::SignerInterface;
use approval_types::{
	Actor, ApprovalError, ApprovalStage, ApprovalState, Decision, ReconciledApproval, Request,
	RequestId, RequestStatus, Result, StageId, TxHash, TypedData,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Gas limit granted to every forwarded call.
const CALL_GAS: &str = "300000";

/// How long a wallet prompt may stay unanswered before the flow treats
/// it as declined.
const DEFAULT_SIGNING_TIMEOUT: Duration = Duration::from_secs(300);

/// Reconciled view of one request, computed fresh on every read.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTimeline {
	pub request: Request,
	pub entries: Vec<ReconciledApproval>,
	pub summary: approval_reconciler::ReconciliationSummary,
}

pub struct ApprovalFlow {
	context: ChainContext,
	preparer: Preparer,
	relay: Arc<dyn RelayClient>,
	ledger: LedgerService,
	reader: Arc<dyn ApprovalStateReader>,
	signing_timeout: Duration,
}

impl ApprovalFlow {
	pub fn new(
		context: ChainContext,
		preparer: Preparer,
		relay: Arc<dyn RelayClient>,
		ledger: LedgerService,
		reader: Arc<dyn ApprovalStateReader>,
	) -> Self {
		Self {
			context,
			preparer,
			relay,
			ledger,
			reader,
			signing_timeout: DEFAULT_SIGNING_TIMEOUT,
		}
	}

	pub fn with_signing_timeout(mut self, timeout: Duration) -> Self {
		self.signing_timeout = timeout;
		self
	}

	pub fn ledger(&self) -> &LedgerService {
		&self.ledger
	}

	/// Registers a draft request on-chain under its content-derived hash.
	///
	/// Nothing is persisted until the requester has signed: a declined or
	/// abandoned wallet prompt leaves the request untouched in draft. The
	/// on-chain id is bound before relay submission so a transport failure
	/// can be retried; the binding is idempotent because the hash is
	/// recomputed from the same content.
	pub async fn register_request(
		&self,
		request_id: RequestId,
		signer: &dyn SignerInterface,
	) -> Result<(Request, TxHash)> {
		let request = self.ledger.get_request(request_id).await?;
		if request.status != RequestStatus::Draft {
			return Err(ApprovalError::InvalidArgument(format!(
				"request {} was already submitted (status: {:?})",
				request.id, request.status
			)));
		}

		let onchain_id = request_content_hash(&request)?;
		let sender = signer.address().await.map_err(ApprovalError::from)?;
		let call_data = register_call_data(onchain_id, request.requester_wallet);

		let (meta, document) = self
			.bounded(
				&self.context.rpc_url,
				self.preparer
					.prepare(sender, self.context.multisig, call_data, CALL_GAS, "0", None),
			)
			.await?;
		let signature = self.collect_signature(signer, &document).await?;

		self.ledger.bind_onchain_id(request.id, onchain_id).await?;
		let tx_hash = self
			.bounded(
				"relay",
				self.relay.submit(&RelaySubmission {
					request: meta,
					signature,
				}),
			)
			.await?;
		let request = self
			.ledger
			.set_status(request.id, RequestStatus::Pending)
			.await?;

		info!(
			request_id = %request.id,
			onchain_id = %onchain_id,
			tx_hash = %tx_hash,
			"Registered request on-chain"
		);
		Ok((request, tx_hash))
	}

	/// Executes an approver's decision as an on-chain meta-transaction and
	/// records it on the stage.
	///
	/// Eligibility is checked before any signature is collected, so an
	/// ineligible actor never sees a wallet prompt. The ledger stage is
	/// only decided after the relay accepted the call; a relay rejection
	/// leaves the stage pending and the next attempt starts from a fresh
	/// preparation.
	pub async fn decide_stage(
		&self,
		stage_id: StageId,
		actor: &Actor,
		signer: &dyn SignerInterface,
		decision: Decision,
		comment: Option<String>,
	) -> Result<ApprovalStage> {
		let stage = self.ledger.check_eligibility(stage_id, actor).await?;
		let request = self.ledger.get_request(stage.request_id).await?;
		let onchain_id = request.onchain_id.ok_or_else(|| {
			ApprovalError::MissingTarget(format!(
				"request {} has no on-chain registration",
				request.id
			))
		})?;

		let call_data = match decision {
			Decision::Approve => approve_call_data(onchain_id),
			Decision::Reject => reject_call_data(onchain_id, comment.as_deref().unwrap_or("")),
		};
		let sender = signer.address().await.map_err(ApprovalError::from)?;
		let (meta, document) = self
			.bounded(
				&self.context.rpc_url,
				self.preparer
					.prepare(sender, self.context.multisig, call_data, CALL_GAS, "0", None),
			)
			.await?;
		let signature = self.collect_signature(signer, &document).await?;

		let tx_hash = self
			.bounded(
				"relay",
				self.relay.submit(&RelaySubmission {
					request: meta,
					signature: signature.clone(),
				}),
			)
			.await?;

		let stage = self
			.ledger
			.decide(stage_id, actor, decision, comment, Some(signature), Some(tx_hash))
			.await?;

		match decision {
			Decision::Reject => {
				self.ledger
					.set_status(request.id, RequestStatus::Rejected)
					.await?;
			}
			Decision::Approve => {
				// Completion depends on chain state; a failed read here must
				// not undo an already executed approval.
				if let Err(e) = self.finalize_if_complete(&request, onchain_id).await {
					warn!(request_id = %request.id, error = %e, "Completion check failed");
				}
			}
		}

		Ok(stage)
	}

	/// The reconciled approval timeline for one request.
	pub async fn timeline(&self, request_id: RequestId) -> Result<RequestTimeline> {
		let request = self.ledger.get_request(request_id).await?;
		let stages = self.ledger.list_stages(request_id).await?;
		let state = match request.onchain_id {
			Some(onchain_id) => {
				self.bounded(&self.context.rpc_url, self.reader.approval_state(onchain_id))
					.await?
			}
			// Unregistered requests have no on-chain history yet.
			None => ApprovalState {
				approvals: Vec::new(),
				threshold: 0,
				approval_count: 0,
			},
		};

		let entries = approval_reconciler::reconcile(&stages, &state.approvals, state.threshold);
		let summary = approval_reconciler::summarize(&entries);
		Ok(RequestTimeline {
			request,
			entries,
			summary,
		})
	}

	/// Marks the request approved once the reconciled view is complete.
	async fn finalize_if_complete(&self, request: &Request, onchain_id: TxHash) -> Result<()> {
		let stages = self.ledger.list_stages(request.id).await?;
		let state = self
			.bounded(&self.context.rpc_url, self.reader.approval_state(onchain_id))
			.await?;
		let entries = approval_reconciler::reconcile(&stages, &state.approvals, state.threshold);
		if approval_reconciler::summarize(&entries).complete {
			self.ledger
				.set_status(request.id, RequestStatus::Approved)
				.await?;
			info!(request_id = %request.id, "Request fully approved");
		}
		Ok(())
	}

	/// Collects a wallet signature under the signing timeout and returns it
	/// hex-encoded. An unanswered prompt is treated as a decline.
	async fn collect_signature(
		&self,
		signer: &dyn SignerInterface,
		document: &TypedData,
	) -> Result<String> {
		match tokio::time::timeout(self.signing_timeout, signer.sign_typed_data(document)).await {
			Ok(Ok(bytes)) => Ok(format!("0x{}", hex::encode(bytes))),
			Ok(Err(err)) => Err(err.into()),
			Err(_) => Err(ApprovalError::SignatureRejectedByUser),
		}
	}

	async fn bounded<T, F>(&self, endpoint: &str, operation: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		match tokio::time::timeout(self.context.request_timeout, operation).await {
			Ok(result) => result,
			Err(_) => Err(ApprovalError::UpstreamUnavailable {
				endpoint: endpoint.to_string(),
				reason: format!("no response within {:?}", self.context.request_timeout),
			}),
		}
	}
}
