//! The approval ledger: the off-chain authoritative record of who must
//! approve, in what order, and what they decided.
//!
//! Stage ordering is advisory metadata for display; authorization
//! enforcement lives on-chain, so a ledger stage is a claim that
//! reconciliation corroborates against contract state.

use approval_types::{ApprovalStage, Request, RequestId, Result, StageId};
use async_trait::async_trait;

pub mod implementations {
	pub mod http;
	pub mod memory;
}
pub mod service;

pub use implementations::http::HttpLedgerStore;
pub use implementations::memory::MemoryLedgerStore;
pub use service::LedgerService;

/// Low-level persistence interface for requests and approval stages.
///
/// Implemented by the external ledger store client and by the in-memory
/// store used in tests.
#[async_trait]
pub trait LedgerStore: Send + Sync {
	async fn create_request(&self, request: &Request) -> Result<()>;

	/// Fails with `NotFound` for an unknown id.
	async fn get_request(&self, id: RequestId) -> Result<Request>;

	async fn update_request(&self, request: &Request) -> Result<()>;

	async fn insert_stages(&self, stages: &[ApprovalStage]) -> Result<()>;

	/// All stages of a request, in no guaranteed order.
	async fn list_stages(&self, request_id: RequestId) -> Result<Vec<ApprovalStage>>;

	/// Fails with `NotFound` for an unknown id.
	async fn get_stage(&self, id: StageId) -> Result<ApprovalStage>;

	async fn update_stage(&self, stage: &ApprovalStage) -> Result<()>;
}
