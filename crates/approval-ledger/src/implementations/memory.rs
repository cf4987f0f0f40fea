//! In-memory ledger store.
//!
//! Backs unit tests and local development; the production deployment talks
//! to the external ledger service over HTTP.

use crate::LedgerStore;
use approval_types::{ApprovalError, ApprovalStage, Request, RequestId, Result, StageId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryLedgerStore {
	requests: RwLock<HashMap<RequestId, Request>>,
	stages: RwLock<HashMap<StageId, ApprovalStage>>,
}

impl MemoryLedgerStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
	async fn create_request(&self, request: &Request) -> Result<()> {
		self.requests
			.write()
			.await
			.insert(request.id, request.clone());
		Ok(())
	}

	async fn get_request(&self, id: RequestId) -> Result<Request> {
		self.requests
			.read()
			.await
			.get(&id)
			.cloned()
			.ok_or_else(|| ApprovalError::NotFound(format!("request {}", id)))
	}

	async fn update_request(&self, request: &Request) -> Result<()> {
		let mut requests = self.requests.write().await;
		if !requests.contains_key(&request.id) {
			return Err(ApprovalError::NotFound(format!("request {}", request.id)));
		}
		requests.insert(request.id, request.clone());
		Ok(())
	}

	async fn insert_stages(&self, stages: &[ApprovalStage]) -> Result<()> {
		let mut map = self.stages.write().await;
		for stage in stages {
			map.insert(stage.id, stage.clone());
		}
		Ok(())
	}

	async fn list_stages(&self, request_id: RequestId) -> Result<Vec<ApprovalStage>> {
		Ok(self
			.stages
			.read()
			.await
			.values()
			.filter(|s| s.request_id == request_id)
			.cloned()
			.collect())
	}

	async fn get_stage(&self, id: StageId) -> Result<ApprovalStage> {
		self.stages
			.read()
			.await
			.get(&id)
			.cloned()
			.ok_or_else(|| ApprovalError::NotFound(format!("stage {}", id)))
	}

	async fn update_stage(&self, stage: &ApprovalStage) -> Result<()> {
		let mut stages = self.stages.write().await;
		if !stages.contains_key(&stage.id) {
			return Err(ApprovalError::NotFound(format!("stage {}", stage.id)));
		}
		stages.insert(stage.id, stage.clone());
		Ok(())
	}
}
