//! HTTP client for the external ledger store.
//!
//! Routes: `POST /requests`, `GET/PATCH /requests/:id`, `POST /approvals`,
//! `GET /approvals?requestId=`, `GET/PATCH /approvals/:id`. Entities travel
//! in their canonical serde shapes; big integers as decimal strings.

use crate::LedgerStore;
use approval_types::{
	ApprovalError, ApprovalStage, Request, RequestId, Result, StageId,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct HttpLedgerStore {
	http: reqwest::Client,
	base_url: String,
}

impl HttpLedgerStore {
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ApprovalError::Config(format!("failed to build HTTP client: {}", e)))?;
		Ok(Self {
			http,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	fn unavailable(&self, path: &str, reason: String) -> ApprovalError {
		ApprovalError::UpstreamUnavailable {
			endpoint: self.url(path),
			reason,
		}
	}

	async fn check(&self, path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
		let status = response.status();
		if status == reqwest::StatusCode::NOT_FOUND {
			return Err(ApprovalError::NotFound(self.url(path)));
		}
		if !status.is_success() {
			return Err(self.unavailable(path, format!("ledger store returned HTTP {}", status)));
		}
		Ok(response)
	}
}

#[async_trait]
impl LedgerStore for HttpLedgerStore {
	async fn create_request(&self, request: &Request) -> Result<()> {
		let path = "/requests";
		debug!(request_id = %request.id, "Creating request in ledger store");
		let response = self
			.http
			.post(self.url(path))
			.json(request)
			.send()
			.await
			.map_err(|e| self.unavailable(path, e.to_string()))?;
		self.check(path, response).await?;
		Ok(())
	}

	async fn get_request(&self, id: RequestId) -> Result<Request> {
		let path = format!("/requests/{}", id);
		let response = self
			.http
			.get(self.url(&path))
			.send()
			.await
			.map_err(|e| self.unavailable(&path, e.to_string()))?;
		self.check(&path, response)
			.await?
			.json()
			.await
			.map_err(|e| self.unavailable(&path, format!("malformed body: {}", e)))
	}

	async fn update_request(&self, request: &Request) -> Result<()> {
		let path = format!("/requests/{}", request.id);
		let response = self
			.http
			.patch(self.url(&path))
			.json(request)
			.send()
			.await
			.map_err(|e| self.unavailable(&path, e.to_string()))?;
		self.check(&path, response).await?;
		Ok(())
	}

	async fn insert_stages(&self, stages: &[ApprovalStage]) -> Result<()> {
		let path = "/approvals";
		let response = self
			.http
			.post(self.url(path))
			.json(stages)
			.send()
			.await
			.map_err(|e| self.unavailable(path, e.to_string()))?;
		self.check(path, response).await?;
		Ok(())
	}

	async fn list_stages(&self, request_id: RequestId) -> Result<Vec<ApprovalStage>> {
		let path = format!("/approvals?requestId={}", request_id);
		let response = self
			.http
			.get(self.url(&path))
			.send()
			.await
			.map_err(|e| self.unavailable(&path, e.to_string()))?;
		self.check(&path, response)
			.await?
			.json()
			.await
			.map_err(|e| self.unavailable(&path, format!("malformed body: {}", e)))
	}

	async fn get_stage(&self, id: StageId) -> Result<ApprovalStage> {
		let path = format!("/approvals/{}", id);
		let response = self
			.http
			.get(self.url(&path))
			.send()
			.await
			.map_err(|e| self.unavailable(&path, e.to_string()))?;
		self.check(&path, response)
			.await?
			.json()
			.await
			.map_err(|e| self.unavailable(&path, format!("malformed body: {}", e)))
	}

	async fn update_stage(&self, stage: &ApprovalStage) -> Result<()> {
		let path = format!("/approvals/{}", stage.id);
		let response = self
			.http
			.patch(self.url(&path))
			.json(stage)
			.send()
			.await
			.map_err(|e| self.unavailable(&path, e.to_string()))?;
		self.check(&path, response).await?;
		Ok(())
	}
}
