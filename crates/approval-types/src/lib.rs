//! Shared types for the gasless approval protocol.
//!
//! This crate defines the entities exchanged between the approval ledger,
//! the meta-transaction pipeline, and the on-chain multisig projection,
//! together with the error taxonomy used across the workspace.

pub mod common;
pub mod entities;
pub mod errors;
pub mod meta;
pub mod serde_helpers;
pub mod typed_data;

pub use common::{keccak256, Address, Bytes, TxHash, B256, U256};
pub use entities::{
	Actor, ApprovalStage, ApprovalState, ApproverRole, Decision, OnChainApproval, ReconciledApproval,
	Request, RequestDetails, RequestId, RequestKind, RequestStatus, StageId, StageSpec, StageStatus,
};
pub use errors::{match_known_revert, ApprovalError, Result};
pub use meta::MetaTxRequest;
pub use typed_data::{Eip712Domain, TypeField, TypedData};
