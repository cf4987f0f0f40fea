//! Flow orchestration for the gasless approval protocol.
//!
//! Ties the other crates together: content-derived on-chain registration,
//! the prepare/sign/relay cycle behind every decision, and the reconciled
//! timeline that merges ledger stages with on-chain approval state.

pub mod chain;
pub mod flow;
pub mod hash;

pub use chain::{ApprovalStateReader, RpcApprovalStateReader};
pub use flow::{ApprovalFlow, RequestTimeline};
pub use hash::request_content_hash;
