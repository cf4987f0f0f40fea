//! Common types used throughout the approval protocol.

// Re-export commonly used ethereum types
pub use alloy_primitives::{keccak256, Address, Bytes, B256, U256};

/// Transaction hash
pub type TxHash = B256;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;
