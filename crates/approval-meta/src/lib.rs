//! Meta-transaction construction for the approval protocol.
//!
//! Builds ABI call data for the multisig's register/approve/reject
//! functions, wraps any call in the forwarder's typed-data envelope, and
//! prepares unsigned requests with a fresh replay-protection nonce and a
//! bounded deadline.

pub mod calldata;
pub mod preparer;
pub mod rpc;
pub mod typed_data;

pub use calldata::{approve_call_data, register_call_data, reject_call_data};
pub use preparer::{NonceSource, Preparer, RpcNonceSource, DEFAULT_DEADLINE_SECS};
pub use rpc::EthCallClient;
pub use typed_data::{forward_request_document, FORWARD_REQUEST_TYPE};
