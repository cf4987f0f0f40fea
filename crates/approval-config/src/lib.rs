//! Chain configuration for the approval protocol.
//!
//! Exposes the chain id, RPC endpoint, forwarder and multisig contract
//! addresses consumed once per session to parametrize the meta-transaction
//! pipeline. Loading is fail-closed: a missing required field blocks the
//! entire approval flow with a configuration error instead of proceeding
//! with a partial target set.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{ChainContext, ChainSection, ProtocolSection, RawConfig, TimeoutSection};
