//! Session request cache.
//!
//! This module provides:
//! - Deterministic cache keys derived from an endpoint and its parameters
//! - A shared key/payload map with endpoint-scoped invalidation
//! - The approval overlay kept in the same map, applied to every transaction read

mod key;
mod overlay;
mod storage;

pub use key::derive_key;
pub use overlay::ApprovalOverlay;
pub use storage::RequestCache;
