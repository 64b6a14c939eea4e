// ============================================================================
// userstore Library
// ============================================================================

pub mod app;
pub mod core;
pub mod storage;
pub mod store;
pub mod web;

// Re-export main types for convenience
pub use crate::app::{AppConfig, bootstrap, init_tracing, shutdown_signal};
pub use crate::core::{Result, StoreError, User, UserPayload};
pub use crate::storage::JsonSnapshot;
pub use crate::store::UserStore;
