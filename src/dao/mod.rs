/// Atomic JSON document persistence.
pub mod document;
/// Persisted document definitions.
pub mod models;
/// Durable registry of tracked targets.
pub mod registry;
/// Durable display/session state.
pub mod session;
/// Storage error types.
pub mod storage;
