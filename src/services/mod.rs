/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Background status poller.
pub mod poller;
/// Reconciliation of the active target into the external display.
pub mod sync_service;
/// User-triggered target operations.
pub mod target_service;
