//! caselink-core library.
//!
//! Links evidence (free-text comments and alert references) to incident
//! cases. Given the alert ids a case already carries and a request to attach
//! one or many items, [`orchestrator::CaseAttachments`] computes the minimal
//! set of records to persist and makes at most one persistence call.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at collaborator and orchestrator seams;
//!   `anyhow::Result` for config and store bootstrap.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod builder;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod store;

pub use builder::WriteContext;
pub use error::{AttachError, ErrorCode, StoreError};
pub use orchestrator::{BulkCreateOutcome, CaseAttachments, CreateOutcome};
