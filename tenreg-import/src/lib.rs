//! Bulk import pipeline for tenure-rights registration containers
//!
//! Reads a field-collected container file, validates every record,
//! checks the staged set against the live registry for collisions,
//! and commits operator-approved records through the entity
//! repositories, leaving one audit-history row per run.

pub mod commit;
pub mod dedup;
pub mod error;
pub mod models;
pub mod reader;
pub mod repositories;
pub mod service;
pub mod validator;

pub use commit::CommitEngine;
pub use dedup::DuplicateDetector;
pub use error::{ImportError, Result};
pub use models::manifest::ImportManifest;
pub use models::record::{RecordStatus, RecordType, Resolution, StagingRecord};
pub use models::report::{ImportReport, LoadSummary, ValidationSummary};
pub use reader::{ContainerData, ContainerReader, RawRecord, SourceReader, SyntheticReader};
pub use service::ImportService;
