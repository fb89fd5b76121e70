//! Import source readers
//!
//! A source reader turns a container path into a manifest plus a
//! finite, one-pass sequence of staging records. Two implementations
//! exist behind the same contract: [`ContainerReader`] for real
//! container files and [`SyntheticReader`] for generated test data.
//! The orchestrator is constructed over `Arc<dyn SourceReader>` and is
//! indifferent to which is wired in.

pub mod container;
pub mod synthetic;

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::models::manifest::ImportManifest;
use crate::models::payload::Payload;
use crate::models::record::{RecordType, StagingRecord};

pub use container::ContainerReader;
pub use synthetic::SyntheticReader;

/// One raw row as read from the source, before staging
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub record_type: RecordType,

    /// Natural-key id from the source, when it carried one
    pub source_id: Option<String>,

    pub payload: Payload,
}

/// Everything one read of a source yields
#[derive(Debug, Clone)]
pub struct ContainerData {
    pub manifest: ImportManifest,
    pub records: Vec<RawRecord>,
}

impl ContainerData {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// The four-phase source contract: read, validate the manifest,
/// extract, yield.
///
/// Extraction consumes the read data; re-extracting requires another
/// `read_file` call.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Read and parse the import file
    async fn read_file(&self, path: &Path) -> Result<ContainerData>;

    /// Gate a parsed manifest before any record is staged
    fn validate_manifest(&self, manifest: &ImportManifest) -> bool;

    /// Turn read data into staging records, one pass, in source order.
    ///
    /// Records without a source id get a synthesized sequential one.
    fn extract_records(
        &self,
        data: ContainerData,
    ) -> Box<dyn Iterator<Item = StagingRecord> + Send> {
        Box::new(data.records.into_iter().enumerate().map(|(i, raw)| {
            let record_id = raw
                .source_id
                .unwrap_or_else(|| format!("REC-{:04}", i + 1));
            StagingRecord::new(record_id, raw.record_type.as_str().to_string(), raw.payload)
        }))
    }
}
