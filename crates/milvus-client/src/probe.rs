//! Progress probes for asynchronous server operations
//!
//! A probe answers one question: how far along is an operation that has
//! already been triggered? Each long-running operation gets its own probe;
//! the wait engine in [`crate::progress`] drives any of them through the
//! [`ProgressProbe`] trait.

use crate::transport::{
    GetFlushStateRequest, MilvusTransport, ShowCollectionsRequest, ShowPartitionsRequest,
    ShowType, TransportError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Point-in-time progress of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressReport {
    /// Completion percentage (0-100) per node, shard, or named entity
    pub per_target_percent: Vec<u32>,
    /// Terminal server-side failure; never resolves by waiting
    pub hard_failure: Option<String>,
}

impl ProgressReport {
    /// Nothing visible yet
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn with_percentages(per_target_percent: Vec<u32>) -> Self {
        Self {
            per_target_percent,
            hard_failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            per_target_percent: Vec::new(),
            hard_failure: Some(reason.into()),
        }
    }

    /// Complete only when at least one target is listed and every target is exactly 100
    pub fn is_complete(&self) -> bool {
        !self.per_target_percent.is_empty() && self.per_target_percent.iter().all(|p| *p == 100)
    }

    /// Least-progressed target, 0 when nothing is listed
    pub fn min_percent(&self) -> u32 {
        self.per_target_percent
            .iter()
            .copied()
            .min()
            .unwrap_or(0)
            .min(100)
    }
}

/// Reports current progress of an already-triggered operation
///
/// `poll` must be idempotent: it observes, it never restarts work.
#[async_trait]
pub trait ProgressProbe: Send + Sync {
    /// Short label for logs and progress events, e.g. `load collection 'docs'`
    fn target(&self) -> String;

    async fn poll(&self) -> Result<ProgressReport, TransportError>;
}

/// Pick the percentages of `wanted` out of parallel name/percentage arrays
///
/// Returns an empty list unless every wanted name is present.
fn percentages_for(wanted: &[String], names: &[String], percentages: &[u32]) -> Vec<u32> {
    let listed: HashMap<&str, u32> = names
        .iter()
        .map(String::as_str)
        .zip(percentages.iter().copied())
        .collect();

    let mut found = Vec::with_capacity(wanted.len());
    for name in wanted {
        match listed.get(name.as_str()) {
            Some(percent) => found.push(*percent),
            None => {
                debug!(target_name = %name, "target not listed yet");
                return Vec::new();
            }
        }
    }
    found
}

/// Loading state of a whole collection
pub struct LoadCollectionProbe<'a> {
    transport: &'a dyn MilvusTransport,
    collection_name: String,
}

impl<'a> LoadCollectionProbe<'a> {
    pub fn new(transport: &'a dyn MilvusTransport, collection_name: impl Into<String>) -> Self {
        Self {
            transport,
            collection_name: collection_name.into(),
        }
    }
}

#[async_trait]
impl ProgressProbe for LoadCollectionProbe<'_> {
    fn target(&self) -> String {
        format!("load collection '{}'", self.collection_name)
    }

    async fn poll(&self) -> Result<ProgressReport, TransportError> {
        let response = self
            .transport
            .show_collections(ShowCollectionsRequest {
                collection_names: vec![self.collection_name.clone()],
                show_type: ShowType::InMemory,
            })
            .await?;

        if !response.status.is_success() {
            return Ok(ProgressReport::failed(response.status.describe()));
        }

        Ok(ProgressReport::with_percentages(percentages_for(
            std::slice::from_ref(&self.collection_name),
            &response.collection_names,
            &response.inmemory_percentages,
        )))
    }
}

/// Loading state of a set of partitions within one collection
pub struct LoadPartitionsProbe<'a> {
    transport: &'a dyn MilvusTransport,
    collection_name: String,
    partition_names: Vec<String>,
}

impl<'a> LoadPartitionsProbe<'a> {
    pub fn new(
        transport: &'a dyn MilvusTransport,
        collection_name: impl Into<String>,
        partition_names: Vec<String>,
    ) -> Self {
        Self {
            transport,
            collection_name: collection_name.into(),
            partition_names,
        }
    }
}

#[async_trait]
impl ProgressProbe for LoadPartitionsProbe<'_> {
    fn target(&self) -> String {
        format!(
            "load partitions [{}] of '{}'",
            self.partition_names.join(", "),
            self.collection_name
        )
    }

    async fn poll(&self) -> Result<ProgressReport, TransportError> {
        let response = self
            .transport
            .show_partitions(ShowPartitionsRequest {
                collection_name: self.collection_name.clone(),
                partition_names: self.partition_names.clone(),
                show_type: ShowType::InMemory,
            })
            .await?;

        if !response.status.is_success() {
            return Ok(ProgressReport::failed(response.status.describe()));
        }

        Ok(ProgressReport::with_percentages(percentages_for(
            &self.partition_names,
            &response.partition_names,
            &response.inmemory_percentages,
        )))
    }
}

/// Persistence state of the segments sealed by a flush
///
/// The server only says flushed or not, so the report is a single 0 or 100.
pub struct FlushStateProbe<'a> {
    transport: &'a dyn MilvusTransport,
    collection_name: String,
    segment_ids: Vec<i64>,
}

impl<'a> FlushStateProbe<'a> {
    pub fn new(
        transport: &'a dyn MilvusTransport,
        collection_name: impl Into<String>,
        segment_ids: Vec<i64>,
    ) -> Self {
        Self {
            transport,
            collection_name: collection_name.into(),
            segment_ids,
        }
    }
}

#[async_trait]
impl ProgressProbe for FlushStateProbe<'_> {
    fn target(&self) -> String {
        format!(
            "flush {} segment(s) of '{}'",
            self.segment_ids.len(),
            self.collection_name
        )
    }

    async fn poll(&self) -> Result<ProgressReport, TransportError> {
        let response = self
            .transport
            .get_flush_state(GetFlushStateRequest {
                segment_ids: self.segment_ids.clone(),
            })
            .await?;

        if !response.status.is_success() {
            return Ok(ProgressReport::failed(response.status.describe()));
        }

        let percent = if response.flushed { 100 } else { 0 };
        Ok(ProgressReport::with_percentages(vec![percent]))
    }
}
