//! Transport seam between the client and a Milvus server
//!
//! The client never speaks a wire protocol itself. It drives a
//! [`MilvusTransport`], which forwards typed requests to the server and hands
//! back typed responses. Tests substitute the scripted transport from
//! `milvus_client::testing` (behind the `testing` feature).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Default Milvus server port
pub const DEFAULT_PORT: u16 = 19530;

/// Server-side result code attached to every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCode {
    #[default]
    Success,
    UnexpectedError,
    OutOfMemory,
    CollectionNotExists,
    IllegalArgument,
}

/// Status block carried by every server response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerStatus {
    pub error_code: ErrorCode,
    pub reason: String,
}

impl ServerStatus {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn error(error_code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            error_code,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == ErrorCode::Success
    }

    /// Human readable failure description, falling back to the code when the server sent no reason
    pub fn describe(&self) -> String {
        if self.reason.is_empty() {
            format!("server returned {:?}", self.error_code)
        } else {
            format!("{:?}: {}", self.error_code, self.reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCollectionRequest {
    pub collection_name: String,
    pub replica_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPartitionsRequest {
    pub collection_name: String,
    pub partition_names: Vec<String>,
    pub replica_number: u32,
}

/// Which view of the catalog a show request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowType {
    #[default]
    All,
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCollectionsRequest {
    pub collection_names: Vec<String>,
    pub show_type: ShowType,
}

/// Parallel arrays, one entry per listed collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShowCollectionsResponse {
    pub status: ServerStatus,
    pub collection_names: Vec<String>,
    pub inmemory_percentages: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowPartitionsRequest {
    pub collection_name: String,
    pub partition_names: Vec<String>,
    pub show_type: ShowType,
}

/// Parallel arrays, one entry per listed partition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShowPartitionsResponse {
    pub status: ServerStatus,
    pub partition_names: Vec<String>,
    pub inmemory_percentages: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushRequest {
    pub collection_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlushResponse {
    pub status: ServerStatus,
    /// Segment ids sealed by the flush, keyed by collection name
    pub coll_seg_ids: HashMap<String, Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFlushStateRequest {
    pub segment_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetFlushStateResponse {
    pub status: ServerStatus,
    pub flushed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCollectionStatisticsRequest {
    pub collection_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPartitionStatisticsRequest {
    pub collection_name: String,
    pub partition_name: String,
}

/// Statistics come back as a flat key/value list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetStatisticsResponse {
    pub status: ServerStatus,
    pub stats: Vec<(String, String)>,
}

/// Failure to exchange a request with the server at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The channel could not be established or is gone
    #[error("server unavailable: {0}")]
    Unavailable(String),

    /// The call was sent but failed in flight
    #[error("rpc failed: {0}")]
    Rpc(String),
}

/// Request/response operations the client consumes
///
/// Implementations must be safe to call repeatedly; the status queries
/// (`show_*`, `get_flush_state`) are purely observational.
#[async_trait]
pub trait MilvusTransport: Send + Sync {
    async fn load_collection(
        &self,
        request: LoadCollectionRequest,
    ) -> Result<ServerStatus, TransportError>;

    async fn load_partitions(
        &self,
        request: LoadPartitionsRequest,
    ) -> Result<ServerStatus, TransportError>;

    async fn show_collections(
        &self,
        request: ShowCollectionsRequest,
    ) -> Result<ShowCollectionsResponse, TransportError>;

    async fn show_partitions(
        &self,
        request: ShowPartitionsRequest,
    ) -> Result<ShowPartitionsResponse, TransportError>;

    async fn flush(&self, request: FlushRequest) -> Result<FlushResponse, TransportError>;

    async fn get_flush_state(
        &self,
        request: GetFlushStateRequest,
    ) -> Result<GetFlushStateResponse, TransportError>;

    async fn get_collection_statistics(
        &self,
        request: GetCollectionStatisticsRequest,
    ) -> Result<GetStatisticsResponse, TransportError>;

    async fn get_partition_statistics(
        &self,
        request: GetPartitionStatisticsRequest,
    ) -> Result<GetStatisticsResponse, TransportError>;
}

/// Server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParam {
    pub host: String,
    pub port: u16,
}

impl ConnectParam {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` form understood by channel builders
    pub fn uri(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectParam {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

impl fmt::Display for ConnectParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Opens transports for a server address
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        param: &ConnectParam,
    ) -> Result<Arc<dyn MilvusTransport>, TransportError>;
}
