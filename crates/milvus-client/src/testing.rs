//! Scripted fakes for exercising the client without a server
//!
//! [`ScriptedTransport`] replays canned responses per operation and records
//! every request it receives. [`ScriptedProbe`] does the same for the wait
//! engine in isolation. Both repeat their last scripted answer once the script
//! runs out, so a single pushed response models a server stuck in one state.
//!
//! # Example
//!
//! ```rust
//! use milvus_client::testing::ScriptedTransport;
//! use milvus_client::transport::{ServerStatus, ShowPartitionsResponse};
//!
//! let transport = ScriptedTransport::new();
//! transport.push_show_partitions(Ok(ShowPartitionsResponse {
//!     status: ServerStatus::success(),
//!     partition_names: vec!["part1".to_string()],
//!     inmemory_percentages: vec![100],
//! }));
//! assert_eq!(transport.show_partitions_calls(), 0);
//! ```

use crate::probe::{ProgressProbe, ProgressReport};
use crate::transport::{
    ConnectParam, Connector, FlushRequest, FlushResponse, GetCollectionStatisticsRequest,
    GetFlushStateRequest, GetFlushStateResponse, GetPartitionStatisticsRequest,
    GetStatisticsResponse, LoadCollectionRequest, LoadPartitionsRequest, MilvusTransport,
    ServerStatus, ShowCollectionsRequest, ShowCollectionsResponse, ShowPartitionsRequest,
    ShowPartitionsResponse, TransportError,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Reply<T> = Result<T, TransportError>;

/// Per-operation response queue plus request log
struct Script<Req, Resp> {
    queued: VecDeque<Reply<Resp>>,
    last: Option<Reply<Resp>>,
    requests: Vec<Req>,
}

impl<Req, Resp: Clone> Script<Req, Resp> {
    fn new() -> Self {
        Self {
            queued: VecDeque::new(),
            last: None,
            requests: Vec::new(),
        }
    }

    fn push(&mut self, reply: Reply<Resp>) {
        self.queued.push_back(reply);
    }

    fn answer(&mut self, request: Req, fallback: impl FnOnce() -> Reply<Resp>) -> Reply<Resp> {
        self.requests.push(request);
        if let Some(reply) = self.queued.pop_front() {
            self.last = Some(reply.clone());
            return reply;
        }
        self.last.clone().unwrap_or_else(fallback)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory transport that replays scripted responses
///
/// Unscripted operations answer as a healthy, idle server would: triggers
/// succeed, show requests list nothing, flush state reports flushed, and
/// statistics are empty.
pub struct ScriptedTransport {
    load_collection: Mutex<Script<LoadCollectionRequest, ServerStatus>>,
    load_partitions: Mutex<Script<LoadPartitionsRequest, ServerStatus>>,
    show_collections: Mutex<Script<ShowCollectionsRequest, ShowCollectionsResponse>>,
    show_partitions: Mutex<Script<ShowPartitionsRequest, ShowPartitionsResponse>>,
    flush: Mutex<Script<FlushRequest, FlushResponse>>,
    flush_state: Mutex<Script<GetFlushStateRequest, GetFlushStateResponse>>,
    collection_stats: Mutex<Script<GetCollectionStatisticsRequest, GetStatisticsResponse>>,
    partition_stats: Mutex<Script<GetPartitionStatisticsRequest, GetStatisticsResponse>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            load_collection: Mutex::new(Script::new()),
            load_partitions: Mutex::new(Script::new()),
            show_collections: Mutex::new(Script::new()),
            show_partitions: Mutex::new(Script::new()),
            flush: Mutex::new(Script::new()),
            flush_state: Mutex::new(Script::new()),
            collection_stats: Mutex::new(Script::new()),
            partition_stats: Mutex::new(Script::new()),
        }
    }

    pub fn push_load_collection(&self, reply: Reply<ServerStatus>) {
        lock(&self.load_collection).push(reply);
    }

    pub fn push_load_partitions(&self, reply: Reply<ServerStatus>) {
        lock(&self.load_partitions).push(reply);
    }

    pub fn push_show_collections(&self, reply: Reply<ShowCollectionsResponse>) {
        lock(&self.show_collections).push(reply);
    }

    pub fn push_show_partitions(&self, reply: Reply<ShowPartitionsResponse>) {
        lock(&self.show_partitions).push(reply);
    }

    pub fn push_flush(&self, reply: Reply<FlushResponse>) {
        lock(&self.flush).push(reply);
    }

    pub fn push_flush_state(&self, reply: Reply<GetFlushStateResponse>) {
        lock(&self.flush_state).push(reply);
    }

    pub fn push_collection_statistics(&self, reply: Reply<GetStatisticsResponse>) {
        lock(&self.collection_stats).push(reply);
    }

    pub fn push_partition_statistics(&self, reply: Reply<GetStatisticsResponse>) {
        lock(&self.partition_stats).push(reply);
    }

    pub fn load_collection_requests(&self) -> Vec<LoadCollectionRequest> {
        lock(&self.load_collection).requests.clone()
    }

    pub fn load_partitions_requests(&self) -> Vec<LoadPartitionsRequest> {
        lock(&self.load_partitions).requests.clone()
    }

    pub fn show_collections_requests(&self) -> Vec<ShowCollectionsRequest> {
        lock(&self.show_collections).requests.clone()
    }

    pub fn show_partitions_requests(&self) -> Vec<ShowPartitionsRequest> {
        lock(&self.show_partitions).requests.clone()
    }

    pub fn flush_requests(&self) -> Vec<FlushRequest> {
        lock(&self.flush).requests.clone()
    }

    pub fn flush_state_requests(&self) -> Vec<GetFlushStateRequest> {
        lock(&self.flush_state).requests.clone()
    }

    pub fn collection_statistics_requests(&self) -> Vec<GetCollectionStatisticsRequest> {
        lock(&self.collection_stats).requests.clone()
    }

    pub fn partition_statistics_requests(&self) -> Vec<GetPartitionStatisticsRequest> {
        lock(&self.partition_stats).requests.clone()
    }

    pub fn show_collections_calls(&self) -> usize {
        lock(&self.show_collections).requests.len()
    }

    pub fn show_partitions_calls(&self) -> usize {
        lock(&self.show_partitions).requests.len()
    }

    pub fn flush_state_calls(&self) -> usize {
        lock(&self.flush_state).requests.len()
    }
}

#[async_trait]
impl MilvusTransport for ScriptedTransport {
    async fn load_collection(
        &self,
        request: LoadCollectionRequest,
    ) -> Result<ServerStatus, TransportError> {
        lock(&self.load_collection).answer(request, || Ok(ServerStatus::success()))
    }

    async fn load_partitions(
        &self,
        request: LoadPartitionsRequest,
    ) -> Result<ServerStatus, TransportError> {
        lock(&self.load_partitions).answer(request, || Ok(ServerStatus::success()))
    }

    async fn show_collections(
        &self,
        request: ShowCollectionsRequest,
    ) -> Result<ShowCollectionsResponse, TransportError> {
        lock(&self.show_collections).answer(request, || Ok(ShowCollectionsResponse::default()))
    }

    async fn show_partitions(
        &self,
        request: ShowPartitionsRequest,
    ) -> Result<ShowPartitionsResponse, TransportError> {
        lock(&self.show_partitions).answer(request, || Ok(ShowPartitionsResponse::default()))
    }

    async fn flush(&self, request: FlushRequest) -> Result<FlushResponse, TransportError> {
        lock(&self.flush).answer(request, || Ok(FlushResponse::default()))
    }

    async fn get_flush_state(
        &self,
        request: GetFlushStateRequest,
    ) -> Result<GetFlushStateResponse, TransportError> {
        lock(&self.flush_state).answer(request, || {
            Ok(GetFlushStateResponse {
                status: ServerStatus::success(),
                flushed: true,
            })
        })
    }

    async fn get_collection_statistics(
        &self,
        request: GetCollectionStatisticsRequest,
    ) -> Result<GetStatisticsResponse, TransportError> {
        lock(&self.collection_stats).answer(request, || Ok(GetStatisticsResponse::default()))
    }

    async fn get_partition_statistics(
        &self,
        request: GetPartitionStatisticsRequest,
    ) -> Result<GetStatisticsResponse, TransportError> {
        lock(&self.partition_stats).answer(request, || Ok(GetStatisticsResponse::default()))
    }
}

/// Connector handing out one shared [`ScriptedTransport`], or a fixed error
pub struct ScriptedConnector {
    transport: Arc<ScriptedTransport>,
    failure: Option<TransportError>,
    connects: Mutex<Vec<ConnectParam>>,
}

impl ScriptedConnector {
    pub fn new(transport: Arc<ScriptedTransport>) -> Self {
        Self {
            transport,
            failure: None,
            connects: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::new()),
            failure: Some(error),
            connects: Mutex::new(Vec::new()),
        }
    }

    /// Addresses passed to `connect`, in order
    pub fn connects(&self) -> Vec<ConnectParam> {
        lock(&self.connects).clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        param: &ConnectParam,
    ) -> Result<Arc<dyn MilvusTransport>, TransportError> {
        lock(&self.connects).push(param.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.transport.clone() as Arc<dyn MilvusTransport>),
        }
    }
}

/// Probe replaying scripted poll results and counting polls
pub struct ScriptedProbe {
    script: Mutex<Script<(), ProgressReport>>,
    latency: Duration,
    polls: AtomicU32,
}

impl ScriptedProbe {
    pub fn new(replies: Vec<Reply<ProgressReport>>) -> Self {
        let mut script = Script::new();
        for reply in replies {
            script.push(reply);
        }
        Self {
            script: Mutex::new(script),
            latency: Duration::ZERO,
            polls: AtomicU32::new(0),
        }
    }

    /// Same answer on every poll
    pub fn repeating(reply: Reply<ProgressReport>) -> Self {
        Self::new(vec![reply])
    }

    /// Make every poll take `latency` before answering
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressProbe for ScriptedProbe {
    fn target(&self) -> String {
        "scripted".to_string()
    }

    async fn poll(&self) -> Result<ProgressReport, TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        lock(&self.script).answer((), || Ok(ProgressReport::pending()))
    }
}
