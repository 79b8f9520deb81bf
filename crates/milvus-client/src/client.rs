//! Client façade for long-running collection operations
//!
//! Each operation sends its trigger request once and then, depending on the
//! caller's [`TimeoutPolicy`], either returns right away or hands a probe to
//! [`wait_for_completion`] and converts the outcome into a [`Result`].
//!
//! | policy                            | behaviour                                    |
//! |-----------------------------------|----------------------------------------------|
//! | `None`                            | trigger only, no progress checks             |
//! | `Some(TimeoutPolicy::instant())`  | trigger, then exactly one progress check     |
//! | `Some(TimeoutPolicy::bounded(d))` | trigger, then poll until done or `d` elapses |

use crate::error::{MilvusError, Result};
use crate::policy::TimeoutPolicy;
use crate::probe::{FlushStateProbe, LoadCollectionProbe, LoadPartitionsProbe};
use crate::progress::{ProgressCallback, WaitOutcome, wait_for_completion};
use crate::transport::{
    ConnectParam, Connector, FlushRequest, GetCollectionStatisticsRequest,
    GetPartitionStatisticsRequest, LoadCollectionRequest, LoadPartitionsRequest,
    MilvusTransport, ServerStatus, TransportError,
};
use crate::types::{CollectionStat, PartitionStat};
use std::sync::Arc;
use tracing::{debug, info};

/// Replica count used when the caller does not choose one
pub const DEFAULT_REPLICA_NUMBER: u32 = 1;

/// Milvus client bound to at most one transport
///
/// # Example
///
/// ```rust,ignore
/// use milvus_client::{ConnectParam, MilvusClient, TimeoutPolicy};
/// use std::time::Duration;
///
/// let mut client = MilvusClient::new();
/// client.connect(&connector, &ConnectParam::new("localhost", 19530)).await?;
///
/// let policy = TimeoutPolicy::from_secs(60).with_poll_interval(Duration::from_secs(1));
/// client.load_collection("docs", Some(&policy)).await?;
///
/// let stat = client.get_collection_statistics("docs", Some(&policy)).await?;
/// println!("{} rows", stat.row_count());
/// ```
#[derive(Default, Clone)]
pub struct MilvusClient {
    transport: Option<Arc<dyn MilvusTransport>>,
    on_progress: Option<ProgressCallback>,
}

impl MilvusClient {
    /// Create a disconnected client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client around an already opened transport
    pub fn with_transport(transport: Arc<dyn MilvusTransport>) -> Self {
        Self {
            transport: Some(transport),
            on_progress: None,
        }
    }

    /// Receive [`crate::ProgressEvent`]s from every wait this client performs
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Open a transport to `param`, replacing any existing one
    pub async fn connect(&mut self, connector: &dyn Connector, param: &ConnectParam) -> Result<()> {
        debug!(uri = %param, "connecting");
        match connector.connect(param).await {
            Ok(transport) => {
                self.transport = Some(transport);
                info!(uri = %param, "connected");
                Ok(())
            }
            Err(TransportError::Unavailable(reason)) => Err(MilvusError::NotConnected(format!(
                "Failed to connect uri: {param}: {reason}"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Drop the transport; later calls fail with [`MilvusError::NotConnected`]
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!("disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    fn transport(&self) -> Result<&dyn MilvusTransport> {
        self.transport
            .as_deref()
            .ok_or_else(|| MilvusError::NotConnected("Connection is not ready!".to_string()))
    }

    /// Load a collection into query node memory
    ///
    /// With a policy, polls the collection's in-memory percentage until it
    /// reaches 100.
    pub async fn load_collection(
        &self,
        collection_name: &str,
        timeout: Option<&TimeoutPolicy>,
    ) -> Result<()> {
        self.load_collection_with_replicas(collection_name, DEFAULT_REPLICA_NUMBER, timeout)
            .await
    }

    pub async fn load_collection_with_replicas(
        &self,
        collection_name: &str,
        replica_number: u32,
        timeout: Option<&TimeoutPolicy>,
    ) -> Result<()> {
        let transport = self.transport()?;
        require_name("collection name", collection_name)?;

        info!(collection = collection_name, replica_number, "loading collection");
        let status = transport
            .load_collection(LoadCollectionRequest {
                collection_name: collection_name.to_string(),
                replica_number,
            })
            .await?;
        check_status(&status)?;

        let Some(policy) = timeout else {
            return Ok(());
        };
        let probe = LoadCollectionProbe::new(transport, collection_name);
        let outcome = wait_for_completion(&probe, policy, self.on_progress.as_ref()).await;
        into_result(outcome, policy)
    }

    /// Load specific partitions of one collection into query node memory
    ///
    /// With a policy, waits until every named partition reports 100%.
    pub async fn load_partitions<I, S>(
        &self,
        collection_name: &str,
        partition_names: I,
        timeout: Option<&TimeoutPolicy>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let transport = self.transport()?;
        require_name("collection name", collection_name)?;
        let partition_names: Vec<String> = partition_names.into_iter().map(Into::into).collect();
        if partition_names.is_empty() {
            return Err(MilvusError::InvalidArgument(
                "at least one partition name is required".to_string(),
            ));
        }
        for name in &partition_names {
            require_name("partition name", name)?;
        }

        info!(
            collection = collection_name,
            partitions = ?partition_names,
            "loading partitions"
        );
        let status = transport
            .load_partitions(LoadPartitionsRequest {
                collection_name: collection_name.to_string(),
                partition_names: partition_names.clone(),
                replica_number: DEFAULT_REPLICA_NUMBER,
            })
            .await?;
        check_status(&status)?;

        let Some(policy) = timeout else {
            return Ok(());
        };
        let probe = LoadPartitionsProbe::new(transport, collection_name, partition_names);
        let outcome = wait_for_completion(&probe, policy, self.on_progress.as_ref()).await;
        into_result(outcome, policy)
    }

    /// Collection statistics, currently the row count
    ///
    /// With a policy, flushes the collection first and waits until every
    /// sealed segment is persisted so the count includes buffered writes.
    pub async fn get_collection_statistics(
        &self,
        collection_name: &str,
        timeout: Option<&TimeoutPolicy>,
    ) -> Result<CollectionStat> {
        let transport = self.transport()?;
        require_name("collection name", collection_name)?;

        if let Some(policy) = timeout {
            self.flush_and_wait(transport, collection_name, policy)
                .await?;
        }

        let response = transport
            .get_collection_statistics(GetCollectionStatisticsRequest {
                collection_name: collection_name.to_string(),
            })
            .await?;
        check_status(&response.status)?;

        Ok(CollectionStat::new(collection_name, response.stats))
    }

    /// Partition statistics, currently the row count
    ///
    /// Same flush-and-wait contract as [`MilvusClient::get_collection_statistics`].
    pub async fn get_partition_statistics(
        &self,
        collection_name: &str,
        partition_name: &str,
        timeout: Option<&TimeoutPolicy>,
    ) -> Result<PartitionStat> {
        let transport = self.transport()?;
        require_name("collection name", collection_name)?;
        require_name("partition name", partition_name)?;

        if let Some(policy) = timeout {
            self.flush_and_wait(transport, collection_name, policy)
                .await?;
        }

        let response = transport
            .get_partition_statistics(GetPartitionStatisticsRequest {
                collection_name: collection_name.to_string(),
                partition_name: partition_name.to_string(),
            })
            .await?;
        check_status(&response.status)?;

        Ok(PartitionStat::new(partition_name, response.stats))
    }

    async fn flush_and_wait(
        &self,
        transport: &dyn MilvusTransport,
        collection_name: &str,
        policy: &TimeoutPolicy,
    ) -> Result<()> {
        info!(collection = collection_name, "flushing collection");
        let response = transport
            .flush(FlushRequest {
                collection_names: vec![collection_name.to_string()],
            })
            .await?;
        check_status(&response.status)?;

        let segment_ids = response
            .coll_seg_ids
            .get(collection_name)
            .cloned()
            .unwrap_or_default();

        let probe = FlushStateProbe::new(transport, collection_name, segment_ids);
        let outcome = wait_for_completion(&probe, policy, self.on_progress.as_ref()).await;
        into_result(outcome, policy)
    }
}

fn require_name(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MilvusError::InvalidArgument(format!("{what} is empty")));
    }
    Ok(())
}

fn check_status(status: &ServerStatus) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(MilvusError::ServerFailed(status.describe()))
    }
}

fn into_result(outcome: WaitOutcome, policy: &TimeoutPolicy) -> Result<()> {
    match outcome {
        WaitOutcome::Succeeded => Ok(()),
        WaitOutcome::HardFailed(reason) => Err(MilvusError::ServerFailed(reason)),
        WaitOutcome::TimedOut => Err(MilvusError::Timeout(policy.budget())),
        WaitOutcome::CommunicationFailed(err) => Err(MilvusError::Communication(err)),
    }
}
