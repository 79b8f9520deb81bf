//! # milvus-client
//!
//! Client library for the long-running collection operations of a Milvus
//! server: loading collections or partitions into query node memory, and
//! flushing buffered writes before reading statistics.
//!
//! The server performs that work asynchronously and only reports
//! point-in-time progress when asked. This crate turns each operation into a
//! single awaited result with a deterministic timeout and poll cadence.
//!
//! ## Layers
//!
//! - **Transport** ([`transport`]) - request/response seam to the server,
//!   injected into the client. No wire encoding lives here.
//! - **Probes** ([`probe`]) - one per operation, each answering "how far along
//!   is it?" as a [`ProgressReport`].
//! - **Wait engine** ([`progress`]) - polls any probe under a
//!   [`TimeoutPolicy`] until success, hard failure, or timeout.
//! - **Client** ([`client`]) - triggers an operation once, then waits.
//!
//! ## Example
//!
//! ```rust
//! use milvus_client::testing::ScriptedTransport;
//! use milvus_client::transport::{ServerStatus, ShowCollectionsResponse};
//! use milvus_client::{MilvusClient, TimeoutPolicy};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> milvus_client::Result<()> {
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.push_show_collections(Ok(ShowCollectionsResponse {
//!     status: ServerStatus::success(),
//!     collection_names: vec!["docs".to_string()],
//!     inmemory_percentages: vec![100],
//! }));
//!
//! let client = MilvusClient::with_transport(transport);
//! let policy = TimeoutPolicy::from_secs(30).with_poll_interval(Duration::from_millis(200));
//! client.load_collection("docs", Some(&policy)).await?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod probe;
pub mod progress;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

pub use args::WaitArgs;
pub use client::{DEFAULT_REPLICA_NUMBER, MilvusClient};
pub use error::{MilvusError, Result, StatusCode};
pub use policy::{DEFAULT_POLL_INTERVAL, TimeoutPolicy, WaitMode};
pub use probe::{
    FlushStateProbe, LoadCollectionProbe, LoadPartitionsProbe, ProgressProbe, ProgressReport,
};
pub use progress::{ProgressCallback, ProgressEvent, WaitOutcome, wait_for_completion};
pub use transport::{ConnectParam, Connector, MilvusTransport, TransportError};
pub use types::{CollectionStat, PartitionStat};
