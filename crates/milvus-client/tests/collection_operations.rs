//! Load-collection and flush-then-stat flows against a scripted server

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use milvus_client::testing::ScriptedTransport;
use milvus_client::transport::{
    ErrorCode, FlushResponse, GetFlushStateResponse, GetStatisticsResponse, ServerStatus,
    ShowCollectionsResponse, TransportError,
};
use milvus_client::{MilvusClient, MilvusError, ProgressEvent, StatusCode, TimeoutPolicy};
use tokio::time::Instant;

fn collection_at(name: &str, percent: u32) -> ShowCollectionsResponse {
    ShowCollectionsResponse {
        status: ServerStatus::success(),
        collection_names: vec![name.to_string()],
        inmemory_percentages: vec![percent],
    }
}

fn flush_state(flushed: bool) -> GetFlushStateResponse {
    GetFlushStateResponse {
        status: ServerStatus::success(),
        flushed,
    }
}

fn row_count(rows: u64) -> GetStatisticsResponse {
    GetStatisticsResponse {
        status: ServerStatus::success(),
        stats: vec![("row_count".to_string(), rows.to_string())],
    }
}

fn policy(timeout_ms: u64, interval_ms: u64) -> TimeoutPolicy {
    TimeoutPolicy::bounded(Duration::from_millis(timeout_ms))
        .with_poll_interval(Duration::from_millis(interval_ms))
}

// ============================================================================
// Load collection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn load_collection_succeeds_after_progress_reaches_100() {
    let transport = Arc::new(ScriptedTransport::new());
    for percent in [0, 40, 80, 100] {
        transport.push_show_collections(Ok(collection_at("docs", percent)));
    }
    let client = MilvusClient::with_transport(transport.clone());
    let start = Instant::now();

    client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap();

    assert_eq!(transport.show_collections_calls(), 4);
    assert_eq!(start.elapsed(), Duration::from_millis(300));
    assert_eq!(transport.load_collection_requests()[0].replica_number, 1);
}

#[tokio::test(start_paused = true)]
async fn load_collection_not_yet_visible_then_loaded() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_show_collections(Ok(ShowCollectionsResponse::default()));
    transport.push_show_collections(Ok(collection_at("docs", 100)));
    let client = MilvusClient::with_transport(transport.clone());

    client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap();

    assert_eq!(transport.show_collections_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn load_collection_times_out_when_stuck() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_show_collections(Ok(collection_at("docs", 50)));
    let client = MilvusClient::with_transport(transport.clone());
    let start = Instant::now();

    let err = client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap_err();

    assert!(matches!(err, MilvusError::Timeout(d) if d == Duration::from_millis(1000)));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1100));
    assert_eq!(transport.show_collections_calls(), 10);
}

#[tokio::test(start_paused = true)]
async fn load_collection_out_of_memory_fails_fast() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_show_collections(Ok(ShowCollectionsResponse {
        status: ServerStatus::error(ErrorCode::OutOfMemory, "oom"),
        collection_names: vec!["docs".to_string()],
        inmemory_percentages: vec![10],
    }));
    let client = MilvusClient::with_transport(transport.clone());
    let start = Instant::now();

    let err = client
        .load_collection("docs", Some(&TimeoutPolicy::from_secs(10)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), StatusCode::ServerFailed);
    assert!(err.to_string().contains("OutOfMemory"));
    assert_eq!(transport.show_collections_calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn load_collection_poll_unreachable_is_communication_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_show_collections(Ok(collection_at("docs", 20)));
    transport.push_show_collections(Err(TransportError::Unavailable(
        "connection reset".to_string(),
    )));
    let client = MilvusClient::with_transport(transport.clone());

    let err = client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap_err();

    assert!(matches!(err, MilvusError::Communication(_)));
    assert_eq!(err.code(), StatusCode::NotConnected);
    assert_eq!(transport.show_collections_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn load_collection_trigger_unreachable() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_load_collection(Err(TransportError::Rpc("deadline exceeded".to_string())));
    let client = MilvusClient::with_transport(transport.clone());

    let err = client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), StatusCode::ServerFailed);
    assert_eq!(transport.show_collections_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn load_collection_reports_progress_events() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_show_collections(Ok(collection_at("docs", 60)));
    transport.push_show_collections(Ok(collection_at("docs", 100)));

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let client = MilvusClient::with_transport(transport.clone())
        .with_progress(Arc::new(move |event: ProgressEvent| {
            sink.lock().unwrap().push(event)
        }));

    client
        .load_collection("docs", Some(&policy(1000, 100)))
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        events[0],
        ProgressEvent::Started {
            target: "load collection 'docs'".to_string()
        }
    );
    assert!(matches!(events[1], ProgressEvent::Polling { percent: 60, .. }));
    assert!(matches!(events[2], ProgressEvent::Completed { attempts: 2, .. }));
}

// ============================================================================
// Statistics with flush
// ============================================================================

#[tokio::test(start_paused = true)]
async fn collection_statistics_without_policy_skips_flush() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_collection_statistics(Ok(row_count(42)));
    let client = MilvusClient::with_transport(transport.clone());

    let stat = client
        .get_collection_statistics("docs", None)
        .await
        .unwrap();

    assert_eq!(stat.name, "docs");
    assert_eq!(stat.row_count(), 42);
    assert!(transport.flush_requests().is_empty());
    assert_eq!(transport.flush_state_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn collection_statistics_flushes_and_waits() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_flush(Ok(FlushResponse {
        status: ServerStatus::success(),
        coll_seg_ids: HashMap::from([("docs".to_string(), vec![7, 8])]),
    }));
    transport.push_flush_state(Ok(flush_state(false)));
    transport.push_flush_state(Ok(flush_state(false)));
    transport.push_flush_state(Ok(flush_state(true)));
    transport.push_collection_statistics(Ok(row_count(1000)));
    let client = MilvusClient::with_transport(transport.clone());

    let stat = client
        .get_collection_statistics("docs", Some(&policy(1000, 100)))
        .await
        .unwrap();

    assert_eq!(stat.row_count(), 1000);
    assert_eq!(transport.flush_requests()[0].collection_names, vec!["docs"]);
    assert_eq!(transport.flush_state_calls(), 3);
    assert_eq!(transport.flush_state_requests()[0].segment_ids, vec![7, 8]);
    assert_eq!(transport.collection_statistics_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn collection_statistics_flush_timeout_skips_stats() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_flush_state(Ok(flush_state(false)));
    let client = MilvusClient::with_transport(transport.clone());

    let err = client
        .get_collection_statistics("docs", Some(&policy(500, 100)))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(transport.flush_state_calls(), 5);
    assert!(transport.collection_statistics_requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn collection_statistics_flush_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_flush(Ok(FlushResponse {
        status: ServerStatus::error(ErrorCode::CollectionNotExists, "no such collection"),
        coll_seg_ids: HashMap::new(),
    }));
    let client = MilvusClient::with_transport(transport.clone());

    let err = client
        .get_collection_statistics("docs", Some(&policy(500, 100)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), StatusCode::ServerFailed);
    assert_eq!(transport.flush_state_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn collection_statistics_flush_state_error_is_server_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_flush_state(Ok(GetFlushStateResponse {
        status: ServerStatus::error(ErrorCode::UnexpectedError, "datanode crashed"),
        flushed: false,
    }));
    let client = MilvusClient::with_transport(transport.clone());

    let err = client
        .get_collection_statistics("docs", Some(&policy(500, 100)))
        .await
        .unwrap_err();

    assert!(err.is_server_failed());
    assert_eq!(transport.flush_state_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn partition_statistics_flushes_owning_collection() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_partition_statistics(Ok(row_count(12)));
    let client = MilvusClient::with_transport(transport.clone());

    let stat = client
        .get_partition_statistics("docs", "2024", Some(&TimeoutPolicy::instant()))
        .await
        .unwrap();

    assert_eq!(stat.name, "2024");
    assert_eq!(stat.row_count(), 12);
    assert_eq!(transport.flush_requests()[0].collection_names, vec!["docs"]);
    assert_eq!(transport.flush_state_calls(), 1);

    let request = &transport.partition_statistics_requests()[0];
    assert_eq!(request.collection_name, "docs");
    assert_eq!(request.partition_name, "2024");
}
