use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use rstest::rstest;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::Code;

use crate::core::client::collector::proto::{Request, SnapshotSubmission};
use crate::core::client::collector::CollectorError;
use crate::tests::common::constants::PROJECT_ID;
use crate::tests::common::{collector, test_channel_settings, FakeCollector, Reply};
use crate::worker::channel::{SubmissionChannel, SubmissionError};

fn submission(epoch_id: u64) -> SnapshotSubmission {
    SnapshotSubmission {
        request: Some(Request {
            slot_id: 1,
            deadline: 100,
            snapshot_cid: "bafkreicid".into(),
            epoch_id,
            project_id: PROJECT_ID.into(),
        }),
        signature: "ab".repeat(65),
        header: "0xblock".into(),
    }
}

fn channel(collector: &FakeCollector) -> Arc<SubmissionChannel> {
    Arc::new(SubmissionChannel::new(Arc::new(collector.clone()), test_channel_settings()))
}

#[rstest]
#[tokio::test]
async fn test_acknowledged_submissions_reuse_one_stream(collector: FakeCollector) {
    let channel = channel(&collector);

    let first = channel.submit(submission(1), false).await.unwrap();
    let second = channel.submit(submission(2), false).await.unwrap();

    assert_eq!(first.message, "Success");
    assert_eq!(second.message, "Success");
    assert_eq!(collector.state.opened(), 1);
    assert_eq!(collector.state.received().len(), 2);
    assert!(channel.has_open_stream().await);
}

#[rstest]
#[tokio::test]
async fn test_connection_reset_cancels_and_reinitializes_stream() {
    let collector = FakeCollector::with_replies([Reply::Reset, Reply::Ack]);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();
    assert_matches!(err, SubmissionError::Stream(CollectorError::Transport { .. }));
    assert!(err.is_delivery_failure());
    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);

    channel.submit(submission(2), false).await.unwrap();
    assert_eq!(collector.state.opened(), 2);
}

#[rstest]
#[tokio::test]
async fn test_stream_closed_without_ack_is_a_stream_failure() {
    let collector = FakeCollector::with_replies([Reply::Close]);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::Stream(CollectorError::StreamClosed));
    assert_eq!(collector.state.cancelled(), 1);
}

#[rstest]
#[tokio::test]
async fn test_rejection_is_reported_without_retry() {
    let collector = FakeCollector::with_replies([Reply::Reject]);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::Rejected(CollectorError::Rejected { .. }));
    assert!(err.is_delivery_failure());
    assert_eq!(collector.state.received().len(), 1);
    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);
}

#[rstest]
#[tokio::test]
async fn test_collector_cancellation_is_a_delivery_failure() {
    let collector = FakeCollector::with_replies([Reply::Cancelled]);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::Stream(CollectorError::Transport { code: Code::Cancelled, .. }));
    assert!(err.is_delivery_failure());
    assert_eq!(collector.state.cancelled(), 1);

    // Next submission reinitializes the stream
    channel.submit(submission(2), false).await.unwrap();
    assert_eq!(collector.state.opened(), 2);
}

#[rstest]
#[tokio::test]
async fn test_open_failure_is_a_stream_failure(collector: FakeCollector) {
    collector.state.refuse_connections.store(true, Ordering::SeqCst);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::Stream(CollectorError::Transport { .. }));
    assert_eq!(collector.state.opened(), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_missing_ack_times_out_and_discards_stream() {
    let collector = FakeCollector::with_replies([Reply::Silent]);
    let channel = channel(&collector);

    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::TimedOut(timeout) if timeout == test_channel_settings().ack_timeout);
    assert!(!err.is_delivery_failure());
    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_hanging_cancel_is_bounded() {
    let collector = FakeCollector::with_replies([Reply::Reset]);
    collector.state.hang_on_cancel.store(true, Ordering::SeqCst);
    let channel = channel(&collector);

    let started = Instant::now();
    let err = channel.submit(submission(1), false).await.unwrap_err();

    assert_matches!(err, SubmissionError::Stream(_));
    let elapsed = started.elapsed();
    assert!(elapsed >= test_channel_settings().cancel_timeout);
    assert!(elapsed < test_channel_settings().ack_timeout);
    assert_eq!(collector.state.cancelled(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_caller_cancellation_leaves_channel_reusable() {
    let collector = FakeCollector::with_replies([Reply::Silent]);
    let channel = channel(&collector);

    let abandoned = tokio::time::timeout(Duration::from_secs(1), channel.submit(submission(1), false)).await;
    assert!(abandoned.is_err());
    assert!(!channel.has_open_stream().await);

    channel.submit(submission(2), false).await.unwrap();
    assert_eq!(collector.state.opened(), 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_idle_stream_is_reaped(collector: FakeCollector) {
    let channel = channel(&collector);
    channel.submit(submission(1), false).await.unwrap();

    assert!(!channel.reap_idle_stream().await);
    tokio::time::advance(test_channel_settings().idle_timeout).await;
    assert!(channel.reap_idle_stream().await);

    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_watchdog_reaps_idle_stream_and_stops_on_shutdown(collector: FakeCollector) {
    let channel = channel(&collector);
    channel.submit(submission(1), false).await.unwrap();

    let shutdown = CancellationToken::new();
    let watchdog = channel.spawn_idle_watchdog(shutdown.clone());
    tokio::time::sleep(test_channel_settings().idle_timeout * 2).await;

    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);

    shutdown.cancel();
    watchdog.await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_close_cancels_pooled_stream(collector: FakeCollector) {
    let channel = channel(&collector);
    channel.submit(submission(1), false).await.unwrap();

    channel.close().await;

    assert_eq!(collector.state.cancelled(), 1);
    assert!(!channel.has_open_stream().await);
}
