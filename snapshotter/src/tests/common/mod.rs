pub mod constants;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::sol_types::Eip712Domain;
use async_trait::async_trait;
use rstest::fixture;
use snapshotter_resilience::RetryPolicy;
use tonic::Status;

use crate::core::background::BackgroundTasks;
use crate::core::client::chain::{AnchorChainClient, BlockHeader, MockAnchorChainClient};
use crate::core::client::collector::proto::{SnapshotSubmission, SubmissionResponse};
use crate::core::client::collector::{CollectorConnector, CollectorError, SubmissionStream};
use crate::core::client::notification::{NotificationError, NotificationSink};
use crate::core::client::storage::{ArchiveStore, ContentStore};
use crate::types::status::SnapshotterReportData;
use crate::worker::channel::{ChannelSettings, SubmissionChannel};
use crate::worker::commit::CommitPipeline;
use crate::worker::metadata::signing_domain;
use crate::worker::reporter::{FailureReporter, StatusTracker};
use crate::worker::signer::{parse_signing_key, SignatureService};
use crate::worker::uploader::StorageUploader;
use constants::*;

pub fn test_domain() -> Eip712Domain {
    signing_domain(ANCHOR_CHAIN_ID, PROTOCOL_CONTRACT)
}

#[fixture]
pub fn domain() -> Eip712Domain {
    test_domain()
}

#[fixture]
pub fn collector() -> FakeCollector {
    FakeCollector::default()
}

/// Chain client answering `latest_block` with the same block, any number of times
pub fn fixed_block_chain() -> MockAnchorChainClient {
    let mut chain = MockAnchorChainClient::new();
    chain
        .expect_latest_block()
        .returning(|| Ok(BlockHeader { number: ANCHOR_BLOCK_NUMBER, hash: ANCHOR_BLOCK_HASH.to_string() }));
    chain
}

pub fn signature_service(chain: Arc<dyn AnchorChainClient>) -> SignatureService {
    SignatureService::new(
        chain,
        parse_signing_key(IDENTITY_PRIVATE_KEY).expect("identity key must parse"),
        test_domain(),
        DEADLINE_BUFFER,
        SLOT_ID,
    )
}

/// What the fake collector answers to one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ack,
    /// Connection reset by the collector
    Reset,
    /// Collector refuses the submission with `INVALID_ARGUMENT`
    Reject,
    /// Call cancelled on the collector side
    Cancelled,
    /// Collector ends the stream without answering
    Close,
    /// No answer, ever
    Silent,
}

/// Shared state of the fake collector, inspected by tests
#[derive(Default)]
pub struct CollectorState {
    replies: Mutex<VecDeque<Reply>>,
    received: Mutex<Vec<SnapshotSubmission>>,
    pub opened: AtomicUsize,
    pub cancelled: AtomicUsize,
    pub refuse_connections: AtomicBool,
    pub hang_on_cancel: AtomicBool,
}

impl CollectorState {
    pub fn push_replies(&self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.lock().unwrap().extend(replies);
    }

    pub fn received(&self) -> Vec<SnapshotSubmission> {
        self.received.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Reply {
        self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Ack)
    }
}

/// In-memory collector; replies are consumed in order, `Ack` once the script runs out
#[derive(Default, Clone)]
pub struct FakeCollector {
    pub state: Arc<CollectorState>,
}

impl FakeCollector {
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let collector = Self::default();
        collector.state.push_replies(replies);
        collector
    }
}

#[async_trait]
impl CollectorConnector for FakeCollector {
    async fn open_stream(&self) -> Result<Box<dyn SubmissionStream>, CollectorError> {
        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(CollectorError::from_status(Status::unavailable("connection refused")));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream { state: Arc::clone(&self.state), closed: false }))
    }
}

struct FakeStream {
    state: Arc<CollectorState>,
    closed: bool,
}

#[async_trait]
impl SubmissionStream for FakeStream {
    async fn send_message(&mut self, message: SnapshotSubmission) -> Result<(), CollectorError> {
        if self.closed {
            return Err(CollectorError::StreamClosed);
        }
        self.state.received.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv_message(&mut self) -> Result<Option<SubmissionResponse>, CollectorError> {
        match self.state.next_reply() {
            Reply::Ack => Ok(Some(SubmissionResponse { message: "Success".to_string() })),
            Reply::Reset => Err(CollectorError::from_status(Status::unavailable("connection reset by peer"))),
            Reply::Reject => Err(CollectorError::from_status(Status::invalid_argument("invalid signature"))),
            Reply::Cancelled => Err(CollectorError::from_status(Status::cancelled("call cancelled"))),
            Reply::Close => Ok(None),
            Reply::Silent => std::future::pending().await,
        }
    }

    async fn cancel(&mut self) -> Result<(), CollectorError> {
        self.state.cancelled.fetch_add(1, Ordering::SeqCst);
        if self.state.hang_on_cancel.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.closed = true;
        Ok(())
    }
}

/// Notification sink keeping every report it receives
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<SnapshotterReportData>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<SnapshotterReportData> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, report: SnapshotterReportData) -> Result<(), NotificationError> {
        self.reports.lock().unwrap().push(report);
        Ok(())
    }
}

pub fn test_channel_settings() -> ChannelSettings {
    ChannelSettings {
        idle_timeout: Duration::from_secs(30),
        ack_timeout: Duration::from_secs(30),
        cancel_timeout: Duration::from_secs(10),
    }
}

/// A commit pipeline wired to in-memory collaborators
pub struct TestPipeline {
    pub pipeline: CommitPipeline,
    pub channel: Arc<SubmissionChannel>,
    pub collector: Arc<CollectorState>,
    pub sink: Arc<RecordingSink>,
    pub background: BackgroundTasks,
}

impl TestPipeline {
    /// Waits for detached archival tasks
    pub async fn drain_background(&self) {
        assert!(self.background.drain(Duration::from_secs(30)).await, "background tasks must finish");
    }
}

pub struct TestPipelineBuilder {
    chain: Option<Arc<dyn AnchorChainClient>>,
    content_store: Option<Arc<dyn ContentStore>>,
    archive_store: Option<Arc<dyn ArchiveStore>>,
    collector: FakeCollector,
}

impl Default for TestPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPipelineBuilder {
    pub fn new() -> Self {
        Self { chain: None, content_store: None, archive_store: None, collector: FakeCollector::default() }
    }

    pub fn chain(mut self, chain: impl AnchorChainClient + 'static) -> Self {
        self.chain = Some(Arc::new(chain));
        self
    }

    pub fn content_store(mut self, store: impl ContentStore + 'static) -> Self {
        self.content_store = Some(Arc::new(store));
        self
    }

    pub fn archive_store(mut self, store: impl ArchiveStore + 'static) -> Self {
        self.archive_store = Some(Arc::new(store));
        self
    }

    pub fn replies(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.collector.state.push_replies(replies);
        self
    }

    pub fn build(self) -> TestPipeline {
        let chain = self.chain.unwrap_or_else(|| Arc::new(fixed_block_chain()));
        let uploader = Arc::new(StorageUploader::new(
            self.content_store,
            RetryPolicy::default(),
            self.archive_store,
            RetryPolicy::default(),
        ));
        let collector_state = Arc::clone(&self.collector.state);
        let channel = Arc::new(SubmissionChannel::new(Arc::new(self.collector), test_channel_settings()));
        let sink = Arc::new(RecordingSink::default());
        let reporter = FailureReporter::new(INSTANCE_ID.to_string(), Arc::new(StatusTracker::new()), sink.clone());
        let background = BackgroundTasks::new();

        let pipeline = CommitPipeline::new(
            uploader,
            signature_service(chain),
            Arc::clone(&channel),
            reporter,
            background.clone(),
        );

        TestPipeline { pipeline, channel, collector: collector_state, sink, background }
    }
}
