use std::sync::{Arc, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::client::collector::proto::SnapshotSubmission;
use crate::core::client::collector::{CollectorConnector, CollectorError, SubmissionStream};

#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The stream broke; it was torn down and the next submission opens a new one
    #[error("Collector stream failed: {0}")]
    Stream(#[source] CollectorError),

    #[error("Collector refused the submission: {0}")]
    Rejected(#[source] CollectorError),

    /// Local cancellation of the exchange; not counted as missed
    #[error("No acknowledgement within {0:?}")]
    TimedOut(Duration),
}

impl SubmissionError {
    /// Whether this outcome counts as a missed submission.
    ///
    /// Every status the collector sends back counts, including its own cancellations.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, SubmissionError::Stream(_) | SubmissionError::Rejected(_))
    }
}

/// Acknowledgement returned by the collector for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelSettings {
    pub idle_timeout: Duration,
    pub ack_timeout: Duration,
    pub cancel_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            ack_timeout: Duration::from_secs(30),
            cancel_timeout: Duration::from_secs(10),
        }
    }
}

struct PooledStream {
    inner: Box<dyn SubmissionStream>,
    last_active: Instant,
}

/// Logs a submission abandoned mid-flight because the calling future was dropped
struct AbandonGuard<'a> {
    project_id: &'a str,
    epoch_id: u64,
    armed: bool,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            info!(project_id = self.project_id, epoch_id = self.epoch_id, "Submission cancelled by caller, stream discarded");
        }
    }
}

/// Delivers signed submissions to the local collector over one pooled stream.
///
/// Submissions are serialized: the stream lives behind an async mutex and is taken out of it
/// for the duration of one send/acknowledge exchange. It is only put back after a successful
/// exchange, so any failure or cancellation leaves the pool empty and the next call opens a
/// fresh stream. There is no retry inside the channel.
pub struct SubmissionChannel {
    connector: Arc<dyn CollectorConnector>,
    stream: Mutex<Option<PooledStream>>,
    settings: ChannelSettings,
}

impl SubmissionChannel {
    pub fn new(connector: Arc<dyn CollectorConnector>, settings: ChannelSettings) -> Self {
        Self { connector, stream: Mutex::new(None), settings }
    }

    pub async fn has_open_stream(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Sends `message` and waits for exactly one acknowledgement
    pub async fn submit(&self, message: SnapshotSubmission, simulation: bool) -> Result<SubmissionAck, SubmissionError> {
        let (project_id, epoch_id) =
            message.request.as_ref().map(|r| (r.project_id.clone(), r.epoch_id)).unwrap_or_default();

        let mut slot = self.stream.lock().await;
        let mut pooled = match slot.take() {
            Some(pooled) => pooled,
            None => match self.connector.open_stream().await {
                Ok(inner) => PooledStream { inner, last_active: Instant::now() },
                Err(err) => {
                    error!(%project_id, epoch_id, error = %err, "Could not open collector stream");
                    return Err(SubmissionError::Stream(err));
                }
            },
        };

        let mut guard = AbandonGuard { project_id: &project_id, epoch_id, armed: true };
        let exchange = tokio::time::timeout(self.settings.ack_timeout, exchange(pooled.inner.as_mut(), message)).await;
        guard.armed = false;

        match exchange {
            Ok(Ok(ack)) => {
                pooled.last_active = Instant::now();
                *slot = Some(pooled);
                if simulation {
                    info!(%project_id, epoch_id, ack = %ack.message, "Simulation snapshot submitted successfully");
                } else {
                    info!(%project_id, epoch_id, ack = %ack.message, "Snapshot submitted successfully");
                }
                Ok(ack)
            }
            Ok(Err(err)) if err.is_connection_failure() => {
                error!(%project_id, epoch_id, error = %err, "Collector stream failed, reinitializing");
                self.cancel_stream(pooled).await;
                Err(SubmissionError::Stream(err))
            }
            Ok(Err(err)) => {
                error!(%project_id, epoch_id, error = %err, "Submission failed, reinitializing stream");
                self.cancel_stream(pooled).await;
                Err(SubmissionError::Rejected(err))
            }
            Err(_) => {
                warn!(%project_id, epoch_id, timeout = ?self.settings.ack_timeout, "No acknowledgement from collector");
                self.cancel_stream(pooled).await;
                Err(SubmissionError::TimedOut(self.settings.ack_timeout))
            }
        }
    }

    /// Cancels `pooled` within the configured bound; failures are logged and swallowed
    async fn cancel_stream(&self, mut pooled: PooledStream) {
        match tokio::time::timeout(self.settings.cancel_timeout, pooled.inner.cancel()).await {
            Ok(Ok(())) => debug!("Collector stream cancelled"),
            Ok(Err(err)) => warn!(error = %err, "Error while cancelling collector stream"),
            Err(_) => error!(timeout = ?self.settings.cancel_timeout, "Timed out cancelling collector stream"),
        }
    }

    /// Cancels the pooled stream if it has not been used for the idle timeout.
    ///
    /// Skips the check while a submission holds the pool. Returns whether a stream was reaped.
    pub async fn reap_idle_stream(&self) -> bool {
        let pooled = {
            let Ok(mut slot) = self.stream.try_lock() else {
                return false;
            };
            match slot.as_ref() {
                Some(pooled) if pooled.last_active.elapsed() >= self.settings.idle_timeout => slot.take(),
                _ => None,
            }
        };

        match pooled {
            Some(pooled) => {
                info!(idle = ?pooled.last_active.elapsed(), "Cancelling idle collector stream");
                self.cancel_stream(pooled).await;
                true
            }
            None => false,
        }
    }

    /// Cancels the pooled stream, if any
    pub async fn close(&self) {
        let pooled = self.stream.lock().await.take();
        if let Some(pooled) = pooled {
            self.cancel_stream(pooled).await;
        }
    }

    /// Periodically reaps an idle stream until `shutdown` fires or the channel is dropped
    pub fn spawn_idle_watchdog(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let channel: Weak<Self> = Arc::downgrade(self);
        let period = (self.settings.idle_timeout / 2).max(Duration::from_millis(100));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(channel) = channel.upgrade() else { break };
                        channel.reap_idle_stream().await;
                    }
                }
            }
            debug!("Idle stream watchdog stopped");
        })
    }
}

async fn exchange(stream: &mut dyn SubmissionStream, message: SnapshotSubmission) -> Result<SubmissionAck, CollectorError> {
    stream.send_message(message).await?;
    match stream.recv_message().await? {
        Some(response) => Ok(SubmissionAck { message: response.message }),
        None => Err(CollectorError::StreamClosed),
    }
}
