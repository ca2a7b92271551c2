use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codec::Streaming;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use super::proto::submission_client::SubmissionClient;
use super::proto::{SnapshotSubmission, SubmissionResponse};
use super::{CollectorConnector, CollectorError, SubmissionStream};

/// Submissions buffered on the outbound half before `send_message` waits
const OUTBOUND_BUFFER: usize = 16;

type OpenCall = BoxFuture<'static, Result<tonic::Response<Streaming<SubmissionResponse>>, tonic::Status>>;

/// Opens `SubmitSnapshot` streams over one lazily connected HTTP/2 channel
pub struct GrpcCollectorConnector {
    channel: Channel,
    endpoint: String,
}

impl GrpcCollectorConnector {
    /// Does not connect; the first stream triggers the connection.
    pub fn connect_lazy(endpoint: &str, connect_timeout: Duration) -> Result<Self, CollectorError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| CollectorError::InvalidEndpoint { endpoint: endpoint.to_string(), message: e.to_string() })?
            .connect_timeout(connect_timeout)
            .tcp_nodelay(true)
            .connect_lazy();
        Ok(Self { channel, endpoint: endpoint.to_string() })
    }
}

#[async_trait]
impl CollectorConnector for GrpcCollectorConnector {
    async fn open_stream(&self) -> Result<Box<dyn SubmissionStream>, CollectorError> {
        let mut client = SubmissionClient::new(self.channel.clone());

        let (outbound, requests) = mpsc::channel(OUTBOUND_BUFFER);
        // Response headers only arrive once the collector saw the first message, so the call
        // is driven from `recv_message` rather than awaited here. An unreachable collector
        // surfaces there as well.
        let call: OpenCall = Box::pin(async move { client.submit_snapshot(ReceiverStream::new(requests)).await });

        debug!(endpoint = %self.endpoint, "Opened collector stream");
        Ok(Box::new(GrpcSubmissionStream { outbound: Some(outbound), inbound: Inbound::Opening(call) }))
    }
}

enum Inbound {
    Opening(OpenCall),
    Open(Streaming<SubmissionResponse>),
    Closed,
}

struct GrpcSubmissionStream {
    outbound: Option<mpsc::Sender<SnapshotSubmission>>,
    inbound: Inbound,
}

#[async_trait]
impl SubmissionStream for GrpcSubmissionStream {
    async fn send_message(&mut self, message: SnapshotSubmission) -> Result<(), CollectorError> {
        let Some(outbound) = &self.outbound else {
            return Err(CollectorError::StreamClosed);
        };
        outbound.send(message).await.map_err(|_| CollectorError::Transport {
            code: tonic::Code::Unavailable,
            message: "outbound half of the stream is closed".to_string(),
        })
    }

    async fn recv_message(&mut self) -> Result<Option<SubmissionResponse>, CollectorError> {
        loop {
            match &mut self.inbound {
                Inbound::Opening(call) => match call.await {
                    Ok(response) => self.inbound = Inbound::Open(response.into_inner()),
                    Err(status) => {
                        self.inbound = Inbound::Closed;
                        return Err(CollectorError::from_status(status));
                    }
                },
                Inbound::Open(responses) => {
                    return match responses.message().await {
                        Ok(Some(ack)) => Ok(Some(ack)),
                        Ok(None) => {
                            self.inbound = Inbound::Closed;
                            Ok(None)
                        }
                        Err(status) => {
                            self.inbound = Inbound::Closed;
                            Err(CollectorError::from_status(status))
                        }
                    };
                }
                Inbound::Closed => return Err(CollectorError::StreamClosed),
            }
        }
    }

    async fn cancel(&mut self) -> Result<(), CollectorError> {
        // Dropping both halves resets the HTTP/2 stream
        self.outbound = None;
        self.inbound = Inbound::Closed;
        Ok(())
    }
}
