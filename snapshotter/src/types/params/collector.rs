use std::time::Duration;

use crate::cli::collector::CollectorCliArgs;
use crate::SnapshotterError;

#[derive(Debug, Clone)]
pub struct CollectorParams {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub idle_stream_timeout: Duration,
    pub ack_timeout: Duration,
    pub cancel_timeout: Duration,
}

impl CollectorParams {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl TryFrom<&CollectorCliArgs> for CollectorParams {
    type Error = SnapshotterError;

    fn try_from(args: &CollectorCliArgs) -> Result<Self, Self::Error> {
        if args.collector_host.trim().is_empty() {
            return Err(SnapshotterError::ConfigError("Collector host must not be empty".to_string()));
        }
        if args.collector_ack_timeout_secs == 0 {
            return Err(SnapshotterError::ConfigError("Collector ack timeout must be positive".to_string()));
        }
        Ok(Self {
            host: args.collector_host.trim().to_string(),
            port: args.collector_port,
            connect_timeout: Duration::from_secs(args.collector_connect_timeout_secs),
            idle_stream_timeout: Duration::from_secs(args.collector_idle_stream_timeout_secs),
            ack_timeout: Duration::from_secs(args.collector_ack_timeout_secs),
            cancel_timeout: Duration::from_secs(args.collector_cancel_timeout_secs),
        })
    }
}
