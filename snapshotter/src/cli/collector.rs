use clap::Args;

/// Local collector receiving signed submissions over gRPC.
#[derive(Debug, Clone, Args)]
pub struct CollectorCliArgs {
    #[arg(env = "SNAPSHOTTER_COLLECTOR_HOST", long, default_value = "127.0.0.1")]
    pub collector_host: String,

    #[arg(env = "SNAPSHOTTER_COLLECTOR_PORT", long, default_value = "50051")]
    pub collector_port: u16,

    /// Seconds a pooled stream may stay unused before it is cancelled.
    #[arg(env = "SNAPSHOTTER_COLLECTOR_IDLE_STREAM_TIMEOUT_SECS", long, default_value = "30")]
    pub collector_idle_stream_timeout_secs: u64,

    /// Seconds to wait for the acknowledgement of one submission.
    #[arg(env = "SNAPSHOTTER_COLLECTOR_ACK_TIMEOUT_SECS", long, default_value = "30")]
    pub collector_ack_timeout_secs: u64,

    /// Seconds allowed for cancelling a broken stream.
    #[arg(env = "SNAPSHOTTER_COLLECTOR_CANCEL_TIMEOUT_SECS", long, default_value = "10")]
    pub collector_cancel_timeout_secs: u64,

    /// Seconds allowed for establishing the connection.
    #[arg(env = "SNAPSHOTTER_COLLECTOR_CONNECT_TIMEOUT_SECS", long, default_value = "5")]
    pub collector_connect_timeout_secs: u64,
}
