use clap::{Args, ValueEnum};
use url::Url;

/// How missed snapshot issues are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotificationMode {
    /// The commit waits for the report to be delivered
    Awaited,
    /// The report is sent from a background task
    Detached,
}

/// Issue reporting endpoints.
#[derive(Debug, Clone, Args)]
pub struct ReportingCliArgs {
    /// Reporting service; issues are POSTed to `{url}/reportIssue`.
    #[arg(env = "SNAPSHOTTER_REPORTING_SERVICE_URL", long)]
    pub reporting_service_url: Option<Url>,

    /// Optional Slack compatible webhook receiving the same report.
    #[arg(env = "SNAPSHOTTER_REPORTING_WEBHOOK_URL", long)]
    pub reporting_webhook_url: Option<Url>,

    #[arg(env = "SNAPSHOTTER_REPORTING_MODE", long, value_enum, default_value_t = NotificationMode::Detached)]
    pub reporting_mode: NotificationMode,

    /// Timeout of a single report request, in seconds.
    #[arg(env = "SNAPSHOTTER_REPORTING_TIMEOUT_SECS", long, default_value = "5")]
    pub reporting_timeout_secs: u64,
}
