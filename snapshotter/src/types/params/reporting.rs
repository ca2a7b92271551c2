use std::time::Duration;

use url::Url;

pub use crate::cli::reporting::NotificationMode;
use crate::cli::reporting::ReportingCliArgs;

#[derive(Debug, Clone)]
pub struct ReportingParams {
    pub service_url: Option<Url>,
    pub webhook_url: Option<Url>,
    pub mode: NotificationMode,
    pub timeout: Duration,
}

impl ReportingParams {
    /// Every URL an issue report is POSTed to
    pub fn endpoints(&self) -> Vec<Url> {
        let mut endpoints = Vec::with_capacity(2);
        if let Some(service) = &self.service_url {
            let base = service.as_str().trim_end_matches('/');
            if let Ok(url) = Url::parse(&format!("{}/reportIssue", base)) {
                endpoints.push(url);
            }
        }
        if let Some(webhook) = &self.webhook_url {
            endpoints.push(webhook.clone());
        }
        endpoints
    }
}

impl From<&ReportingCliArgs> for ReportingParams {
    fn from(args: &ReportingCliArgs) -> Self {
        Self {
            service_url: args.reporting_service_url.clone(),
            webhook_url: args.reporting_webhook_url.clone(),
            mode: args.reporting_mode,
            timeout: Duration::from_secs(args.reporting_timeout_secs),
        }
    }
}
