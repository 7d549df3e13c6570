use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::domain::{connection::VerificationResult, Result};

use super::{CollectArgs, Collector};

pub async fn report_verification(
    collector: Arc<dyn Collector>,
    cmd: ReportVerificationCmd,
) -> Result<bool> {
    let mut args = CollectArgs::new();
    args.insert("host_url".into(), json!(cmd.host_url));
    args.insert("outcome".into(), json!(cmd.result.kind()));
    args.insert("status".into(), json!(cmd.result.status()));
    args.insert("checked_at".into(), json!(cmd.checked_at.to_rfc3339()));

    let collected = collector.collect(args).await;
    match &collected {
        Ok(true) => info!(host_url = cmd.host_url, "verification collected"),
        Ok(false) => error!(host_url = cmd.host_url, "collector refused verification"),
        Err(err) => error!(
            host_url = cmd.host_url,
            error = err.to_string(),
            "fail to collect verification"
        ),
    }

    collected
}

#[derive(Debug, Clone)]
pub struct ReportVerificationCmd {
    pub host_url: String,
    pub result: VerificationResult,
    pub checked_at: DateTime<Utc>,
}
impl ReportVerificationCmd {
    pub fn new(host_url: String, result: VerificationResult, checked_at: DateTime<Utc>) -> Self {
        Self {
            host_url,
            result,
            checked_at,
        }
    }
}
