use std::{fs, path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::{
    domain::{
        collect::{
            command::{report_verification, ReportVerificationCmd},
            Collector, NoopCollector,
        },
        connection::{ConnectionVerifier, TlsVerification, VerificationResult},
        error::Error,
        token::{Clock, TokenCredential},
        utils::list_files,
    },
    driven::{collector::HttpCollectorDriven, opensearch::OpenSearchAccountDriven},
};

pub const TOKEN_FILE_EXTENSION: &str = ".json";

pub struct VerifyConfig {
    pub host_url: String,
    pub timeout: Duration,
    pub tls: TlsVerification,
    pub collect_mode: bool,
    pub collector_url: Option<String>,
}

/// Picks the collector once, so callers never branch on `collect_mode`.
pub fn collector_from_config(config: &VerifyConfig) -> crate::domain::Result<Arc<dyn Collector>> {
    if !config.collect_mode {
        return Ok(Arc::new(NoopCollector));
    }

    let Some(url) = &config.collector_url else {
        return Err(Error::Config(
            "collector_url is required when collect_mode is enabled".into(),
        ));
    };

    Ok(Arc::new(HttpCollectorDriven::try_new(url, config.timeout)?))
}

pub fn load_token(path: &Path) -> Result<TokenCredential> {
    let content =
        fs::read_to_string(path).with_context(|| format!("fail to read {}", path.display()))?;
    let credential = serde_json::from_str(&content)
        .with_context(|| format!("invalid token file {}", path.display()))?;

    Ok(credential)
}

pub async fn verify(
    config: VerifyConfig,
    clock: &dyn Clock,
    token_path: Option<&Path>,
) -> Result<VerificationResult> {
    let credential = token_path.map(load_token).transpose()?;
    if let Some(credential) = &credential {
        if credential.is_expired_by(clock) {
            bail!(Error::TokenExpired);
        }
    }

    let collector = collector_from_config(&config)?;
    let account = OpenSearchAccountDriven::try_new(config.timeout, config.tls)?;
    let verifier = ConnectionVerifier::new(Arc::new(account));

    let result = verifier.verify(&config.host_url, credential.as_ref()).await;

    let cmd = ReportVerificationCmd::new(config.host_url, result.clone(), clock.now());
    if report_verification(collector, cmd).await.is_err() {
        warn!("verification outcome was not collected");
    }

    Ok(result)
}

pub fn log_outcome(result: &VerificationResult) {
    match result {
        VerificationResult::Authenticated { status } => info!(status, "connection OK"),
        VerificationResult::Rejected { status, .. } => {
            error!(status, "connection failed: credentials rejected")
        }
        VerificationResult::Unreachable { message } => error!(
            error = message.as_str(),
            "connection failed: backend unreachable"
        ),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenFileStatus {
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
}

/// Unreadable token files are logged and skipped.
pub fn inspect_tokens(directory: &Path, clock: &dyn Clock) -> Result<Vec<TokenFileStatus>> {
    let now = clock.now();
    let names = list_files(directory, TOKEN_FILE_EXTENSION)?;
    info!(count = names.len(), "token files found");

    let statuses = names
        .into_iter()
        .filter_map(|name| match load_token(&directory.join(&name)) {
            Ok(credential) => Some(TokenFileStatus {
                expires_at: credential.expires_at(),
                expired: credential.is_expired(now),
                name,
            }),
            Err(err) => {
                error!(error = format!("{err:#}"), file = name, "fail to load token");
                None
            }
        })
        .collect();

    Ok(statuses)
}
