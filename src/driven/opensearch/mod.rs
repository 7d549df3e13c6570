use std::error::Error as _;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::{
    connection::{AccountDriven, AccountResponse, TlsVerification},
    error::Error,
    Result,
};

pub struct OpenSearchAccountDriven {
    client: Client,
}
impl OpenSearchAccountDriven {
    pub fn try_new(timeout: Duration, tls: TlsVerification) -> Result<Self> {
        let accept_invalid_certs = tls == TlsVerification::DangerAcceptInvalidCerts;
        if accept_invalid_certs {
            warn!("tls certificate verification is disabled");
        }

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl AccountDriven for OpenSearchAccountDriven {
    async fn get(&self, url: &str, authorization: Option<String>) -> Result<AccountResponse> {
        let mut request = self.client.get(url);
        if let Some(authorization) = authorization {
            let value = HeaderValue::from_str(&authorization).map_err(|err| {
                Error::InvalidCredential(format!("token is not a valid header value: {err}"))
            })?;
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        debug!(url, status, "account request finished");

        Ok(AccountResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else {
        "request"
    };

    let mut message = format!("{kind} error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }

    Error::Transport(message)
}
