use std::time::Duration;

use reqwest::Client;
use tracing::error;

use crate::domain::{
    collect::{CollectArgs, Collector},
    error::Error,
    Result,
};

pub struct HttpCollectorDriven {
    client: Client,
    url: String,
}
impl HttpCollectorDriven {
    pub fn try_new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let url = url.to_string();

        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl Collector for HttpCollectorDriven {
    async fn collect(&self, args: CollectArgs) -> Result<bool> {
        let response = self
            .client
            .post(&self.url)
            .json(&args)
            .send()
            .await
            .map_err(|err| Error::Transport(format!("collector request error: {err}")))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            error!(
                status = status.to_string(),
                "request status code fail to collect"
            );
            return Ok(false);
        }

        Ok(true)
    }
}
