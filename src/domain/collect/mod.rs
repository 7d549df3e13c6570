use serde_json::{Map, Value};

use super::Result;

pub mod command;

pub type CollectArgs = Map<String, Value>;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self, args: CollectArgs) -> Result<bool>;
}

/// Stand-in used when collection is turned off, always reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCollector;

#[async_trait::async_trait]
impl Collector for NoopCollector {
    async fn collect(&self, _args: CollectArgs) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn it_should_always_succeed_with_noop() {
        let mut args = CollectArgs::new();
        args.insert("host".into(), json!("https://localhost:9200"));

        assert!(NoopCollector.collect(args).await.unwrap());
        assert!(NoopCollector.collect(CollectArgs::new()).await.unwrap());
    }
}
