//! Webhook broadcast over HTTP.

use async_trait::async_trait;
use log::warn;

use super::Webhook;
use crate::{
    error::{KeelError, Result},
    models::{Plan, Stage},
};

/// POSTs the plan record as JSON to every configured URL.
///
/// With no URLs there is nobody to notify and the broadcast counts as
/// delivered. A target that errors or answers non-2xx makes the broadcast
/// undelivered; the remaining targets are still attempted.
#[derive(Debug, Clone, Default)]
pub struct HttpWebhook {
    client: reqwest::Client,
    urls: Vec<String>,
}

impl HttpWebhook {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            urls,
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

#[async_trait]
impl Webhook for HttpWebhook {
    async fn broadcast(&self, plan: &Plan) -> Result<bool> {
        let mut delivered = true;
        for url in &self.urls {
            match self.client.post(url).json(plan).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!("webhook {url} rejected plan {}: {}", plan.id, response.status());
                    delivered = false;
                }
                Err(e) if e.is_builder() => {
                    return Err(KeelError::action(
                        Stage::Send,
                        format!("invalid webhook target {url}: {e}"),
                    ));
                }
                Err(e) => {
                    warn!("webhook {url} unreachable for plan {}: {e}", plan.id);
                    delivered = false;
                }
            }
        }
        Ok(delivered)
    }
}
