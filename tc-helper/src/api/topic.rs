//! Topic API.

use serde_json::Value;
use std::sync::Arc;

use crate::{
    client::{DiagnosticLogger, HelperClientInner},
    error::Result,
    models::TopicId,
};

/// API for topic lookups.
pub struct TopicApi {
    client: Arc<HelperClientInner>,
}

impl TopicApi {
    pub(crate) fn new(client: Arc<HelperClientInner>) -> Self {
        Self { client }
    }

    /// Read a topic.
    pub async fn get(&self, topic_id: impl Into<TopicId>) -> Result<Value> {
        self.read(topic_id).send().await
    }

    /// Build a topic read, for attaching a diagnostic logger.
    pub fn read(&self, topic_id: impl Into<TopicId>) -> TopicReadBuilder<'static> {
        TopicReadBuilder {
            client: self.client.clone(),
            topic_id: topic_id.into(),
            logger: None,
        }
    }
}

/// Builder for a topic read.
pub struct TopicReadBuilder<'a> {
    client: Arc<HelperClientInner>,
    topic_id: TopicId,
    logger: Option<&'a dyn DiagnosticLogger>,
}

impl<'a> TopicReadBuilder<'a> {
    /// Report a failed read to `logger`, along with the URL that failed.
    pub fn logger<'b>(self, logger: &'b dyn DiagnosticLogger) -> TopicReadBuilder<'b> {
        TopicReadBuilder {
            client: self.client,
            topic_id: self.topic_id,
            logger: Some(logger),
        }
    }

    /// Execute the request; returns `result.content` unchanged.
    pub async fn send(self) -> Result<Value> {
        let url = self.client.api.topic_read_url(self.topic_id.as_str())?;
        let context = format!(
            "Failed to get topic details of topic id: {}",
            self.topic_id
        );

        self.client.get_authed(url, &context, self.logger).await
    }
}
