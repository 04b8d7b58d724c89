//! Page-to-worker messages.

use serde::{Deserialize, Serialize};

use swcache_core::Error;

use super::{ActivationReport, ServiceWorker};

/// A message posted by a controlled page, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    SkipWaiting,
    GetVersion,
}

impl ClientMessage {
    /// Parse a message payload; unknown or malformed messages yield `None`.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Reply sent on the message's reply channel for `GET_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct VersionReply {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Skip waiting recorded; carries the activation if it happened now.
    SkipWaiting { activation: Option<ActivationReport> },
    Version(VersionReply),
    Ignored,
}

impl ServiceWorker {
    pub async fn handle_message(&self, payload: &serde_json::Value) -> Result<MessageOutcome, Error> {
        match ClientMessage::parse(payload) {
            Some(ClientMessage::SkipWaiting) => {
                let activation = self.skip_waiting().await?;
                Ok(MessageOutcome::SkipWaiting { activation })
            }
            Some(ClientMessage::GetVersion) => Ok(MessageOutcome::Version(VersionReply {
                version: self.config.buckets.static_bucket.clone(),
            })),
            None => {
                tracing::debug!(%payload, "ignoring unknown message");
                Ok(MessageOutcome::Ignored)
            }
        }
    }
}
