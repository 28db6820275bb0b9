//! Outbound delivery transports.
//!
//! The engine resolves a claimed delivery into an [`EventEnvelope`] plus a
//! [`SubscriberSpec`] and hands both to a [`Dispatcher`]. The dispatcher
//! reports an [`Outcome`]; classification into retryable vs. terminal
//! failures happens here, not in the engine.

pub mod analytics;
pub mod webhook;

use async_trait::async_trait;
use relay_core::scope::EventScope;
use relay_core::types::{DbId, Timestamp};
use relay_db::models::{Subscriber, SubscriberKind};
use serde::Serialize;

pub use analytics::{AnalyticsRecord, AnalyticsSink};
pub use webhook::WebhookTransport;

/// The wire form of a delivered event.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event_id: DbId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: Timestamp,
    pub scope: EventScope,
    pub payload: serde_json::Value,
}

/// How to reach one subscriber, resolved from its row at dispatch time.
#[derive(Debug, Clone)]
pub enum SubscriberSpec {
    Webhook {
        url: String,
        secret: String,
        verify_tls: bool,
    },
    Analytics {
        sink: String,
    },
}

impl SubscriberSpec {
    /// Resolve a subscriber row into a dispatchable spec.
    ///
    /// A row whose kind-specific columns are missing cannot ever be
    /// dispatched, so the error string is a permanent-failure reason.
    pub fn from_row(subscriber: &Subscriber) -> Result<Self, String> {
        let kind = SubscriberKind::parse(&subscriber.kind).map_err(|e| e.to_string())?;
        match kind {
            SubscriberKind::Webhook => {
                let url = subscriber
                    .url
                    .clone()
                    .ok_or("webhook subscriber has no URL")?;
                let secret = subscriber
                    .secret
                    .clone()
                    .ok_or("webhook subscriber has no secret")?;
                Ok(Self::Webhook {
                    url,
                    secret,
                    verify_tls: subscriber.verify_tls,
                })
            }
            SubscriberKind::Analytics => {
                let sink = subscriber
                    .sink
                    .clone()
                    .ok_or("analytics subscriber has no sink")?;
                Ok(Self::Analytics { sink })
            }
        }
    }
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The subscriber acknowledged the event.
    Success { status_code: Option<i64> },
    /// The attempt failed but a later retry may succeed.
    Transient { reason: String },
    /// The attempt failed in a way no retry can fix.
    Permanent { reason: String },
}

/// One dispatch attempt against a resolved subscriber.
///
/// Implementations never retry internally; the engine owns the retry
/// schedule and calls `dispatch` once per attempt.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, spec: &SubscriberSpec, envelope: &EventEnvelope) -> Outcome;
}

/// Production dispatcher routing each spec variant to its transport.
pub struct TransportDispatcher {
    webhook: WebhookTransport,
    analytics: AnalyticsSink,
}

impl TransportDispatcher {
    pub fn new(webhook: WebhookTransport, analytics: AnalyticsSink) -> Self {
        Self { webhook, analytics }
    }
}

#[async_trait]
impl Dispatcher for TransportDispatcher {
    async fn dispatch(&self, spec: &SubscriberSpec, envelope: &EventEnvelope) -> Outcome {
        match spec {
            SubscriberSpec::Webhook {
                url,
                secret,
                verify_tls,
            } => self.webhook.send(url, secret, *verify_tls, envelope).await,
            SubscriberSpec::Analytics { sink } => self.analytics.send(sink, envelope),
        }
    }
}
