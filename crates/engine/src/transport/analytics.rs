//! In-process analytics sink transport.
//!
//! Analytics subscribers do not leave the process: their events are pushed
//! onto an unbounded channel that an in-process consumer (or a test) drains.
//! A closed channel is reported as transient so rows are retried once a
//! consumer reattaches, up to the normal retry budget.

use tokio::sync::mpsc;

use super::{EventEnvelope, Outcome};

/// One record handed to the analytics consumer.
#[derive(Debug, Clone)]
pub struct AnalyticsRecord {
    /// The sink label from the subscriber row.
    pub sink: String,
    pub envelope: EventEnvelope,
}

/// Sending half of the analytics channel.
#[derive(Clone)]
pub struct AnalyticsSink {
    tx: mpsc::UnboundedSender<AnalyticsRecord>,
}

impl AnalyticsSink {
    /// Create a sink together with the consumer's receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AnalyticsRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push one envelope to the consumer.
    pub fn send(&self, sink: &str, envelope: &EventEnvelope) -> Outcome {
        let record = AnalyticsRecord {
            sink: sink.to_string(),
            envelope: envelope.clone(),
        };
        match self.tx.send(record) {
            Ok(()) => Outcome::Success { status_code: None },
            Err(_) => Outcome::Transient {
                reason: "analytics consumer detached".to_string(),
            },
        }
    }
}
