//! Delivery entity model and status vocabulary.

use relay_core::error::CoreError;
use relay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a delivery row.
///
/// `pending → delivering → {delivered | failed_retryable | failed_permanent}`;
/// `failed_retryable` rows become claimable again once their
/// `next_attempt_at` passes. `delivered` and `failed_permanent` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivering,
    Delivered,
    FailedRetryable,
    FailedPermanent,
}

impl DeliveryStatus {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivering => "delivering",
            Self::Delivered => "delivered",
            Self::FailedRetryable => "failed_retryable",
            Self::FailedPermanent => "failed_permanent",
        }
    }

    /// Parse from a wire-format string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivering" => Ok(Self::Delivering),
            "delivered" => Ok(Self::Delivered),
            "failed_retryable" => Ok(Self::FailedRetryable),
            "failed_permanent" => Ok(Self::FailedPermanent),
            _ => Err(CoreError::Validation(format!(
                "Invalid delivery status: '{s}'. Must be one of: pending, delivering, \
                 delivered, failed_retryable, failed_permanent"
            ))),
        }
    }

    /// True for states the engine never touches again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::FailedPermanent)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Delivery {
    pub id: DbId,
    pub event_id: DbId,
    pub subscription_id: DbId,
    pub subscriber_id: DbId,
    pub status: String,
    pub attempt_count: i64,
    pub max_attempts: i64,
    pub next_attempt_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub response_status_code: Option<i64>,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Delivery {
    /// Parsed status of this row.
    pub fn parsed_status(&self) -> Result<DeliveryStatus, CoreError> {
        DeliveryStatus::parse(&self.status)
    }
}
