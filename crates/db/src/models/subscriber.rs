//! Subscriber entity model.

use relay_core::error::CoreError;
use relay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The delivery mechanism variant of a subscriber row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberKind {
    Webhook,
    Analytics,
}

impl SubscriberKind {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Analytics => "analytics",
        }
    }

    /// Parse from a wire-format string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "webhook" => Ok(Self::Webhook),
            "analytics" => Ok(Self::Analytics),
            _ => Err(CoreError::Validation(format!(
                "Invalid subscriber kind: '{s}'. Must be one of: webhook, analytics"
            ))),
        }
    }
}

impl std::fmt::Display for SubscriberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `subscribers` table.
///
/// `url`/`secret`/`verify_tls` are populated for webhook rows, `sink` for
/// analytics rows; the CHECK-constrained `kind` column discriminates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: DbId,
    pub kind: String,
    pub name: String,
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub verify_tls: bool,
    pub sink: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trip() {
        assert_eq!(
            SubscriberKind::parse("webhook").unwrap(),
            SubscriberKind::Webhook
        );
        assert_eq!(
            SubscriberKind::parse("analytics").unwrap(),
            SubscriberKind::Analytics
        );
        assert_eq!(SubscriberKind::Webhook.as_str(), "webhook");
    }

    #[test]
    fn invalid_kind_rejected() {
        assert!(SubscriberKind::parse("email").is_err());
    }
}
