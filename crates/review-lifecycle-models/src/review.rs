use crate::business::BusinessId;
use crate::status::ReviewStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque review identifier. Assigned by the submission handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer review as submitted, before the publication decision has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub id: ReviewId,
    pub business_id: BusinessId,
    pub rating: u8,
    pub comment: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Response a business attached to a pending review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessResponse {
    pub text: String,
    pub responded_at: DateTime<Utc>,
}

/// A stored review with its full lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub business_id: BusinessId,
    pub rating: u8,
    pub comment: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: ReviewStatus,
    /// Deadline after which a pending review publishes automatically.
    /// Always None for reviews published at submission time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_publish_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BusinessResponse>,
    /// Day offsets (from creation) for which a reminder has already gone out.
    /// Membership here is what makes the reminder cadence exactly-once.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub reminders_sent: BTreeSet<u32>,
}

impl Review {
    pub fn is_pending(&self) -> bool {
        self.status == ReviewStatus::PendingModeration
    }

    /// Whether the reviewer recommends the business. Mirrors the rating
    /// threshold used by the publication decision (>= 3 is positive).
    pub fn is_positive(&self) -> bool {
        self.rating >= 3
    }
}
