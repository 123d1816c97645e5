use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified review lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting either a business response or automatic publication
    PendingModeration,
    /// Published at submission time (positive review)
    Published,
    /// Business responded before the deadline; public together with the response
    Responded,
    /// Deadline passed without a response; published automatically
    AutoPublished,
}

impl ReviewStatus {
    /// Whether the review is visible to the public.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            ReviewStatus::Published | ReviewStatus::Responded | ReviewStatus::AutoPublished
        )
    }

    /// Terminal statuses are never revisited by the scheduler or reminder cadence.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::PendingModeration)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::PendingModeration => "pending_moderation",
            ReviewStatus::Published => "published",
            ReviewStatus::Responded => "responded",
            ReviewStatus::AutoPublished => "auto_published",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
