use async_trait::async_trait;
use chrono::{DateTime, Utc};
use review_lifecycle_models::{Business, BusinessId, Review, ReviewId, ReviewStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a conditional status transition. Conflicts and missing rows are
/// normal no-op outcomes here, not errors; sweeps and one-shot tasks racing
/// on the same review both resolve through this type.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// Precondition held; the review was mutated. Carries the updated row.
    Applied(Review),
    /// The review left `PendingModeration` before this transition ran.
    NotPending(ReviewStatus),
    /// Pending, but the deadline has not arrived yet (early one-shot fire).
    NotDue(DateTime<Utc>),
    /// The review no longer exists (deleted administratively).
    NotFound,
}

/// Result of claiming a reminder slot for a (review, day-offset) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderClaim {
    Claimed,
    AlreadySent,
    NotPending,
    NotFound,
}

/// Persistence seam for reviews. Implementations must make each conditional
/// transition atomic with respect to other mutators of the same review:
/// the status check and the write are one unit, which is what keeps the
/// sweep, the one-shot tasks, and business responses from double-applying.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert(&self, review: Review) -> Result<(), StoreError>;

    async fn get(&self, id: &ReviewId) -> Result<Option<Review>, StoreError>;

    /// All reviews, optionally narrowed to one business.
    async fn list(&self, business: Option<&BusinessId>) -> Result<Vec<Review>, StoreError>;

    /// Reviews still in moderation, for reminder evaluation.
    async fn pending_reviews(&self) -> Result<Vec<Review>, StoreError>;

    /// Pending reviews whose deadline has passed, for the backstop sweep.
    async fn due_for_auto_publish(&self, now: DateTime<Utc>) -> Result<Vec<Review>, StoreError>;

    /// Transition to `AutoPublished` iff still pending and due.
    async fn auto_publish(
        &self,
        id: &ReviewId,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError>;

    /// Attach a business response and transition to `Responded` iff still pending.
    async fn record_response(
        &self,
        id: &ReviewId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError>;

    /// Record that the reminder at `day_offset` is being sent. Succeeds at
    /// most once per (review, offset), and only while the review is pending.
    async fn claim_reminder(
        &self,
        id: &ReviewId,
        day_offset: u32,
    ) -> Result<ReminderClaim, StoreError>;
}

/// Lookup for the business a review belongs to; used only for notification
/// addressing and aggregate stats.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    async fn register_business(&self, business: Business) -> Result<(), StoreError>;

    async fn business(&self, id: &BusinessId) -> Result<Option<Business>, StoreError>;
}

/// Shared transition bodies. Stores call these while holding their write
/// lock so the check-then-mutate pair stays atomic.
pub(crate) mod transitions {
    use super::*;

    pub fn auto_publish(review: &mut Review, now: DateTime<Utc>) -> TransitionOutcome {
        if review.status != ReviewStatus::PendingModeration {
            return TransitionOutcome::NotPending(review.status);
        }
        match review.auto_publish_at {
            Some(deadline) if deadline <= now => {
                review.status = ReviewStatus::AutoPublished;
                review.auto_published_at = Some(now);
                TransitionOutcome::Applied(review.clone())
            }
            Some(deadline) => TransitionOutcome::NotDue(deadline),
            // Pending without a deadline violates the data model; treat as not due forever
            None => TransitionOutcome::NotPending(review.status),
        }
    }

    pub fn record_response(
        review: &mut Review,
        text: &str,
        now: DateTime<Utc>,
    ) -> TransitionOutcome {
        if review.status != ReviewStatus::PendingModeration {
            return TransitionOutcome::NotPending(review.status);
        }
        review.status = ReviewStatus::Responded;
        review.response = Some(review_lifecycle_models::BusinessResponse {
            text: text.to_string(),
            responded_at: now,
        });
        TransitionOutcome::Applied(review.clone())
    }

    pub fn claim_reminder(review: &mut Review, day_offset: u32) -> ReminderClaim {
        if review.status != ReviewStatus::PendingModeration {
            return ReminderClaim::NotPending;
        }
        if !review.reminders_sent.insert(day_offset) {
            return ReminderClaim::AlreadySent;
        }
        ReminderClaim::Claimed
    }
}
