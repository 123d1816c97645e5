use chrono::{DateTime, Utc};
use review_lifecycle_config::ModerationConfig;
use review_lifecycle_models::ReviewStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionError {
    #[error("rating {0} is out of range (expected 1-5)")]
    RatingOutOfRange(u8),
}

/// Initial status and deadline computed for a newly submitted review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublicationDecision {
    pub status: ReviewStatus,
    pub auto_publish_at: Option<DateTime<Utc>>,
}

/// Map a submitted rating to its initial publication state.
///
/// Ratings at or above the configured threshold publish immediately.
/// Anything below enters the moderation window and carries the deadline
/// after which it publishes automatically. Pure; the caller persists the
/// result.
pub fn decide_publication(
    rating: u8,
    submitted_at: DateTime<Utc>,
    moderation: &ModerationConfig,
) -> Result<PublicationDecision, DecisionError> {
    if !(1..=5).contains(&rating) {
        return Err(DecisionError::RatingOutOfRange(rating));
    }

    if rating >= moderation.publish_threshold {
        Ok(PublicationDecision {
            status: ReviewStatus::Published,
            auto_publish_at: None,
        })
    } else {
        Ok(PublicationDecision {
            status: ReviewStatus::PendingModeration,
            auto_publish_at: Some(submitted_at + moderation.window()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn moderation() -> ModerationConfig {
        ModerationConfig::default()
    }

    #[test]
    fn test_boundary_at_threshold() {
        let now = Utc::now();

        let pending = decide_publication(2, now, &moderation()).unwrap();
        assert_eq!(pending.status, ReviewStatus::PendingModeration);
        assert_eq!(pending.auto_publish_at, Some(now + Duration::days(7)));

        let published = decide_publication(3, now, &moderation()).unwrap();
        assert_eq!(published.status, ReviewStatus::Published);
        assert_eq!(published.auto_publish_at, None);
    }

    #[test]
    fn test_full_rating_range() {
        let now = Utc::now();
        for rating in 1..=5u8 {
            let decision = decide_publication(rating, now, &moderation()).unwrap();
            if rating >= 3 {
                assert_eq!(decision.status, ReviewStatus::Published, "rating {}", rating);
                assert!(decision.auto_publish_at.is_none());
            } else {
                assert_eq!(decision.status, ReviewStatus::PendingModeration, "rating {}", rating);
                assert!(decision.auto_publish_at.is_some());
            }
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let now = Utc::now();
        assert_eq!(
            decide_publication(0, now, &moderation()),
            Err(DecisionError::RatingOutOfRange(0))
        );
        assert_eq!(
            decide_publication(6, now, &moderation()),
            Err(DecisionError::RatingOutOfRange(6))
        );
    }

    #[test]
    fn test_configured_window_and_threshold() {
        let now = Utc::now();
        let moderation = ModerationConfig {
            publish_threshold: 4,
            window_days: 14,
            reminder_days: vec![7, 12],
        };

        let pending = decide_publication(3, now, &moderation).unwrap();
        assert_eq!(pending.status, ReviewStatus::PendingModeration);
        assert_eq!(pending.auto_publish_at, Some(now + Duration::days(14)));

        let published = decide_publication(4, now, &moderation).unwrap();
        assert_eq!(published.status, ReviewStatus::Published);
    }
}
