use chrono::{DateTime, Utc};
use review_lifecycle_models::{Business, Review};
use serde::{Deserialize, Serialize};

/// The distinct notification kinds produced by the lifecycle engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Thank the customer for a review that published immediately
    ReviewerThankYou,
    /// Tell the customer their pending review is now public
    ReviewerPublished,
    /// Alert the business owner to a new negative review
    BusinessNegativeAlert,
    /// Tell the business owner a review auto-published after the deadline
    BusinessAutoPublished,
    /// Remind the business owner a negative review is awaiting response
    BusinessReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReviewerThankYou => "reviewer_thank_you",
            NotificationKind::ReviewerPublished => "reviewer_published",
            NotificationKind::BusinessNegativeAlert => "business_negative_alert",
            NotificationKind::BusinessAutoPublished => "business_auto_published",
            NotificationKind::BusinessReminder => "business_reminder",
        }
    }
}

/// A fully addressed dispatch request. Template rendering beyond subject and
/// plain-text body is the transport's concern, not the engine's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
    pub business_name: String,
    pub review_rating: u8,
    pub review_comment: String,
    pub reviewer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub review_created_at: DateTime<Utc>,
    /// Days left in the moderation window; reminders only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<u32>,
    /// Set on the final reminder before the deadline.
    #[serde(default)]
    pub urgent: bool,
}

impl Notification {
    fn base(kind: NotificationKind, review: &Review, business: &Business) -> Self {
        Self {
            kind,
            to_email: String::new(),
            to_name: String::new(),
            subject: String::new(),
            body: String::new(),
            business_name: business.name.clone(),
            review_rating: review.rating,
            review_comment: review.comment.clone(),
            reviewer_name: review.reviewer_name.clone(),
            product_name: review.product_name.clone(),
            review_created_at: review.created_at,
            days_remaining: None,
            urgent: false,
        }
    }

    pub fn reviewer_thank_you(review: &Review, business: &Business) -> Self {
        let mut n = Self::base(NotificationKind::ReviewerThankYou, review, business);
        n.to_email = review.reviewer_email.clone();
        n.to_name = review.reviewer_name.clone();
        n.subject = format!("Thank you for your review - {}", business.name);
        n.body = format!(
            "Hi {},\n\nThank you for reviewing {}. Your {}-star review is now live.",
            review.reviewer_name, business.name, review.rating
        );
        n
    }

    pub fn reviewer_published(review: &Review, business: &Business) -> Self {
        let mut n = Self::base(NotificationKind::ReviewerPublished, review, business);
        n.to_email = review.reviewer_email.clone();
        n.to_name = review.reviewer_name.clone();
        n.subject = format!("Your review has been published - {}", business.name);
        n.body = format!(
            "Hi {},\n\nYour review of {} is now published and visible to other customers.",
            review.reviewer_name, business.name
        );
        n
    }

    pub fn business_negative_alert(review: &Review, business: &Business, window_days: u32) -> Self {
        let mut n = Self::base(NotificationKind::BusinessNegativeAlert, review, business);
        n.to_email = business.owner_email.clone();
        n.to_name = business.name.clone();
        n.subject = format!("New review requiring attention - {}", business.name);
        n.body = format!(
            "{} left a {}-star review. You have {} days to respond before it \
             publishes automatically.\n\n\"{}\"",
            review.reviewer_name, review.rating, window_days, review.comment
        );
        n
    }

    pub fn business_auto_published(review: &Review, business: &Business) -> Self {
        let mut n = Self::base(NotificationKind::BusinessAutoPublished, review, business);
        n.to_email = business.owner_email.clone();
        n.to_name = business.name.clone();
        n.subject = format!("Review auto-published - {}", business.name);
        n.body = format!(
            "The {}-star review from {} reached the end of its moderation window \
             without a response and is now public.",
            review.rating, review.reviewer_name
        );
        n
    }

    pub fn business_reminder(
        review: &Review,
        business: &Business,
        days_remaining: u32,
        urgent: bool,
    ) -> Self {
        let mut n = Self::base(NotificationKind::BusinessReminder, review, business);
        n.to_email = business.owner_email.clone();
        n.to_name = business.name.clone();
        n.subject = if urgent {
            format!("Final reminder: review pending response - {}", business.name)
        } else {
            format!("Reminder: review pending response - {}", business.name)
        };
        n.body = format!(
            "The {}-star review from {} is still awaiting your response. \
             {} day(s) remaining before it publishes automatically.",
            review.rating, review.reviewer_name, days_remaining
        );
        n.days_remaining = Some(days_remaining);
        n.urgent = urgent;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_lifecycle_models::{BusinessId, ReviewId, ReviewStatus};
    use std::collections::BTreeSet;

    fn fixtures() -> (Review, Business) {
        let review = Review {
            id: ReviewId::new("rev-1"),
            business_id: BusinessId::new("biz-1"),
            rating: 1,
            comment: "Order never arrived".to_string(),
            reviewer_name: "Sam".to_string(),
            reviewer_email: "sam@example.com".to_string(),
            product_name: Some("Espresso machine".to_string()),
            created_at: Utc::now(),
            status: ReviewStatus::PendingModeration,
            auto_publish_at: Some(Utc::now()),
            auto_published_at: None,
            response: None,
            reminders_sent: BTreeSet::new(),
        };
        let business = Business {
            id: BusinessId::new("biz-1"),
            name: "Bean There".to_string(),
            owner_email: "owner@beanthere.example".to_string(),
            reply_to_email: None,
        };
        (review, business)
    }

    #[test]
    fn test_recipient_routing() {
        let (review, business) = fixtures();
        let to_reviewer = Notification::reviewer_published(&review, &business);
        assert_eq!(to_reviewer.to_email, "sam@example.com");
        let to_owner = Notification::business_negative_alert(&review, &business, 7);
        assert_eq!(to_owner.to_email, "owner@beanthere.example");
        assert!(to_owner.body.contains("7 days"));
    }

    #[test]
    fn test_reminder_urgency() {
        let (review, business) = fixtures();
        let early = Notification::business_reminder(&review, &business, 4, false);
        assert_eq!(early.days_remaining, Some(4));
        assert!(!early.urgent);
        assert!(early.subject.starts_with("Reminder:"));

        let last = Notification::business_reminder(&review, &business, 1, true);
        assert!(last.urgent);
        assert!(last.subject.starts_with("Final reminder:"));
    }
}
