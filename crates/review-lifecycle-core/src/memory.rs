use crate::store::{
    BusinessDirectory, ReminderClaim, ReviewStore, StoreError, TransitionOutcome, transitions,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use review_lifecycle_models::{Business, BusinessId, Review, ReviewId, ReviewStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    reviews: HashMap<ReviewId, Review>,
    businesses: HashMap<BusinessId, Business>,
}

/// In-memory store. The write lock spans every check-then-mutate pair, so
/// conditional transitions are atomic relative to each other.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert(&self, review: Review) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.reviews.insert(review.id.clone(), review);
        Ok(())
    }

    async fn get(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.get(id).cloned())
    }

    async fn list(&self, business: Option<&BusinessId>) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        let mut reviews: Vec<Review> = inner
            .reviews
            .values()
            .filter(|r| business.map_or(true, |b| &r.business_id == b))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn pending_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .values()
            .filter(|r| r.status == ReviewStatus::PendingModeration)
            .cloned()
            .collect())
    }

    async fn due_for_auto_publish(&self, now: DateTime<Utc>) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .values()
            .filter(|r| {
                r.status == ReviewStatus::PendingModeration
                    && r.auto_publish_at.map_or(false, |deadline| deadline <= now)
            })
            .cloned()
            .collect())
    }

    async fn auto_publish(
        &self,
        id: &ReviewId,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get_mut(id) {
            Some(review) => Ok(transitions::auto_publish(review, now)),
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn record_response(
        &self,
        id: &ReviewId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get_mut(id) {
            Some(review) => Ok(transitions::record_response(review, text, now)),
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn claim_reminder(
        &self,
        id: &ReviewId,
        day_offset: u32,
    ) -> Result<ReminderClaim, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.reviews.get_mut(id) {
            Some(review) => Ok(transitions::claim_reminder(review, day_offset)),
            None => Ok(ReminderClaim::NotFound),
        }
    }
}

#[async_trait]
impl BusinessDirectory for MemoryStore {
    async fn register_business(&self, business: Business) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.businesses.insert(business.id.clone(), business);
        Ok(())
    }

    async fn business(&self, id: &BusinessId) -> Result<Option<Business>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.businesses.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn pending_review(id: &str, created_at: DateTime<Utc>, window_days: i64) -> Review {
        Review {
            id: ReviewId::new(id),
            business_id: BusinessId::new("biz-1"),
            rating: 1,
            comment: "Late delivery".to_string(),
            reviewer_name: "Pat".to_string(),
            reviewer_email: "pat@example.com".to_string(),
            product_name: None,
            created_at,
            status: ReviewStatus::PendingModeration,
            auto_publish_at: Some(created_at + Duration::days(window_days)),
            auto_published_at: None,
            response: None,
            reminders_sent: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn test_due_query_excludes_future_deadlines() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert(pending_review("due", now - Duration::days(8), 7)).await.unwrap();
        store.insert(pending_review("fresh", now, 7)).await.unwrap();

        let due = store.due_for_auto_publish(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id.as_str(), "due");
        assert_eq!(store.pending_reviews().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_auto_publish_is_conditional() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert(pending_review("r1", now - Duration::days(8), 7)).await.unwrap();

        let first = store.auto_publish(&ReviewId::new("r1"), now).await.unwrap();
        assert!(matches!(first, TransitionOutcome::Applied(_)));

        let second = store.auto_publish(&ReviewId::new("r1"), now).await.unwrap();
        assert!(matches!(
            second,
            TransitionOutcome::NotPending(ReviewStatus::AutoPublished)
        ));

        let missing = store.auto_publish(&ReviewId::new("ghost"), now).await.unwrap();
        assert!(matches!(missing, TransitionOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_auto_publish_before_deadline_is_not_due() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert(pending_review("r1", now, 7)).await.unwrap();

        let outcome = store.auto_publish(&ReviewId::new("r1"), now).await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::NotDue(_)));
        let review = store.get(&ReviewId::new("r1")).await.unwrap().unwrap();
        assert_eq!(review.status, ReviewStatus::PendingModeration);
    }

    #[tokio::test]
    async fn test_response_blocks_auto_publish() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert(pending_review("r1", now - Duration::days(8), 7)).await.unwrap();

        let responded = store
            .record_response(&ReviewId::new("r1"), "We are sorry", now)
            .await
            .unwrap();
        assert!(matches!(responded, TransitionOutcome::Applied(_)));

        let outcome = store.auto_publish(&ReviewId::new("r1"), now).await.unwrap();
        assert!(matches!(
            outcome,
            TransitionOutcome::NotPending(ReviewStatus::Responded)
        ));

        let review = store.get(&ReviewId::new("r1")).await.unwrap().unwrap();
        assert_eq!(review.response.unwrap().text, "We are sorry");
        assert!(review.auto_published_at.is_none());
    }

    #[tokio::test]
    async fn test_claim_reminder_once_per_offset() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert(pending_review("r1", now, 7)).await.unwrap();
        let id = ReviewId::new("r1");

        assert_eq!(store.claim_reminder(&id, 3).await.unwrap(), ReminderClaim::Claimed);
        assert_eq!(store.claim_reminder(&id, 3).await.unwrap(), ReminderClaim::AlreadySent);
        assert_eq!(store.claim_reminder(&id, 5).await.unwrap(), ReminderClaim::Claimed);

        store.record_response(&id, "Handled", now).await.unwrap();
        assert_eq!(store.claim_reminder(&id, 6).await.unwrap(), ReminderClaim::NotPending);
    }
}
