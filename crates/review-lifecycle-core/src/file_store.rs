use crate::store::{
    BusinessDirectory, ReminderClaim, ReviewStore, StoreError, TransitionOutcome, transitions,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use review_lifecycle_models::{Business, BusinessId, Review, ReviewId, ReviewStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    reviews: HashMap<ReviewId, Review>,
    #[serde(default)]
    businesses: HashMap<BusinessId, Business>,
}

/// JSON-file-backed store. The file on disk is the source of truth: every
/// operation re-reads the snapshot under the store lock, and mutations
/// rewrite it before the lock is released. The daemon and one-off commands
/// run as separate processes over the same file, so a handle must never
/// serve stale state or clobber rows written by another process.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let store = Self {
            path,
            lock: Mutex::new(()),
        };
        if store.path.exists() {
            let snapshot = store.load()?;
            info!(
                operation = "store_loaded",
                path = %store.path.display(),
                reviews = snapshot.reviews.len(),
                businesses = snapshot.businesses.len(),
                "Loaded review store"
            );
        } else {
            debug!(
                operation = "store_new",
                path = %store.path.display(),
                "No store file yet, starting empty"
            );
        }
        Ok(store)
    }

    fn load(&self) -> Result<Snapshot, StoreError> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(
                    operation = "store_corrupt",
                    path = %self.path.display(),
                    error = %e,
                    "Store file unreadable, treating as empty"
                );
                Ok(Snapshot::default())
            }
        }
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for FileStore {
    async fn insert(&self, review: Review) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load()?;
        snapshot.reviews.insert(review.id.clone(), review);
        self.persist(&snapshot)
    }

    async fn get(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load()?;
        Ok(snapshot.reviews.get(id).cloned())
    }

    async fn list(&self, business: Option<&BusinessId>) -> Result<Vec<Review>, StoreError> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load()?;
        let mut reviews: Vec<Review> = snapshot
            .reviews
            .values()
            .filter(|r| business.map_or(true, |b| &r.business_id == b))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn pending_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load()?;
        Ok(snapshot
            .reviews
            .values()
            .filter(|r| r.status == ReviewStatus::PendingModeration)
            .cloned()
            .collect())
    }

    async fn due_for_auto_publish(&self, now: DateTime<Utc>) -> Result<Vec<Review>, StoreError> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load()?;
        Ok(snapshot
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
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load()?;
        let outcome = match snapshot.reviews.get_mut(id) {
            Some(review) => transitions::auto_publish(review, now),
            None => return Ok(TransitionOutcome::NotFound),
        };
        if matches!(outcome, TransitionOutcome::Applied(_)) {
            self.persist(&snapshot)?;
        }
        Ok(outcome)
    }

    async fn record_response(
        &self,
        id: &ReviewId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load()?;
        let outcome = match snapshot.reviews.get_mut(id) {
            Some(review) => transitions::record_response(review, text, now),
            None => return Ok(TransitionOutcome::NotFound),
        };
        if matches!(outcome, TransitionOutcome::Applied(_)) {
            self.persist(&snapshot)?;
        }
        Ok(outcome)
    }

    async fn claim_reminder(
        &self,
        id: &ReviewId,
        day_offset: u32,
    ) -> Result<ReminderClaim, StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load()?;
        let claim = match snapshot.reviews.get_mut(id) {
            Some(review) => transitions::claim_reminder(review, day_offset),
            None => return Ok(ReminderClaim::NotFound),
        };
        if claim == ReminderClaim::Claimed {
            self.persist(&snapshot)?;
        }
        Ok(claim)
    }
}

#[async_trait]
impl BusinessDirectory for FileStore {
    async fn register_business(&self, business: Business) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.load()?;
        snapshot.businesses.insert(business.id.clone(), business);
        self.persist(&snapshot)
    }

    async fn business(&self, id: &BusinessId) -> Result<Option<Business>, StoreError> {
        let _guard = self.lock.lock().await;
        let snapshot = self.load()?;
        Ok(snapshot.businesses.get(id).cloned())
    }
}
