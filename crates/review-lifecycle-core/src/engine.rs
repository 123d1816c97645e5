use crate::decision::{DecisionError, decide_publication};
use crate::store::{BusinessDirectory, ReminderClaim, ReviewStore, StoreError, TransitionOutcome};
use chrono::{DateTime, Duration, Utc};
use review_lifecycle_config::ModerationConfig;
use review_lifecycle_models::{BusinessId, BusinessStats, NewReview, Review, ReviewId};
use review_lifecycle_notify::{Notification, NotificationDispatcher};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown business: {0}")]
    UnknownBusiness(BusinessId),
}

/// Counters reported by one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub examined: usize,
    pub published: usize,
    pub reminders_sent: usize,
    pub failures: usize,
}

/// The review publication state machine and its time-triggered processes.
///
/// All collaborators are injected: the store provides atomic conditional
/// transitions, the directory resolves notification addressing, and the
/// dispatcher delivers best-effort emails. Operations take `now` explicitly
/// so sweeps can be driven by a real clock or by tests.
pub struct LifecycleEngine {
    store: Arc<dyn ReviewStore>,
    directory: Arc<dyn BusinessDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    moderation: ModerationConfig,
    /// Reviews that already have one-shot tasks in flight, so rescans
    /// do not pile up duplicate sleepers.
    scheduled: tokio::sync::Mutex<HashSet<ReviewId>>,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        directory: Arc<dyn BusinessDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        moderation: ModerationConfig,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
            moderation,
            scheduled: tokio::sync::Mutex::new(HashSet::new()),
        }
    }

    pub fn moderation(&self) -> &ModerationConfig {
        &self.moderation
    }

    /// Run the publication decision for a submitted review, persist it, and
    /// send the submission-time notification (thank-you or negative alert).
    pub async fn submit(&self, new: NewReview, now: DateTime<Utc>) -> Result<Review, SubmitError> {
        let business = self
            .directory
            .business(&new.business_id)
            .await?
            .ok_or_else(|| SubmitError::UnknownBusiness(new.business_id.clone()))?;

        let decision = decide_publication(new.rating, now, &self.moderation)?;

        let review = Review {
            id: new.id,
            business_id: new.business_id,
            rating: new.rating,
            comment: new.comment,
            reviewer_name: new.reviewer_name,
            reviewer_email: new.reviewer_email,
            product_name: new.product_name,
            created_at: now,
            status: decision.status,
            auto_publish_at: decision.auto_publish_at,
            auto_published_at: None,
            response: None,
            reminders_sent: BTreeSet::new(),
        };
        self.store.insert(review.clone()).await?;

        info!(
            operation = "review_submitted",
            review_id = %review.id,
            business_id = %review.business_id,
            rating = review.rating,
            status = %review.status,
            "Review submitted"
        );

        if review.is_pending() {
            self.dispatch(Notification::business_negative_alert(
                &review,
                &business,
                self.moderation.window_days,
            ))
            .await;
        } else {
            self.dispatch(Notification::reviewer_thank_you(&review, &business))
                .await;
        }

        Ok(review)
    }

    /// Record a business response to a pending review. The review publishes
    /// immediately with the response; once applied, every later scheduler or
    /// reminder evaluation sees a non-pending status and becomes a no-op.
    pub async fn respond(
        &self,
        id: &ReviewId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, StoreError> {
        let outcome = self.store.record_response(id, text, now).await?;
        match &outcome {
            TransitionOutcome::Applied(review) => {
                info!(
                    operation = "review_responded",
                    review_id = %review.id,
                    "Business responded, review published with response"
                );
            }
            TransitionOutcome::NotPending(status) => {
                debug!(
                    operation = "response_noop",
                    review_id = %id,
                    status = %status,
                    "Response ignored, review is no longer pending"
                );
            }
            TransitionOutcome::NotDue(deadline) => {
                // Responses have no deadline gate; a store returning this is
                // treated like any other conflict.
                warn!(
                    operation = "response_noop",
                    review_id = %id,
                    deadline = %deadline,
                    "Response ignored, review could not be updated"
                );
            }
            TransitionOutcome::NotFound => {
                warn!(operation = "response_noop", review_id = %id, "Review not found");
            }
        }
        Ok(outcome)
    }

    /// One-shot deadline body: transition a single review if it is still
    /// pending and due. Returns whether the transition was applied.
    pub async fn run_deadline(
        &self,
        id: &ReviewId,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        match self.store.auto_publish(id, now).await? {
            TransitionOutcome::Applied(review) => {
                info!(
                    operation = "review_auto_published",
                    review_id = %review.id,
                    business_id = %review.business_id,
                    "Moderation window elapsed, review auto-published"
                );
                self.notify_auto_published(&review).await;
                Ok(true)
            }
            TransitionOutcome::NotPending(status) => {
                debug!(
                    operation = "auto_publish_noop",
                    review_id = %id,
                    status = %status,
                    "Not auto-publishing, review already left moderation"
                );
                Ok(false)
            }
            TransitionOutcome::NotDue(deadline) => {
                debug!(
                    operation = "auto_publish_noop",
                    review_id = %id,
                    deadline = %deadline,
                    "Not auto-publishing, deadline not reached"
                );
                Ok(false)
            }
            TransitionOutcome::NotFound => {
                warn!(operation = "auto_publish_noop", review_id = %id, "Review not found");
                Ok(false)
            }
        }
    }

    /// Backstop sweep: auto-publish every pending review whose deadline has
    /// passed. A failing review never blocks the rest of the batch.
    pub async fn auto_publish_due(&self, now: DateTime<Utc>) -> Result<SweepStats, StoreError> {
        let due = self.store.due_for_auto_publish(now).await?;
        let mut stats = SweepStats {
            examined: due.len(),
            ..SweepStats::default()
        };

        for review in due {
            match self.run_deadline(&review.id, now).await {
                Ok(true) => stats.published += 1,
                Ok(false) => {}
                Err(e) => {
                    stats.failures += 1;
                    error!(
                        operation = "auto_publish_error",
                        review_id = %review.id,
                        error = %e,
                        "Failed to auto-publish review"
                    );
                }
            }
        }

        if stats.examined > 0 {
            info!(
                operation = "auto_publish_sweep",
                examined = stats.examined,
                published = stats.published,
                failures = stats.failures,
                "Auto-publish sweep finished"
            );
        }
        Ok(stats)
    }

    /// Send the reminder for one (review, day-offset) pair if it has not
    /// gone out yet. The claim is the atomic gate: at most one dispatch per
    /// pair, no matter how sweeps and one-shot tasks interleave.
    pub async fn run_reminder(
        &self,
        id: &ReviewId,
        day_offset: u32,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        match self.store.claim_reminder(id, day_offset).await? {
            ReminderClaim::Claimed => {}
            ReminderClaim::AlreadySent => {
                debug!(
                    operation = "reminder_noop",
                    review_id = %id,
                    day_offset,
                    "Reminder already sent"
                );
                return Ok(false);
            }
            ReminderClaim::NotPending => {
                debug!(
                    operation = "reminder_noop",
                    review_id = %id,
                    day_offset,
                    "Reminder suppressed, review no longer pending"
                );
                return Ok(false);
            }
            ReminderClaim::NotFound => {
                warn!(operation = "reminder_noop", review_id = %id, "Review not found");
                return Ok(false);
            }
        }

        let Some(review) = self.store.get(id).await? else {
            warn!(operation = "reminder_noop", review_id = %id, "Review vanished after claim");
            return Ok(false);
        };

        let days_remaining = self.moderation.days_remaining(day_offset);
        let urgent = days_remaining <= 1;
        info!(
            operation = "reminder_due",
            review_id = %id,
            day_offset,
            days_remaining,
            urgent,
            at = %now,
            "Sending business reminder"
        );

        match self.directory.business(&review.business_id).await? {
            Some(business) => {
                self.dispatch(Notification::business_reminder(
                    &review,
                    &business,
                    days_remaining,
                    urgent,
                ))
                .await;
                Ok(true)
            }
            None => {
                warn!(
                    operation = "reminder_noop",
                    review_id = %id,
                    business_id = %review.business_id,
                    "Business not registered, reminder dropped"
                );
                Ok(false)
            }
        }
    }

    /// Reminder sweep: walk pending reviews and fire any reminder offset
    /// whose time has arrived.
    pub async fn send_due_reminders(&self, now: DateTime<Utc>) -> Result<SweepStats, StoreError> {
        let pending = self.store.pending_reviews().await?;
        let mut stats = SweepStats {
            examined: pending.len(),
            ..SweepStats::default()
        };

        for review in pending {
            for &day_offset in &self.moderation.reminder_days {
                if review.reminders_sent.contains(&day_offset) {
                    continue;
                }
                let due_at = review.created_at + Duration::days(i64::from(day_offset));
                if now < due_at {
                    continue;
                }
                match self.run_reminder(&review.id, day_offset, now).await {
                    Ok(true) => stats.reminders_sent += 1,
                    Ok(false) => {}
                    Err(e) => {
                        stats.failures += 1;
                        error!(
                            operation = "reminder_error",
                            review_id = %review.id,
                            day_offset,
                            error = %e,
                            "Failed to send reminder"
                        );
                    }
                }
            }
        }

        if stats.reminders_sent > 0 || stats.failures > 0 {
            info!(
                operation = "reminder_sweep",
                examined = stats.examined,
                reminders_sent = stats.reminders_sent,
                failures = stats.failures,
                "Reminder sweep finished"
            );
        }
        Ok(stats)
    }

    /// Spawn exact-time one-shot tasks for a pending review: one per future
    /// reminder offset and one for the deadline. The hourly sweep remains
    /// the backstop if the process dies before a task fires; the status
    /// check makes stale tasks harmless, so nothing is ever cancelled.
    pub fn spawn_one_shots(self: Arc<Self>, review: &Review) {
        if !review.is_pending() {
            return;
        }
        let Some(deadline) = review.auto_publish_at else {
            return;
        };

        for &day_offset in &self.moderation.reminder_days {
            let due_at = review.created_at + Duration::days(i64::from(day_offset));
            if review.reminders_sent.contains(&day_offset) || due_at <= Utc::now() {
                continue;
            }
            let engine = Arc::clone(&self);
            let id = review.id.clone();
            tokio::spawn(async move {
                sleep_until(due_at).await;
                if let Err(e) = engine.run_reminder(&id, day_offset, Utc::now()).await {
                    error!(
                        operation = "reminder_error",
                        review_id = %id,
                        day_offset,
                        error = %e,
                        "One-shot reminder failed"
                    );
                }
            });
        }

        let engine = Arc::clone(&self);
        let id = review.id.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if let Err(e) = engine.run_deadline(&id, Utc::now()).await {
                error!(
                    operation = "auto_publish_error",
                    review_id = %id,
                    error = %e,
                    "One-shot auto-publish failed"
                );
            }
        });
    }

    /// Spawn one-shot tasks for pending reviews that do not have them yet.
    /// Called at daemon startup and again after each sweep iteration, so
    /// reviews submitted by other processes while the daemon runs still get
    /// exact-time tasks. Returns how many reviews were newly scheduled.
    pub async fn pending_one_shots(self: Arc<Self>) -> Result<usize, StoreError> {
        let pending = self.store.pending_reviews().await?;
        let mut scheduled = self.scheduled.lock().await;
        scheduled.retain(|id| pending.iter().any(|r| &r.id == id));
        let mut count = 0;
        for review in &pending {
            if scheduled.insert(review.id.clone()) {
                Arc::clone(&self).spawn_one_shots(review);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Aggregate stats over a business's public reviews, for notification
    /// templates and reporting.
    pub async fn business_stats(&self, id: &BusinessId) -> Result<BusinessStats, StoreError> {
        let reviews = self.store.list(Some(id)).await?;
        let ratings: Vec<u8> = reviews
            .iter()
            .filter(|r| r.status.is_public())
            .map(|r| r.rating)
            .collect();
        Ok(BusinessStats::from_ratings(&ratings))
    }

    async fn notify_auto_published(&self, review: &Review) {
        match self.directory.business(&review.business_id).await {
            Ok(Some(business)) => {
                self.dispatch(Notification::reviewer_published(review, &business))
                    .await;
                self.dispatch(Notification::business_auto_published(review, &business))
                    .await;
            }
            Ok(None) => {
                warn!(
                    operation = "notification_skipped",
                    review_id = %review.id,
                    business_id = %review.business_id,
                    "Business not registered, auto-publish notifications dropped"
                );
            }
            Err(e) => {
                error!(
                    operation = "notification_skipped",
                    review_id = %review.id,
                    error = %e,
                    "Business lookup failed, auto-publish notifications dropped"
                );
            }
        }
    }

    /// Best-effort delivery. The status transition is the durable fact;
    /// a transport failure is logged and nothing is rolled back.
    async fn dispatch(&self, notification: Notification) {
        if let Err(e) = self.dispatcher.send(&notification).await {
            error!(
                operation = "notification_failed",
                kind = notification.kind.as_str(),
                to = %notification.to_email,
                error = %e,
                "Notification dispatch failed"
            );
        }
    }
}

async fn sleep_until(target: DateTime<Utc>) {
    let wait = (target - Utc::now())
        .to_std()
        .unwrap_or(std::time::Duration::ZERO);
    tokio::time::sleep(wait).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use review_lifecycle_models::Business;
    use review_lifecycle_notify::{DispatchError, NotificationKind};
    use std::sync::Mutex;

    /// Captures every dispatched notification; optionally fails all sends.
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    impl RecordingDispatcher {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn kinds(&self) -> Vec<NotificationKind> {
            self.sent.lock().unwrap().iter().map(|n| n.kind).collect()
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn send(&self, notification: &Notification) -> Result<(), DispatchError> {
            self.sent.lock().unwrap().push(notification.clone());
            if self.fail {
                Err(DispatchError::Rejected {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        engine: Arc<LifecycleEngine>,
        store: Arc<MemoryStore>,
        dispatcher: Arc<RecordingDispatcher>,
    }

    async fn harness_with(dispatcher: RecordingDispatcher) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(dispatcher);
        store
            .register_business(Business {
                id: BusinessId::new("biz-1"),
                name: "Bean There".to_string(),
                owner_email: "owner@beanthere.example".to_string(),
                reply_to_email: None,
            })
            .await
            .unwrap();
        let engine = Arc::new(LifecycleEngine::new(
            store.clone(),
            store.clone(),
            dispatcher.clone(),
            ModerationConfig::default(),
        ));
        Harness {
            engine,
            store,
            dispatcher,
        }
    }

    async fn harness() -> Harness {
        harness_with(RecordingDispatcher::default()).await
    }

    fn new_review(id: &str, rating: u8) -> NewReview {
        NewReview {
            id: ReviewId::new(id),
            business_id: BusinessId::new("biz-1"),
            rating,
            comment: "Order took three weeks".to_string(),
            reviewer_name: "Sam".to_string(),
            reviewer_email: "sam@example.com".to_string(),
            product_name: None,
        }
    }

    #[tokio::test]
    async fn test_positive_review_publishes_immediately() {
        let h = harness().await;
        let t0 = Utc::now();

        let review = h.engine.submit(new_review("r1", 5), t0).await.unwrap();
        assert_eq!(review.status, review_lifecycle_models::ReviewStatus::Published);
        assert!(review.auto_publish_at.is_none());
        assert_eq!(h.dispatcher.kinds(), vec![NotificationKind::ReviewerThankYou]);

        // No scheduler activity ever becomes due for it
        let later = t0 + Duration::days(30);
        let stats = h.engine.auto_publish_due(later).await.unwrap();
        assert_eq!(stats.examined, 0);
        let stats = h.engine.send_due_reminders(later).await.unwrap();
        assert_eq!(stats.reminders_sent, 0);
        assert_eq!(h.dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn test_negative_review_enters_moderation_with_alert() {
        let h = harness().await;
        let t0 = Utc::now();

        let review = h.engine.submit(new_review("r1", 1), t0).await.unwrap();
        assert!(review.is_pending());
        assert_eq!(review.auto_publish_at, Some(t0 + Duration::days(7)));
        assert_eq!(h.dispatcher.kinds(), vec![NotificationKind::BusinessNegativeAlert]);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_rating_and_unknown_business() {
        let h = harness().await;
        let t0 = Utc::now();

        let err = h.engine.submit(new_review("r1", 0), t0).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Decision(DecisionError::RatingOutOfRange(0))
        ));

        let mut foreign = new_review("r2", 4);
        foreign.business_id = BusinessId::new("nope");
        let err = h.engine.submit(foreign, t0).await.unwrap_err();
        assert!(matches!(err, SubmitError::UnknownBusiness(_)));
    }

    #[tokio::test]
    async fn test_auto_publish_is_idempotent_under_race() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 1), t0).await.unwrap();
        let after_deadline = t0 + Duration::days(7) + Duration::hours(1);

        // Simulate the one-shot and the sweep both firing
        let first = h
            .engine
            .run_deadline(&ReviewId::new("r1"), after_deadline)
            .await
            .unwrap();
        let second = h
            .engine
            .run_deadline(&ReviewId::new("r1"), after_deadline)
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        let kinds = h.dispatcher.kinds();
        assert_eq!(
            &kinds[1..],
            &[
                NotificationKind::ReviewerPublished,
                NotificationKind::BusinessAutoPublished,
            ]
        );
        // Exactly one pair beyond the submission alert
        assert_eq!(h.dispatcher.count(), 3);
    }

    #[tokio::test]
    async fn test_response_interrupts_auto_publish() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 2), t0).await.unwrap();

        let outcome = h
            .engine
            .respond(&ReviewId::new("r1"), "We refunded the order", t0 + Duration::days(2))
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));

        let stats = h
            .engine
            .auto_publish_due(t0 + Duration::days(8))
            .await
            .unwrap();
        assert_eq!(stats.examined, 0);
        assert_eq!(stats.published, 0);

        let review = h.store.get(&ReviewId::new("r1")).await.unwrap().unwrap();
        assert_eq!(review.status, review_lifecycle_models::ReviewStatus::Responded);
        assert!(review.auto_published_at.is_none());
        // Only the submission alert went out
        assert_eq!(h.dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn test_reminders_fire_exactly_once_per_offset() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 1), t0).await.unwrap();

        // Hourly-style sweeps: several evaluations per day
        let mut reminders = 0;
        for day in [3i64, 5, 6] {
            for hour in [0i64, 1, 5, 12] {
                let now = t0 + Duration::days(day) + Duration::hours(hour);
                let stats = h.engine.send_due_reminders(now).await.unwrap();
                reminders += stats.reminders_sent;
            }
        }
        assert_eq!(reminders, 3);

        let sent: Vec<(Option<u32>, bool)> = h
            .dispatcher
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind == NotificationKind::BusinessReminder)
            .map(|n| (n.days_remaining, n.urgent))
            .collect();
        assert_eq!(sent, vec![(Some(4), false), (Some(2), false), (Some(1), true)]);
    }

    #[tokio::test]
    async fn test_full_negative_lifecycle() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 1), t0).await.unwrap();

        for day in [3i64, 5, 6] {
            let now = t0 + Duration::days(day) + Duration::minutes(5);
            h.engine.auto_publish_due(now).await.unwrap();
            h.engine.send_due_reminders(now).await.unwrap();
        }
        let deadline = t0 + Duration::days(7) + Duration::minutes(5);
        let stats = h.engine.auto_publish_due(deadline).await.unwrap();
        assert_eq!(stats.published, 1);
        h.engine.send_due_reminders(deadline).await.unwrap();

        let kinds = h.dispatcher.kinds();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::BusinessNegativeAlert,
                NotificationKind::BusinessReminder,
                NotificationKind::BusinessReminder,
                NotificationKind::BusinessReminder,
                NotificationKind::ReviewerPublished,
                NotificationKind::BusinessAutoPublished,
            ]
        );

        let review = h.store.get(&ReviewId::new("r1")).await.unwrap().unwrap();
        assert_eq!(review.status, review_lifecycle_models::ReviewStatus::AutoPublished);
        assert_eq!(review.auto_published_at, Some(deadline));
    }

    #[tokio::test]
    async fn test_responded_review_gets_no_further_activity() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 2), t0).await.unwrap();
        h.engine
            .respond(&ReviewId::new("r1"), "Sorry about that", t0 + Duration::days(2))
            .await
            .unwrap();

        let end = t0 + Duration::days(7) + Duration::hours(1);
        let publish = h.engine.auto_publish_due(end).await.unwrap();
        let reminders = h.engine.send_due_reminders(end).await.unwrap();
        assert_eq!(publish.published, 0);
        assert_eq!(reminders.reminders_sent, 0);
        assert_eq!(h.dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_does_not_roll_back_transition() {
        let h = harness_with(RecordingDispatcher::failing()).await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 1), t0).await.unwrap();
        h.engine.submit(new_review("r2", 1), t0).await.unwrap();

        let stats = h
            .engine
            .auto_publish_due(t0 + Duration::days(8))
            .await
            .unwrap();
        // Both reviews publish even though every send fails
        assert_eq!(stats.published, 2);
        assert_eq!(stats.failures, 0);

        for id in ["r1", "r2"] {
            let review = h.store.get(&ReviewId::new(id)).await.unwrap().unwrap();
            assert_eq!(review.status, review_lifecycle_models::ReviewStatus::AutoPublished);
        }
    }

    #[tokio::test]
    async fn test_deleted_review_is_absorbed() {
        let h = harness().await;
        let now = Utc::now();
        let applied = h.engine.run_deadline(&ReviewId::new("ghost"), now).await.unwrap();
        assert!(!applied);
        let sent = h.engine.run_reminder(&ReviewId::new("ghost"), 3, now).await.unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_rescan_picks_up_reviews_submitted_after_start() {
        let h = harness().await;
        let t0 = Utc::now();

        // Daemon startup with nothing pending
        assert_eq!(Arc::clone(&h.engine).pending_one_shots().await.unwrap(), 0);

        // A review goes pending while the scheduler is already running
        h.engine.submit(new_review("r1", 1), t0).await.unwrap();
        assert_eq!(Arc::clone(&h.engine).pending_one_shots().await.unwrap(), 1);

        // The next rescan sees it as already scheduled
        assert_eq!(Arc::clone(&h.engine).pending_one_shots().await.unwrap(), 0);

        // Once the review leaves moderation it drops out of the tracked set
        h.engine
            .respond(&ReviewId::new("r1"), "On it", t0 + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(Arc::clone(&h.engine).pending_one_shots().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_business_stats_cover_public_reviews_only() {
        let h = harness().await;
        let t0 = Utc::now();
        h.engine.submit(new_review("r1", 5), t0).await.unwrap();
        h.engine.submit(new_review("r2", 4), t0).await.unwrap();
        h.engine.submit(new_review("r3", 1), t0).await.unwrap();

        // Pending review is not public yet
        let stats = h.engine.business_stats(&BusinessId::new("biz-1")).await.unwrap();
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.recommendation_percentage, 100.0);

        h.engine.auto_publish_due(t0 + Duration::days(8)).await.unwrap();
        let stats = h.engine.business_stats(&BusinessId::new("biz-1")).await.unwrap();
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.recommendation_percentage, 66.7);
    }
}
