use super::build_context;
use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use review_lifecycle_core::{ReviewStore, TransitionOutcome};
use review_lifecycle_models::{BusinessId, NewReview, ReviewId, ReviewStatus};
use serde_json::json;

#[allow(clippy::too_many_arguments)]
pub async fn run_submit(
    business: String,
    rating: u8,
    comment: String,
    name: String,
    email: String,
    product: Option<String>,
    id: Option<String>,
    output: &Output,
) -> Result<()> {
    let context = build_context(output)?;
    let now = Utc::now();
    let id = id.unwrap_or_else(|| format!("rev-{}", now.timestamp_millis()));

    let new = NewReview {
        id: ReviewId::new(id),
        business_id: BusinessId::new(business),
        rating,
        comment,
        reviewer_name: name,
        reviewer_email: email,
        product_name: product,
    };

    let review = context
        .engine
        .submit(new, now)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Submit failed: {}", e))?;

    match review.auto_publish_at {
        Some(deadline) => output.success(format!(
            "Review {} is pending moderation; it auto-publishes at {} unless the business responds",
            review.id, deadline
        )),
        None => output.success(format!("Review {} published", review.id)),
    }
    Ok(())
}

pub async fn run_respond(review: String, text: String, output: &Output) -> Result<()> {
    let context = build_context(output)?;
    let id = ReviewId::new(review);

    let outcome = context
        .engine
        .respond(&id, &text, Utc::now())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Respond failed: {}", e))?;

    match outcome {
        TransitionOutcome::Applied(review) => {
            output.success(format!("Response recorded; review {} is now public", review.id));
        }
        TransitionOutcome::NotPending(status) => {
            output.warn(format!("Review {} is not pending (status: {}), nothing to do", id, status));
        }
        TransitionOutcome::NotDue(_) => {
            output.warn(format!("Review {} could not be updated, nothing to do", id));
        }
        TransitionOutcome::NotFound => {
            output.error(format!("Review {} not found", id));
        }
    }
    Ok(())
}

pub async fn run_list(
    business: Option<String>,
    status: Option<String>,
    output: &Output,
) -> Result<()> {
    let context = build_context(output)?;
    let business_id = business.map(BusinessId::new);

    let status_filter = match status.as_deref() {
        None => None,
        Some(s) => Some(
            serde_json::from_value::<ReviewStatus>(json!(s))
                .map_err(|_| color_eyre::eyre::eyre!("Unknown status: {}", s))?,
        ),
    };

    let mut reviews = context
        .store
        .list(business_id.as_ref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("List failed: {}", e))?;
    if let Some(status) = status_filter {
        reviews.retain(|r| r.status == status);
    }

    output.json(&json!({
        "count": reviews.len(),
        "reviews": reviews,
    }));
    Ok(())
}
