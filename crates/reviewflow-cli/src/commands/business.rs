use super::build_context;
use crate::output::Output;
use color_eyre::Result;
use review_lifecycle_core::BusinessDirectory;
use review_lifecycle_models::{Business, BusinessId};
use serde_json::json;

pub async fn run_add(id: String, name: String, owner_email: String, output: &Output) -> Result<()> {
    let context = build_context(output)?;

    let business = Business {
        id: BusinessId::new(id),
        name,
        owner_email,
        reply_to_email: None,
    };
    context
        .store
        .register_business(business.clone())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to register business: {}", e))?;

    output.success(format!("Registered business {} ({})", business.name, business.id));
    Ok(())
}

pub async fn run_stats(id: String, output: &Output) -> Result<()> {
    let context = build_context(output)?;
    let business_id = BusinessId::new(id);

    let business = context
        .store
        .business(&business_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Lookup failed: {}", e))?;
    let Some(business) = business else {
        output.error(format!("Business {} not found", business_id));
        return Ok(());
    };

    let stats = context
        .engine
        .business_stats(&business_id)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Stats failed: {}", e))?;

    output.json(&json!({
        "business": business.name,
        "total_reviews": stats.total_reviews,
        "average_rating": stats.average_rating,
        "recommendation_percentage": stats.recommendation_percentage,
    }));
    Ok(())
}
