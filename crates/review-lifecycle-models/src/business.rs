use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque business identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusinessId(pub String);

impl BusinessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The business a review belongs to. Only the fields the lifecycle engine
/// needs for notification addressing are carried here; the rest of the
/// business profile lives with the owning application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub owner_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_email: Option<String>,
}

/// Aggregate statistics over a business's public reviews, used as
/// notification template parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BusinessStats {
    pub total_reviews: usize,
    /// Average rating over public reviews, rounded to one decimal place.
    pub average_rating: f64,
    /// Share of public reviews with a positive rating, in percent.
    pub recommendation_percentage: f64,
}

impl BusinessStats {
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total = ratings.len();
        let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
        let positive = ratings.iter().filter(|r| **r >= 3).count();
        Self {
            total_reviews: total,
            average_rating: (f64::from(sum) / total as f64 * 10.0).round() / 10.0,
            recommendation_percentage: (positive as f64 / total as f64 * 1000.0).round() / 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_empty() {
        let stats = BusinessStats::from_ratings(&[]);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.recommendation_percentage, 0.0);
    }

    #[test]
    fn test_stats_rounding() {
        let stats = BusinessStats::from_ratings(&[5, 4, 2]);
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.average_rating, 3.7);
        assert_eq!(stats.recommendation_percentage, 66.7);
    }
}
