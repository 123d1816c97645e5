pub mod business;
pub mod review;
pub mod status;

pub use business::{Business, BusinessId, BusinessStats};
pub use review::{BusinessResponse, NewReview, Review, ReviewId};
pub use status::ReviewStatus;
