pub mod decision;
pub mod engine;
pub mod file_store;
pub mod memory;
pub mod store;

pub use decision::{DecisionError, PublicationDecision, decide_publication};
pub use engine::{LifecycleEngine, SubmitError, SweepStats};
pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use store::{BusinessDirectory, ReminderClaim, ReviewStore, StoreError, TransitionOutcome};
