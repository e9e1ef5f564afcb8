//! Job queue system for subscription evaluation

pub mod context;
pub mod cycle;
pub mod handlers;
pub mod types;

pub use context::{JobContext, SubjectLocks};
pub use cycle::{evaluate_subscription, format_notification, CycleError, CycleOutcome};
pub use types::EvaluateSubscriptionJob;
