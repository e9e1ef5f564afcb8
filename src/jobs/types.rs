//! Job types for the evaluation workflow

use crate::models::subscription::SubscriptionKey;
use serde::{Deserialize, Serialize};

/// Job to run one evaluation cycle for a subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateSubscriptionJob {
    pub key: SubscriptionKey,
}
