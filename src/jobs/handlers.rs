//! Job handlers for the evaluation workflow

use crate::jobs::context::JobContext;
use crate::jobs::cycle::{evaluate_subscription, CycleOutcome};
use crate::jobs::types::EvaluateSubscriptionJob;
use apalis::prelude::*;
use std::sync::Arc;
use tracing::{debug, error};

/// Handler for the evaluation job.
///
/// A failed cycle is logged and counted; it never affects other subjects.
pub async fn handle_evaluate_subscription(
    job: EvaluateSubscriptionJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match evaluate_subscription(&ctx, &job.key).await {
        Ok(CycleOutcome::Evaluated {
            delivered,
            failed_deliveries,
        }) => {
            debug!(
                subscription = %job.key,
                delivered = delivered.len(),
                failed = failed_deliveries,
                "EvaluateSubscriptionJob: cycle complete for {}",
                job.key
            );
            Ok(())
        }
        Ok(outcome) => {
            debug!(subscription = %job.key, ?outcome, "EvaluateSubscriptionJob: cycle ended early");
            Ok(())
        }
        Err(e) => {
            if let Some(ref metrics) = ctx.metrics {
                metrics.evaluation_failures_total.inc();
            }
            error!(
                subscription = %job.key,
                error = %e,
                "EvaluateSubscriptionJob: cycle failed for {}",
                job.key
            );
            Err(Box::new(e))
        }
    }
}
