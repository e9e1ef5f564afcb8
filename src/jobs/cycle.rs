//! One evaluation cycle for one subscription.

use std::time::Instant;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::indicators::IndicatorError;
use crate::jobs::context::JobContext;
use crate::models::signal::{Signal, SignalKind};
use crate::models::subscription::SubscriptionKey;
use crate::services::market_data::MarketDataError;
use crate::signals::engine::SignalEngine;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("market data unavailable: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("subscription store failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The subscription was deleted before the cycle ran.
    Removed,
    /// Not enough candles to compute indicators; nothing was persisted.
    Skipped { candles: usize },
    Evaluated {
        delivered: Vec<SignalKind>,
        failed_deliveries: usize,
    },
}

pub fn format_notification(key: &SubscriptionKey, signal: &Signal) -> String {
    format!("📢 Signal ({}, {}):\n{}", key.symbol, key.interval, signal.message)
}

/// Fetch data, evaluate, persist the updated cache and deliver new signals.
///
/// The cache is written before delivery and on every evaluated cycle, even
/// when no signal fires, so period resets are never lost.
pub async fn evaluate_subscription(
    ctx: &JobContext,
    key: &SubscriptionKey,
) -> Result<CycleOutcome, CycleError> {
    let lock = ctx.locks.lock_for(key).await;
    let outcome = {
        let _guard = lock.lock().await;
        run_cycle(ctx, key).await
    };
    drop(lock);

    if matches!(outcome, Ok(CycleOutcome::Removed)) {
        ctx.locks.prune(key).await;
    }
    outcome
}

async fn run_cycle(ctx: &JobContext, key: &SubscriptionKey) -> Result<CycleOutcome, CycleError> {
    let start = Instant::now();

    let Some(subscription) = ctx.store.get(key).await? else {
        debug!(subscription = %key, "subscription removed, skipping cycle");
        return Ok(CycleOutcome::Removed);
    };

    let (candles, price) = tokio::join!(
        ctx.data_provider
            .get_candles(&key.symbol, key.interval, ctx.config.klines_limit),
        ctx.data_provider.get_latest_price(&key.symbol),
    );
    let candles = candles?;
    let live_price = match price {
        Ok(price) => Some(price),
        Err(e) => {
            warn!(symbol = %key.symbol, error = %e, "live price unavailable, evaluating without it");
            None
        }
    };

    let evaluation = match SignalEngine::evaluate(&candles, subscription.signal_cache, live_price) {
        Ok(evaluation) => evaluation,
        Err(IndicatorError::InsufficientData { required, actual }) => {
            debug!(
                subscription = %key,
                count = actual,
                min = required,
                "not enough candles ({} < {}), skipping cycle",
                actual,
                required
            );
            if let Some(ref metrics) = ctx.metrics {
                metrics.evaluations_skipped_total.inc();
            }
            return Ok(CycleOutcome::Skipped { candles: actual });
        }
    };

    if !ctx.store.save_cache(key, evaluation.updated_cache.clone()).await? {
        debug!(subscription = %key, "subscription removed during evaluation, dropping signals");
        return Ok(CycleOutcome::Removed);
    }

    let mut delivered = Vec::new();
    let mut failed_deliveries = 0;
    for (i, signal) in evaluation.new_signals.iter().enumerate() {
        if i > 0 && !ctx.config.notify_delay.is_zero() {
            sleep(ctx.config.notify_delay).await;
        }

        let text = format_notification(key, signal);
        match ctx.notifier.send(key.chat_id, &text).await {
            Ok(()) => {
                info!(
                    subscription = %key,
                    kind = %signal.kind,
                    "delivered {} signal",
                    signal.kind
                );
                if let Some(ref metrics) = ctx.metrics {
                    metrics
                        .signals_emitted_total
                        .with_label_values(&[signal.kind.as_str()])
                        .inc();
                }
                delivered.push(signal.kind);
            }
            Err(e) => {
                error!(subscription = %key, kind = %signal.kind, error = %e, "failed to deliver signal");
                failed_deliveries += 1;
            }
        }
    }

    if let Some(ref metrics) = ctx.metrics {
        metrics.evaluations_total.inc();
        metrics
            .evaluation_duration_seconds
            .observe(start.elapsed().as_secs_f64());
    }

    Ok(CycleOutcome::Evaluated {
        delivered,
        failed_deliveries,
    })
}
