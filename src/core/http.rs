//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::config;
use crate::indicators::{compute_indicators, IndicatorError};
use crate::metrics::Metrics;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::SignalCache;
use crate::models::subscription::{Interval, Subscription, SubscriptionKey};
use crate::services::market_data::MarketDataProvider;
use crate::store::SubscriptionStore;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub store: Arc<dyn SubscriptionStore>,
    pub market_data: Option<Arc<dyn MarketDataProvider>>,
    pub klines_limit: usize,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "pivotwatch"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Choices a subscriber can pick from
async fn options() -> Json<Value> {
    let intervals: Vec<&str> = config::supported_intervals()
        .iter()
        .map(Interval::as_str)
        .collect();
    Json(json!({
        "symbols": config::SUPPORTED_SYMBOLS,
        "intervals": intervals,
    }))
}

#[derive(Debug, Deserialize)]
struct SubscriptionQuery {
    chat_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateSubscriptionRequest {
    chat_id: i64,
    symbol: String,
    interval: Interval,
}

#[derive(Debug, Serialize)]
struct SubscriptionResponse {
    chat_id: i64,
    symbol: String,
    interval: Interval,
    signal_cache: SignalCache,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            chat_id: subscription.key.chat_id,
            symbol: subscription.key.symbol,
            interval: subscription.key.interval,
            signal_cache: subscription.signal_cache,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

fn parse_symbol(symbol: &str) -> Result<String, ApiError> {
    let symbol = symbol.to_uppercase();
    if config::is_supported_symbol(&symbol) {
        Ok(symbol)
    } else {
        Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("unsupported symbol: {}", symbol),
        ))
    }
}

fn parse_interval(interval: &str) -> Result<Interval, ApiError> {
    interval
        .parse::<Interval>()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))
}

fn parse_key(chat_id: i64, symbol: &str, interval: &str) -> Result<SubscriptionKey, ApiError> {
    Ok(SubscriptionKey::new(
        chat_id,
        parse_symbol(symbol)?,
        parse_interval(interval)?,
    ))
}

fn store_error(e: crate::store::StoreError) -> ApiError {
    error!(error = %e, "Subscription store failure");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "subscription store unavailable")
}

/// List subscriptions, optionally filtered by chat
async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<SubscriptionQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions = state.store.list().await.map_err(store_error)?;
    let responses = subscriptions
        .into_iter()
        .filter(|s| params.chat_id.map_or(true, |id| s.key.chat_id == id))
        .map(Into::into)
        .collect();
    Ok(Json(responses))
}

/// Create a subscription; an existing one is returned untouched
async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<Response, ApiError> {
    let key = SubscriptionKey::new(request.chat_id, parse_symbol(&request.symbol)?, request.interval);

    if let Some(existing) = state.store.get(&key).await.map_err(store_error)? {
        return Ok((StatusCode::OK, Json(SubscriptionResponse::from(existing))).into_response());
    }

    let subscription = Subscription::new(key.clone());
    state
        .store
        .upsert(subscription.clone())
        .await
        .map_err(store_error)?;
    info!(subscription = %key, "Subscription created");

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(subscription))).into_response())
}

async fn get_subscription(
    State(state): State<AppState>,
    Path((chat_id, symbol, interval)): Path<(i64, String, String)>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let key = parse_key(chat_id, &symbol, &interval)?;
    let subscription = state
        .store
        .get(&key)
        .await
        .map_err(store_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("subscription {} not found", key)))?;
    Ok(Json(subscription.into()))
}

async fn delete_subscription(
    State(state): State<AppState>,
    Path((chat_id, symbol, interval)): Path<(i64, String, String)>,
) -> Result<StatusCode, ApiError> {
    let key = parse_key(chat_id, &symbol, &interval)?;
    if state.store.delete(&key).await.map_err(store_error)? {
        info!(subscription = %key, "Subscription deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("subscription {} not found", key),
        ))
    }
}

#[derive(Debug, Serialize)]
struct IndicatorResponse {
    symbol: String,
    interval: Interval,
    summary: String,
    indicators: IndicatorSnapshot,
}

/// Current indicators for a symbol and interval
async fn get_indicators(
    State(state): State<AppState>,
    Path((symbol, interval)): Path<(String, String)>,
) -> Result<Json<IndicatorResponse>, ApiError> {
    let symbol = parse_symbol(&symbol)?;
    let interval = parse_interval(&interval)?;
    let provider = state
        .market_data
        .as_ref()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, "market data not configured"))?;

    let candles = provider
        .get_candles(&symbol, interval, state.klines_limit)
        .await
        .map_err(|e| {
            error!(symbol = %symbol, interval = %interval, error = %e, "Failed to fetch candles");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let indicators = compute_indicators(&candles).map_err(|e| match e {
        IndicatorError::InsufficientData { .. } => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    })?;

    Ok(Json(IndicatorResponse {
        summary: indicators.summary(),
        symbol,
        interval,
        indicators,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/options", get(options))
        .route(
            "/api/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/api/subscriptions/{chat_id}/{symbol}/{interval}",
            get(get_subscription).delete(delete_subscription),
        )
        .route("/api/indicators/{symbol}/{interval}", get(get_indicators))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
