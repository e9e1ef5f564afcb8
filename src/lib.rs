//! Fractal and moving-average signal monitor.
//!
//! [`indicators`] derives a snapshot from a candle window, [`signals`]
//! classifies new signals against a per-subscription [`models::SignalCache`],
//! and the remaining modules fetch data, persist caches, schedule cycles and
//! deliver notifications.

pub mod config;
pub mod core;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod store;
