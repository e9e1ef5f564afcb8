//! Core application primitives (HTTP API, scheduler, worker runtime)

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::*;
pub use runtime::*;
pub use scheduler::*;
