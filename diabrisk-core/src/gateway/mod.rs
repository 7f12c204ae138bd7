//! HTTP gateway for diabrisk.
//!
//! A thin JSON surface over [`AppContext`](crate::context::AppContext): health,
//! model summary, dataset preview, form schema and prediction. Every handler
//! reads the shared context; nothing is mutated after startup.

pub mod api;
pub mod server;

pub use api::{ApiError, DatasetQuery, DatasetResponse, HealthResponse};
pub use server::{router, run};
