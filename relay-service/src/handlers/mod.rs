//! HTTP handlers for the relay service.

pub mod health;
pub mod metrics;
pub mod relay;
