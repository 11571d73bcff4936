//! Metrics collection and export for chatrank.
//!
//! This crate provides a unified metrics interface using the `metrics` crate facade.
//! When the `prometheus` feature is enabled, metrics are exported in Prometheus format.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chatrank_metrics::{activity, counter, gauge};
//!
//! counter!(activity::MESSAGES_RECORDED_TOTAL).increment(1);
//! gauge!(activity::GROUPS_ACTIVE).set(3.0);
//! ```
//!
//! # Features
//!
//! - `prometheus`: Enable Prometheus text export through [`MetricsHandle::render`]

mod definitions;
mod error;
mod recorder;

pub use {
    definitions::*,
    error::{Error, Result},
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
