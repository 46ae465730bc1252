//! Core library for the `ratewave` CLI.
//!
//! `ratewave` drives HTTP traffic at a sustained target rate against one
//! endpoint and reports latency and error statistics. The engine picks a
//! pacing tier from the target rate ([`rate::TierPlan`]), dispatches
//! requests under a concurrency bound ([`rate::RateController`]), collects
//! every outcome ([`metrics::spawn_collector`]) and reduces them to a
//! [`domain::Summary`] ([`metrics::compute_summary`]).
pub mod app;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod rate;
pub mod shutdown;
pub mod shutdown_handlers;
