//! Common types and configuration shared across Quarry crates.
//!
//! This crate contains the base building blocks for the Quarry system:
//! - **Tabular model**: ordered rows of named scalar columns (`table`).
//! - **Contracts**: query specification and request/response models (`models`).
//! - **Configuration**: environment-derived settings (`config`).
//! - **Telemetry**: tracing initialization for the binaries (`telemetry`).
pub mod config;
pub mod models;
pub mod table;
pub mod telemetry;
