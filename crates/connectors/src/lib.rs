//! Data source connectors for the Quarry engine.
//!
//! A connector is a named, configured capability instance that turns a
//! [`quarry_common::models::QuerySpec`] plus source configuration into a
//! [`quarry_common::table::Table`]. Connectors are constructed fresh per
//! request from a configuration mapping, hold no state beyond it, and are
//! discarded after a single `query` call: no pooling, no caching, no retry.
pub mod sources;

pub use sources::Connector;
