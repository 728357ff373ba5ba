//! Configuration/query protocol: the pure boundary between the transport
//! layer and the shared control state.
//!
//! Inbound, a request's key/value pairs become a typed, validated
//! [`config::ConfigDelta`] applied as one atomic batch. Outbound,
//! [`snapshot::snapshot_state`] copies the full state into a
//! field-complete serializable record. Both operations are total: invalid
//! or unknown input is clamped or ignored, never rejected.

pub mod config;
pub mod snapshot;

pub use config::{ConfigDelta, apply_config};
pub use snapshot::{StateSnapshot, snapshot_state};
