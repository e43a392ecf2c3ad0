//! Cluster snapshot module
//!
//! This module models the inputs the routing layer consumes: segment names,
//! instance identifiers, replica states, the external view and the instance
//! configuration list.

pub mod entity;
pub mod ids;
pub mod segment_name;

pub use entity::{ExternalView, InstanceConfig, InstanceScope, ReplicaState};
pub use ids::{InstanceId, PartitionKey};
pub use segment_name::{ParseAnomaly, SegmentName};
