//! Routing domain module
//!
//! This module turns a cluster snapshot into the set of alternative routing
//! tables a broker chooses from at query time. Data flows one way per
//! external view change:
//!
//! `grouper` -> `resolver` -> `eligibility` -> `scheduler` (once per table)
//!
//! and `builder` ties the steps together behind the [`RoutingTableBuilder`] port.

pub mod builder;
pub mod config;
pub mod eligibility;
pub mod entity;
mod error;
pub mod grouper;
pub mod ports;
pub mod resolver;
pub mod scheduler;

pub use builder::LowLevelConsumerRoutingTableBuilder;
pub use config::{BuilderConfig, RoutingSettings};
pub use eligibility::{EligibilitySnapshot, SegmentReplicas};
pub use entity::{RoutingTable, RoutingTableSet};
pub use error::{Result, RoutingError};
pub use ports::RoutingTableBuilder;
pub use resolver::ConsumingDecision;
