//! # ZukLink Domain Layer
//!
//! This crate contains the pure business logic and domain models used by
//! ZukLink brokers to route queries over streaming segments. It follows
//! hexagonal architecture principles:
//!
//! - **Entities**: Cluster snapshot (external view, instance configs) and routing tables
//! - **Ports**: Trait definitions for pluggable strategies (RoutingTableBuilder)
//! - **Services**: The routing table construction pipeline
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (cluster
//! managers, HTTP, storage). The external view and instance list arrive
//! already materialized; routing tables are returned as immutable values.
//!
//! ## Example
//!
//! ```rust
//! use zuklink_domain::cluster::{ExternalView, InstanceConfig};
//! use zuklink_domain::routing::{LowLevelConsumerRoutingTableBuilder, RoutingTableBuilder};
//!
//! let mut view = ExternalView::new("events_REALTIME");
//! view.set_state("events_REALTIME__0__0__20160101T0000Z", "Server_1", "ONLINE");
//! view.set_state("events_REALTIME__0__1__20160101T0000Z", "Server_1", "CONSUMING");
//!
//! let builder = LowLevelConsumerRoutingTableBuilder::new();
//! let tables = builder
//!     .compute_routing_tables(&view, &[InstanceConfig::new("Server_1")])
//!     .unwrap();
//!
//! assert_eq!(tables.len(), 10);
//! assert_eq!(tables.tables()[0].segment_count(), 2);
//! ```

pub mod cluster;
pub mod routing;

// Re-export commonly used types
pub use cluster::{ExternalView, InstanceConfig, InstanceId, ReplicaState, SegmentName};
pub use routing::{
    BuilderConfig, LowLevelConsumerRoutingTableBuilder, RoutingError, RoutingTable,
    RoutingTableBuilder, RoutingTableSet,
};
