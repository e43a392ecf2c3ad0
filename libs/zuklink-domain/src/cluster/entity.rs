//! Cluster snapshot entities
//!
//! The external view and the instance configuration list are produced by the
//! cluster manager and handed to the routing layer fully materialized. Nothing
//! in this crate mutates them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::cluster::ids::InstanceId;

/// State of one replica of a segment, as reported in the external view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicaState {
    /// Sealed and fully queryable
    Online,
    /// Still being ingested by the partition's active consumer
    Consuming,
    Error,
    Offline,
    Dropped,
    /// Any state string this broker does not recognize
    Unknown,
}

impl ReplicaState {
    /// Parse a state string case-insensitively. Never fails: unrecognized
    /// strings map to [`ReplicaState::Unknown`], which is never routable.
    pub fn parse(state: &str) -> Self {
        match state.trim().to_ascii_uppercase().as_str() {
            "ONLINE" => Self::Online,
            "CONSUMING" => Self::Consuming,
            "ERROR" => Self::Error,
            "OFFLINE" => Self::Offline,
            "DROPPED" => Self::Dropped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Consuming => "CONSUMING",
            Self::Error => "ERROR",
            Self::Offline => "OFFLINE",
            Self::Dropped => "DROPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for ReplicaState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Snapshot of which instance holds which segment in which state, for one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalView {
    table_name: String,
    /// segment name -> instance -> raw state string
    #[serde(default)]
    segments: BTreeMap<String, BTreeMap<InstanceId, String>>,
}

impl ExternalView {
    /// Create an empty external view for a table
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            segments: BTreeMap::new(),
        }
    }

    /// Create an external view from an already-built state map
    pub fn from_parts(
        table_name: impl Into<String>,
        segments: BTreeMap<String, BTreeMap<InstanceId, String>>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            segments,
        }
    }

    /// Record the state of one replica, replacing any previous state
    pub fn set_state(
        &mut self,
        segment: impl Into<String>,
        instance: impl Into<InstanceId>,
        state: impl Into<String>,
    ) {
        self.segments
            .entry(segment.into())
            .or_default()
            .insert(instance.into(), state.into());
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Every segment name known to the view, in lexicographic order
    pub fn segment_names(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }

    /// Per-instance raw states for a segment; `None` if the view does not know it
    pub fn state_map(&self, segment: &str) -> Option<&BTreeMap<InstanceId, String>> {
        self.segments.get(segment)
    }

    /// Per-instance parsed states for a segment; empty if the view does not know it
    pub fn replica_states<'a>(
        &'a self,
        segment: &str,
    ) -> impl Iterator<Item = (&'a InstanceId, ReplicaState)> + 'a {
        self.segments
            .get(segment)
            .into_iter()
            .flat_map(|states| states.iter())
            .map(|(instance, state)| (instance, ReplicaState::parse(state)))
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Configuration of one instance in the serving cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub instance_id: InstanceId,
    /// Disabled instances keep their replicas but must not receive queries
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl InstanceConfig {
    /// Create an enabled instance config
    pub fn new(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            enabled: true,
        }
    }

    /// Create a disabled instance config
    pub fn disabled(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            enabled: false,
        }
    }
}

/// Set of instances allowed to serve queries in this build cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceScope {
    serving: BTreeSet<InstanceId>,
}

impl InstanceScope {
    /// Build the scope from the instance configuration list, keeping enabled instances only
    pub fn from_configs(configs: &[InstanceConfig]) -> Self {
        Self {
            serving: configs
                .iter()
                .filter(|config| config.enabled)
                .map(|config| config.instance_id.clone())
                .collect(),
        }
    }

    pub fn contains(&self, instance: &InstanceId) -> bool {
        self.serving.contains(instance)
    }

    pub fn len(&self) -> usize {
        self.serving.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serving.is_empty()
    }
}
