//! DTOs for routing endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use zuklink_domain::cluster::{ExternalView, InstanceConfig, InstanceId};
use zuklink_domain::routing::RoutingTableSet;

/// Request body for an external view change
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExternalViewChangeRequest {
    /// Segment name -> instance -> replica state (ONLINE, CONSUMING, ERROR, ...)
    #[schema(example = json!({
        "events_REALTIME__0__0__20160101T0000Z": { "Server_1": "ONLINE", "Server_2": "ONLINE" },
        "events_REALTIME__0__1__20160101T0600Z": { "Server_1": "CONSUMING", "Server_2": "CONSUMING" }
    }))]
    #[serde(default)]
    pub segments: BTreeMap<String, BTreeMap<String, String>>,
    /// Instances currently in the serving cluster
    #[serde(default)]
    pub instances: Vec<InstanceConfigDto>,
}

impl ExternalViewChangeRequest {
    /// Convert into the domain snapshot for `table_name`
    pub fn into_domain(self, table_name: &str) -> (ExternalView, Vec<InstanceConfig>) {
        let segments = self
            .segments
            .into_iter()
            .map(|(segment, states)| {
                let states = states
                    .into_iter()
                    .map(|(instance, state)| (InstanceId::from(instance), state))
                    .collect();
                (segment, states)
            })
            .collect();

        let instances = self
            .instances
            .into_iter()
            .map(|instance| InstanceConfig {
                instance_id: InstanceId::from(instance.instance_id),
                enabled: instance.enabled,
            })
            .collect();

        (ExternalView::from_parts(table_name, segments), instances)
    }
}

/// One instance of the serving cluster
#[derive(Debug, Deserialize, ToSchema)]
pub struct InstanceConfigDto {
    #[schema(example = "Server_1")]
    pub instance_id: String,
    /// Disabled instances never receive queries (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Response body after routing tables were rebuilt
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoutingBuildResponse {
    #[schema(example = "events_REALTIME")]
    pub table_name: String,
    /// Number of alternative routing tables generated
    #[schema(example = 10)]
    pub table_count: usize,
    /// Segments routed in each table
    #[schema(example = 2)]
    pub routed_segments: usize,
    /// Segments with no eligible replica, absent from every table
    pub unassignable_segments: Vec<String>,
}

impl From<&RoutingTableSet> for RoutingBuildResponse {
    fn from(set: &RoutingTableSet) -> Self {
        Self {
            table_name: set.table_name().to_string(),
            table_count: set.len(),
            routed_segments: set.get(0).map(|table| table.segment_count()).unwrap_or(0),
            unassignable_segments: set.unassignable_segments().to_vec(),
        }
    }
}

/// Current routing tables of a table
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoutingTablesResponse {
    #[schema(example = "events_REALTIME")]
    pub table_name: String,
    /// One map per routing table: instance -> segments it serves
    pub tables: Vec<BTreeMap<String, Vec<String>>>,
    pub unassignable_segments: Vec<String>,
}

impl From<&RoutingTableSet> for RoutingTablesResponse {
    fn from(set: &RoutingTableSet) -> Self {
        Self {
            table_name: set.table_name().to_string(),
            tables: set
                .tables()
                .iter()
                .map(|table| {
                    table
                        .iter()
                        .map(|(instance, segments)| {
                            (instance.to_string(), segments.iter().cloned().collect())
                        })
                        .collect()
                })
                .collect(),
            unassignable_segments: set.unassignable_segments().to_vec(),
        }
    }
}

/// Tables that currently have routing tables
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TableListResponse {
    #[schema(example = json!(["clicks_REALTIME", "events_REALTIME"]))]
    pub tables: Vec<String>,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "No routing tables for table 'events_REALTIME'")]
    pub error: String,
}
