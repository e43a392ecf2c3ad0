//! Broker errors

use thiserror::Error;
use zuklink_domain::routing::RoutingError;

/// Errors returned by the routing service
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Building routing tables failed
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// No routing state exists for the table
    #[error("No routing tables for table '{0}'")]
    UnknownTable(String),
}

/// Result type alias for broker operations
pub type Result<T> = std::result::Result<T, BrokerError>;
