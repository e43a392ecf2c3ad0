//! HTTP handlers

pub mod routing;
