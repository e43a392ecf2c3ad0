//! Request and response bodies

pub mod routing;
