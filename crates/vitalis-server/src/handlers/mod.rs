//! HTTP route handlers for the prediction server.

pub mod meta;
pub mod predict;
