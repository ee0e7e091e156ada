//! HTTP request handlers.
//!
//! - [`search`] - RPN and CQL search
//! - [`health`] - Health check endpoints

pub mod health;
pub mod search;

pub use health::{health_handler, liveness_handler};
pub use search::{cql_search_handler, rpn_search_handler};
