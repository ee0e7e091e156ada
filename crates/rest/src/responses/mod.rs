//! Response documents for the search API.
//!
//! - [`ess_response`] - the `essResponse` XML document

pub mod ess_response;

pub use ess_response::{EssResponse, XML_CONTENT_TYPE};
