//! SRU backend access.
//!
//! - [`client`] - issues `searchRetrieve` calls against the SRU proxy
//! - [`response`] - parses `searchRetrieveResponse` bodies

pub mod client;
pub mod response;

pub use client::{SruClient, SruQuery};
pub use response::{
    BackendSearchResult, Diagnostic, RawRecord, RecordContent, XML_ESCAPING,
    parse_search_response,
};
