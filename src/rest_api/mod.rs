//! # REST API Module
//!
//! HTTP surface over the collection engine. Request-level problems
//! (malformed paging, unparseable bodies) are rejected here; everything
//! else is an [`Outcome`](crate::collection::Outcome) rendered by
//! [`response`].

pub mod errors;
pub mod params;
pub mod response;
pub mod server;

pub use errors::{RestError, RestResult};
pub use params::{CollectionParams, DEFAULT_LIMIT, MAX_LIMIT};
pub use server::{build_router, RestServer, RouterOptions, DEFAULT_TENANT_HEADER};
