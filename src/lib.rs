//! # orgstore
//!
//! Tenant-scoped JSON document collections over HTTP.
//!
//! A request is resolved to a tenant namespace, collection reads translate
//! a CQL-style filter into a storage filter, the entity orchestrator runs a
//! single storage call and every result or failure becomes one
//! [`collection::Outcome`].

pub mod cli;
pub mod collection;
pub mod config;
pub mod messages;
pub mod observability;
pub mod query;
pub mod rest_api;
pub mod storage;
pub mod tenant;
