//! # Query Module
//!
//! CQL-style filter language: compiler, translator to storage filters, and
//! in-process document evaluation.

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod eval;
pub mod translator;

pub use ast::{Comparison, FieldPath, FilterProgram, Predicate, Relation, SortDirection, SortKey};
pub use compiler::compile;
pub use errors::{ParseError, QueryError, QueryResult};
pub use translator::{translate, validate_table_name, QueryDescriptor, StorageFilter};
