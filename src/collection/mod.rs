//! # Collection Engine
//!
//! Generic CRUD over tenant-scoped JSON document collections: an
//! orchestrator per configured entity, the collection envelope and the
//! classification of failures into outcomes.

pub mod classify;
pub mod entity;
pub mod envelope;
pub mod errors;
pub mod orchestrator;
pub mod outcome;
pub mod service;

pub use classify::{CallSite, ErrorClassifier};
pub use entity::{default_entities, EntityDescriptor};
pub use envelope::CollectionEnvelope;
pub use errors::{EngineError, EngineResult};
pub use orchestrator::EntityOrchestrator;
pub use outcome::{Outcome, ResultClass};
pub use service::{CollectionService, EntityService};
