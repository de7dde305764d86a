//! # Collection Service
//!
//! Binds one orchestrator per configured entity to the tenant resolver and
//! the storage engine. Each call resolves the namespace from the tenant
//! token, asks the engine for a client and passes it to the orchestrator.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, Span};

use super::classify::ErrorClassifier;
use super::entity::EntityDescriptor;
use super::orchestrator::EntityOrchestrator;
use super::outcome::Outcome;
use crate::messages::MessageSource;
use crate::observability::entity_span;
use crate::query::QueryDescriptor;
use crate::storage::{StorageClient, StorageEngine};
use crate::tenant::TenantResolver;

/// The five operations of one entity, keyed by tenant token.
///
/// Tokens are raw header bytes; see [`TenantResolver::resolve`].
#[derive(Clone)]
pub struct EntityService {
    orchestrator: EntityOrchestrator,
    resolver: TenantResolver,
    engine: Arc<dyn StorageEngine>,
}

impl EntityService {
    pub fn entity(&self) -> &EntityDescriptor {
        self.orchestrator.entity()
    }

    /// Namespace-bound client and span for one call
    fn scope(&self, operation: &str, tenant: Option<impl AsRef<[u8]>>) -> (Arc<dyn StorageClient>, Span) {
        let namespace = self.resolver.resolve(tenant);
        let span = entity_span(operation, namespace.as_str(), &self.entity().table);
        (self.engine.client(&namespace), span)
    }

    pub async fn create(&self, tenant: Option<impl AsRef<[u8]>>, locale: &str, record: Value) -> Outcome {
        let (client, span) = self.scope("create", tenant);
        self.orchestrator.create(client.as_ref(), record, locale).instrument(span).await
    }

    pub async fn read_one(&self, tenant: Option<impl AsRef<[u8]>>, locale: &str, id: &str) -> Outcome {
        let (client, span) = self.scope("read_one", tenant);
        self.orchestrator.read_one(client.as_ref(), id, locale).instrument(span).await
    }

    pub async fn read_collection(
        &self,
        tenant: Option<impl AsRef<[u8]>>,
        locale: &str,
        descriptor: &QueryDescriptor,
    ) -> Outcome {
        let (client, span) = self.scope("read_collection", tenant);
        self.orchestrator
            .read_collection(client.as_ref(), descriptor, locale)
            .instrument(span)
            .await
    }

    pub async fn update(&self, tenant: Option<impl AsRef<[u8]>>, locale: &str, id: &str, record: Value) -> Outcome {
        let (client, span) = self.scope("update", tenant);
        self.orchestrator.update(client.as_ref(), id, record, locale).instrument(span).await
    }

    pub async fn delete(&self, tenant: Option<impl AsRef<[u8]>>, locale: &str, id: &str) -> Outcome {
        let (client, span) = self.scope("delete", tenant);
        self.orchestrator.delete(client.as_ref(), id, locale).instrument(span).await
    }
}

/// All configured entities over one storage engine
#[derive(Clone)]
pub struct CollectionService {
    entities: Vec<EntityService>,
}

impl CollectionService {
    pub fn new(
        entities: Vec<EntityDescriptor>,
        resolver: TenantResolver,
        engine: Arc<dyn StorageEngine>,
        messages: Arc<dyn MessageSource>,
    ) -> Self {
        let classifier = ErrorClassifier::new(messages);
        let entities = entities
            .into_iter()
            .map(|entity| EntityService {
                orchestrator: EntityOrchestrator::new(entity, classifier.clone()),
                resolver: resolver.clone(),
                engine: Arc::clone(&engine),
            })
            .collect();

        Self { entities }
    }

    pub fn entities(&self) -> &[EntityService] {
        &self.entities
    }

    /// Service for the entity stored in `table`
    pub fn entity(&self, table: &str) -> Option<&EntityService> {
        self.entities.iter().find(|e| e.entity().table == table)
    }
}
