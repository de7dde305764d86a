//! # Entity Orchestrator
//!
//! Sequences the storage calls behind the five entity operations. Each
//! operation issues at most one storage call and always yields exactly one
//! [`Outcome`]; nothing is retried.

use serde_json::Value;
use uuid::Uuid;

use super::classify::{CallSite, ErrorClassifier};
use super::entity::EntityDescriptor;
use super::envelope::CollectionEnvelope;
use super::errors::{EngineError, EngineResult};
use super::outcome::Outcome;
use crate::messages::MessageKey;
use crate::query::{translate, QueryDescriptor};
use crate::storage::{validate_key, StorageClient};

/// CRUD operations for one configured entity
#[derive(Clone)]
pub struct EntityOrchestrator {
    entity: EntityDescriptor,
    classifier: ErrorClassifier,
}

impl EntityOrchestrator {
    pub fn new(entity: EntityDescriptor, classifier: ErrorClassifier) -> Self {
        Self { entity, classifier }
    }

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    /// Persist a record, assigning a v4 id when it has none
    pub async fn create(&self, client: &dyn StorageClient, record: Value, locale: &str) -> Outcome {
        match self.try_create(client, record).await {
            Ok((record, id)) => {
                tracing::debug!(table = %self.entity.table, namespace = %client.namespace(), id = %id, "Record created");
                Outcome::Created {
                    location: self.entity.location(&id),
                    record,
                }
            }
            Err(err) => self.fail(client, &err, CallSite::Create, locale),
        }
    }

    async fn try_create(&self, client: &dyn StorageClient, mut record: Value) -> EngineResult<(Value, String)> {
        let body = record.as_object_mut().ok_or(EngineError::InvalidBody)?;
        let id = match body.get("id") {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) => id.clone(),
            Some(_) => return Err(EngineError::InvalidBody),
        };
        body.insert("id".to_string(), Value::String(id.clone()));

        let persisted = client.save(&self.entity.table, &id, &record).await?;
        if persisted != id {
            if let Some(body) = record.as_object_mut() {
                body.insert("id".to_string(), Value::String(persisted.clone()));
            }
        }
        Ok((record, persisted))
    }

    /// Point lookup by id
    pub async fn read_one(&self, client: &dyn StorageClient, id: &str, locale: &str) -> Outcome {
        let site = CallSite::ReadOne { id };
        match client.get_by_key(&self.entity.table, id).await {
            Ok(Some(record)) => Outcome::Success(record),
            Ok(None) => Outcome::NotFound(id.to_string()),
            Err(err) => self.fail(client, &EngineError::from(err), site, locale),
        }
    }

    /// One page of matching records with paging metadata
    pub async fn read_collection(
        &self,
        client: &dyn StorageClient,
        descriptor: &QueryDescriptor,
        locale: &str,
    ) -> Outcome {
        match self.try_read_collection(client, descriptor).await {
            Ok(envelope) => Outcome::Success(envelope.to_json(&self.entity.collection_key)),
            Err(err) => self.fail(client, &err, CallSite::ReadCollection, locale),
        }
    }

    async fn try_read_collection(
        &self,
        client: &dyn StorageClient,
        descriptor: &QueryDescriptor,
    ) -> EngineResult<CollectionEnvelope> {
        let filter = translate(&self.entity.table, descriptor)?;
        let page = client.query(&filter).await?;
        Ok(CollectionEnvelope::assemble(
            page.rows,
            page.total_records,
            descriptor.offset(),
        ))
    }

    /// Replace the record stored under `id`
    pub async fn update(&self, client: &dyn StorageClient, id: &str, record: Value, locale: &str) -> Outcome {
        match self.try_update(client, id, record).await {
            Ok(0) => Outcome::NotFound(self.classifier.message(locale, MessageKey::NoRecordsUpdated)),
            Ok(_) => Outcome::NoContent,
            Err(err) => self.fail(client, &err, CallSite::Update, locale),
        }
    }

    async fn try_update(&self, client: &dyn StorageClient, id: &str, mut record: Value) -> EngineResult<u64> {
        let body = record.as_object_mut().ok_or(EngineError::InvalidBody)?;
        if matches!(body.get("id"), None | Some(Value::Null)) {
            let filler = validate_key(id).unwrap_or_else(|_| id.to_string());
            body.insert("id".to_string(), Value::String(filler));
        }
        Ok(client.update(&self.entity.table, &record, id).await?)
    }

    /// Remove the record stored under `id`
    pub async fn delete(&self, client: &dyn StorageClient, id: &str, locale: &str) -> Outcome {
        match client.delete(&self.entity.table, id).await {
            Ok(()) => Outcome::NoContent,
            Err(err) => self.fail(client, &EngineError::from(err), CallSite::Delete, locale),
        }
    }

    fn fail(&self, client: &dyn StorageClient, err: &EngineError, site: CallSite<'_>, locale: &str) -> Outcome {
        let outcome = self.classifier.classify(err, site, locale);
        tracing::error!(
            table = %self.entity.table,
            namespace = %client.namespace(),
            operation = site.name(),
            status = outcome.class().status_code(),
            error = %err,
            "Entity operation failed"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::messages::{MessageSource, Messages};
    use crate::query::StorageFilter;
    use crate::storage::{MemoryStorage, QueryPage, StorageEngine, StorageError, StorageResult};
    use crate::tenant::{Namespace, TenantResolver};

    fn orchestrator() -> EntityOrchestrator {
        EntityOrchestrator::new(
            EntityDescriptor::new("phone_number", "/organization-storage/phone-numbers", "phoneNumbers"),
            ErrorClassifier::new(Arc::new(Messages::default())),
        )
    }

    fn memory_client() -> Arc<dyn StorageClient> {
        MemoryStorage::new().client(&TenantResolver::new("orgstore").resolve(Some("diku")))
    }

    /// Client whose every call fails with the same error
    struct FailingClient {
        namespace: Namespace,
        error: StorageError,
    }

    impl FailingClient {
        fn new(error: StorageError) -> Self {
            Self {
                namespace: TenantResolver::new("orgstore").resolve(Some("diku")),
                error,
            }
        }
    }

    #[async_trait]
    impl StorageClient for FailingClient {
        fn namespace(&self) -> &Namespace {
            &self.namespace
        }
        async fn query(&self, _filter: &StorageFilter) -> StorageResult<QueryPage> {
            Err(self.error.clone())
        }
        async fn get_by_key(&self, _table: &str, _id: &str) -> StorageResult<Option<Value>> {
            Err(self.error.clone())
        }
        async fn save(&self, _table: &str, _id: &str, _document: &Value) -> StorageResult<String> {
            Err(self.error.clone())
        }
        async fn update(&self, _table: &str, _document: &Value, _id: &str) -> StorageResult<u64> {
            Err(self.error.clone())
        }
        async fn delete(&self, _table: &str, _id: &str) -> StorageResult<()> {
            Err(self.error.clone())
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_location() {
        let client = memory_client();
        let outcome = orchestrator()
            .create(client.as_ref(), json!({"phoneNumber": "1978999999"}), "en")
            .await;

        let (record, location) = match outcome {
            Outcome::Created { record, location } => (record, location),
            other => panic!("expected Created, got {:?}", other),
        };
        let id = record["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(location, format!("/organization-storage/phone-numbers/{}", id));
    }

    #[tokio::test]
    async fn test_create_honors_supplied_id() {
        let client = memory_client();
        let id = Uuid::new_v4().to_string();
        let outcome = orchestrator()
            .create(client.as_ref(), json!({"id": id, "phoneNumber": "1"}), "en")
            .await;
        assert_eq!(outcome.payload().unwrap()["id"], json!(id));

        // Same id again is an upsert
        let again = orchestrator()
            .create(client.as_ref(), json!({"id": id, "phoneNumber": "2"}), "en")
            .await;
        assert!(matches!(again, Outcome::Created { .. }));
        let read = orchestrator().read_one(client.as_ref(), &id, "en").await;
        assert_eq!(read.payload().unwrap()["phoneNumber"], "2");
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let client = memory_client();
        let outcome = orchestrator().create(client.as_ref(), json!([1, 2]), "en").await;
        assert_eq!(outcome.class().status_code(), 400);
    }

    #[tokio::test]
    async fn test_create_with_invalid_id_surfaces_raw_message() {
        let client = memory_client();
        let outcome = orchestrator()
            .create(client.as_ref(), json!({"id": "nope"}), "en")
            .await;
        assert_eq!(
            outcome,
            Outcome::InternalError("invalid input syntax for type uuid: \"nope\"".to_string())
        );
    }

    #[tokio::test]
    async fn test_read_one_missing_and_malformed_are_not_found() {
        let client = memory_client();
        let missing = Uuid::new_v4().to_string();

        assert_eq!(
            orchestrator().read_one(client.as_ref(), &missing, "en").await,
            Outcome::NotFound(missing.clone())
        );
        assert_eq!(
            orchestrator().read_one(client.as_ref(), "1234", "en").await,
            Outcome::NotFound("1234".to_string())
        );
    }

    #[tokio::test]
    async fn test_read_one_storage_failure_is_localized() {
        let client = FailingClient::new(StorageError::Database("connection reset".into()));
        let outcome = orchestrator()
            .read_one(&client, &Uuid::new_v4().to_string(), "de")
            .await;
        assert_eq!(
            outcome,
            Outcome::InternalError(Messages::default().lookup("de", MessageKey::InternalServerError))
        );
    }

    #[tokio::test]
    async fn test_read_collection_envelope() {
        let client = memory_client();
        let o = orchestrator();
        for n in ["111", "222", "333"] {
            o.create(client.as_ref(), json!({"phoneNumber": n}), "en").await;
        }

        let outcome = o
            .read_collection(client.as_ref(), &QueryDescriptor::all(1, 1), "en")
            .await;
        let body = outcome.payload().unwrap();
        assert_eq!(body["totalRecords"], 3);
        assert_eq!(body["first"], 2);
        assert_eq!(body["last"], 2);
        assert_eq!(body["phoneNumbers"][0]["phoneNumber"], "222");
    }

    #[tokio::test]
    async fn test_read_collection_parse_error() {
        let client = memory_client();
        let outcome = orchestrator()
            .read_collection(client.as_ref(), &QueryDescriptor::new("phoneNumber=", 0, 10), "en")
            .await;
        assert_eq!(outcome.class().status_code(), 400);
        assert!(outcome.message().unwrap().starts_with("CQL parse error: "));
    }

    #[tokio::test]
    async fn test_read_collection_storage_failure() {
        let client = FailingClient::new(StorageError::Database("boom".into()));
        let outcome = orchestrator()
            .read_collection(&client, &QueryDescriptor::all(0, 10), "en")
            .await;
        assert_eq!(outcome.class().status_code(), 500);
        assert_ne!(outcome.message(), Some("database error: boom"));
    }

    #[tokio::test]
    async fn test_update_paths() {
        let client = memory_client();
        let o = orchestrator();
        let created = o.create(client.as_ref(), json!({"phoneNumber": "1"}), "en").await;
        let id = created.payload().unwrap()["id"].as_str().unwrap().to_string();

        assert_eq!(
            o.update(client.as_ref(), &id, json!({"phoneNumber": "2"}), "en").await,
            Outcome::NoContent
        );
        let read = o.read_one(client.as_ref(), &id, "en").await;
        assert_eq!(read.payload().unwrap(), &json!({"id": id, "phoneNumber": "2"}));

        let missing = Uuid::new_v4().to_string();
        assert_eq!(
            o.update(client.as_ref(), &missing, json!({}), "en").await,
            Outcome::NotFound("No records updated".to_string())
        );
        assert_eq!(
            o.update(client.as_ref(), "bad-id", json!({}), "en").await,
            Outcome::NotFound("No records updated".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_by_uppercase_id_keeps_canonical_id() {
        let client = memory_client();
        let o = orchestrator();
        let id = Uuid::new_v4().to_string();
        o.create(client.as_ref(), json!({"id": id.to_uppercase()}), "en").await;

        assert_eq!(
            o.update(client.as_ref(), &id.to_uppercase(), json!({"phoneNumber": "9"}), "en").await,
            Outcome::NoContent
        );
        let read = o.read_one(client.as_ref(), &id, "en").await;
        assert_eq!(read.payload().unwrap(), &json!({"id": id, "phoneNumber": "9"}));
    }

    #[tokio::test]
    async fn test_delete() {
        let client = memory_client();
        let o = orchestrator();
        let created = o.create(client.as_ref(), json!({}), "en").await;
        let id = created.payload().unwrap()["id"].as_str().unwrap().to_string();

        assert_eq!(o.delete(client.as_ref(), &id, "en").await, Outcome::NoContent);
        assert_eq!(o.read_one(client.as_ref(), &id, "en").await, Outcome::NotFound(id));

        let failing = FailingClient::new(StorageError::Database("locked".into()));
        assert_eq!(
            o.delete(&failing, &Uuid::new_v4().to_string(), "en").await,
            Outcome::InternalError("database error: locked".to_string())
        );
    }
}
