// Command surface the migrations need from a document store
use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::Result;
use crate::model::{IndexSpec, UpsertOutcome, ValidationLevel};

pub mod mongo;

pub use mongo::MongoStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Creates `name` with `validator` attached at `level`. Fails with a
    /// conflict (`NAMESPACE_EXISTS`) if the collection is already there.
    async fn create_collection(
        &self,
        name: &str,
        validator: &Document,
        level: ValidationLevel,
    ) -> Result<()>;

    async fn modify_validator(
        &self,
        name: &str,
        validator: &Document,
        level: ValidationLevel,
    ) -> Result<()>;

    /// Identical re-creation is a no-op; same name with different keys or
    /// options is a conflict.
    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()>;

    /// Sets each field of `defaults` on documents matching `filter` that do
    /// not have that field yet. Returns the number of modified documents;
    /// a document gaining several fields counts once.
    async fn update_many_if_absent(
        &self,
        collection: &str,
        filter: &Document,
        defaults: &Document,
    ) -> Result<u64>;

    async fn find_one(&self, collection: &str, filter: &Document) -> Result<Option<Document>>;

    /// Inserts `payload` (together with `match_key`) unless a document
    /// matching `match_key` already exists. Never modifies an existing one.
    async fn upsert_on_insert(
        &self,
        collection: &str,
        match_key: &Document,
        payload: &Document,
    ) -> Result<UpsertOutcome>;
}
