use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{self, CreateCollectionOptions, IndexOptions, UpdateOptions};
use mongodb::{Database, IndexModel};
use tracing::debug;

use crate::error::Result;
use crate::metrics::time_db_operation;
use crate::model::{IndexSpec, UpsertOutcome, ValidationLevel};
use crate::store::Store;

/// `Store` backed by a live MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Round-trips a `ping` so connection problems surface before any step runs.
    pub async fn ping(&self) -> Result<()> {
        time_db_operation("ping", "admin", self.db.run_command(doc! {"ping": 1}, None)).await?;
        Ok(())
    }
}

fn driver_level(level: ValidationLevel) -> options::ValidationLevel {
    match level {
        ValidationLevel::Strict => options::ValidationLevel::Strict,
        ValidationLevel::Moderate => options::ValidationLevel::Moderate,
    }
}

/// Single `update_many` that only touches documents missing at least one of
/// the fields, and only writes the fields they are missing. `$type` reports
/// `"missing"` for absent fields, so an explicit `null` is kept.
fn backfill_update(filter: &Document, defaults: &Document) -> (Document, Vec<Document>) {
    let missing_any: Vec<Document> = defaults
        .keys()
        .map(|field| doc! { field.as_str(): { "$exists": false } })
        .collect();
    let query = doc! { "$and": [filter.clone(), { "$or": missing_any }] };

    let mut set = Document::new();
    for (field, value) in defaults {
        set.insert(
            field.as_str(),
            doc! {
                "$cond": [
                    { "$eq": [{ "$type": format!("${}", field) }, "missing"] },
                    { "$literal": value.clone() },
                    format!("${}", field),
                ]
            },
        );
    }
    (query, vec![doc! { "$set": set }])
}

#[async_trait]
impl Store for MongoStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let names = time_db_operation(
            "list_collections",
            name,
            self.db.list_collection_names(doc! {"name": name}),
        )
        .await?;
        Ok(names.iter().any(|n| n == name))
    }

    async fn create_collection(
        &self,
        name: &str,
        validator: &Document,
        level: ValidationLevel,
    ) -> Result<()> {
        let options = CreateCollectionOptions::builder()
            .validator(validator.clone())
            .validation_level(driver_level(level))
            .build();
        time_db_operation("create_collection", name, self.db.create_collection(name, options))
            .await?;
        Ok(())
    }

    async fn modify_validator(
        &self,
        name: &str,
        validator: &Document,
        level: ValidationLevel,
    ) -> Result<()> {
        let command = doc! {
            "collMod": name,
            "validator": validator.clone(),
            "validationLevel": level.as_str(),
        };
        time_db_operation("coll_mod", name, self.db.run_command(command, None)).await?;
        Ok(())
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        let options = IndexOptions::builder()
            .name(index.name())
            .unique(index.unique)
            .build();
        let model = IndexModel::builder()
            .keys(index.keys.clone())
            .options(options)
            .build();
        let coll = self.db.collection::<Document>(collection);
        let created =
            time_db_operation("create_index", collection, coll.create_index(model, None)).await?;
        debug!(collection, index = %created.index_name, "Index ensured");
        Ok(())
    }

    async fn update_many_if_absent(
        &self,
        collection: &str,
        filter: &Document,
        defaults: &Document,
    ) -> Result<u64> {
        let coll = self.db.collection::<Document>(collection);
        let (query, pipeline) = backfill_update(filter, defaults);
        let result = time_db_operation(
            "update_many",
            collection,
            coll.update_many(query, pipeline, None),
        )
        .await?;
        debug!(collection, modified = result.modified_count, "Backfilled missing fields");
        Ok(result.modified_count)
    }

    async fn find_one(&self, collection: &str, filter: &Document) -> Result<Option<Document>> {
        let coll = self.db.collection::<Document>(collection);
        let found =
            time_db_operation("find_one", collection, coll.find_one(filter.clone(), None)).await?;
        Ok(found)
    }

    async fn upsert_on_insert(
        &self,
        collection: &str,
        match_key: &Document,
        payload: &Document,
    ) -> Result<UpsertOutcome> {
        let coll = self.db.collection::<Document>(collection);
        let options = UpdateOptions::builder().upsert(true).build();
        let result = time_db_operation(
            "upsert",
            collection,
            coll.update_one(
                match_key.clone(),
                doc! {"$setOnInsert": payload.clone()},
                options,
            ),
        )
        .await?;
        Ok(match result.upserted_id {
            Some(id) => UpsertOutcome::Inserted(id),
            None => UpsertOutcome::AlreadyPresent,
        })
    }
}
