//! The idempotent building blocks every migration step is made of.

use mongodb::bson::{oid::ObjectId, Document};
use tracing::{info, warn};

use crate::error::{MigrationError, Result};
use crate::model::{BackfillSpec, CollectionSpec, IndexSpec, SeedOutcome, SeedSpec, UpsertOutcome, ValidationLevel};
use crate::store::Store;

use super::StepOutcome;

/// What has to happen to bring a collection to its declared validator.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction {
    Create { validator: Document, level: ValidationLevel },
    UpdateValidator { validator: Document, level: ValidationLevel },
}

/// Collections always end up at `moderate` validation, whether created or
/// updated, so documents written before the validator existed are not
/// rejected and a second run leaves the same state as the first.
pub fn reconcile(exists: bool, desired: &CollectionSpec) -> CollectionAction {
    if exists {
        CollectionAction::UpdateValidator {
            validator: desired.validator.clone(),
            level: ValidationLevel::Moderate,
        }
    } else {
        CollectionAction::Create {
            validator: desired.validator.clone(),
            level: ValidationLevel::Moderate,
        }
    }
}

pub async fn ensure_collection(store: &dyn Store, spec: &CollectionSpec) -> Result<CollectionAction> {
    spec.validate()?;
    let exists = store.collection_exists(&spec.name).await?;
    let action = reconcile(exists, spec);
    match &action {
        CollectionAction::Create { validator, level } => {
            info!(collection = %spec.name, level = level.as_str(), "Creating collection with validator");
            match store.create_collection(&spec.name, validator, *level).await {
                Ok(()) => {}
                // Lost a race with a concurrent run: fall through to an update.
                Err(err) if err.is_namespace_exists() => {
                    warn!(collection = %spec.name, "Collection appeared concurrently, updating validator");
                    let action = reconcile(true, spec);
                    apply_update(store, &spec.name, &action).await?;
                    return Ok(action);
                }
                Err(err) => return Err(err),
            }
        }
        CollectionAction::UpdateValidator { .. } => {
            info!(collection = %spec.name, "Updating validator");
            apply_update(store, &spec.name, &action).await?;
        }
    }
    Ok(action)
}

async fn apply_update(store: &dyn Store, name: &str, action: &CollectionAction) -> Result<()> {
    if let CollectionAction::UpdateValidator { validator, level } = action {
        store.modify_validator(name, validator, *level).await?;
    }
    Ok(())
}

pub async fn ensure_indexes(store: &dyn Store, collection: &str, indexes: &[IndexSpec]) -> Result<()> {
    for index in indexes {
        index.validate()?;
        info!(collection, index = %index.name(), unique = index.unique, "Ensuring index");
        store.create_index(collection, index).await?;
    }
    Ok(())
}

/// Validator plus indexes for one collection.
pub async fn apply_collection(store: &dyn Store, spec: &CollectionSpec) -> Result<StepOutcome> {
    let action = ensure_collection(store, spec).await?;
    ensure_indexes(store, &spec.name, &spec.indexes).await?;
    let what = match action {
        CollectionAction::Create { .. } => "created",
        CollectionAction::UpdateValidator { .. } => "validator updated",
    };
    Ok(StepOutcome::applied(format!(
        "{} {}, {} index(es) ensured",
        spec.name,
        what,
        spec.indexes.len()
    )))
}

pub async fn backfill(store: &dyn Store, spec: &BackfillSpec) -> Result<u64> {
    if spec.collection.trim().is_empty() {
        return Err(MigrationError::InvalidDeclaration("backfill collection name is empty".into()));
    }
    let modified = store
        .update_many_if_absent(&spec.collection, &spec.filter, &spec.defaults)
        .await?;
    info!(collection = %spec.collection, modified, "Added default fields to existing documents");
    Ok(modified)
}

pub async fn seed_if_absent(store: &dyn Store, spec: &SeedSpec) -> Result<SeedOutcome> {
    let mut resolved: Vec<ObjectId> = Vec::with_capacity(spec.prerequisites.len());
    let mut missing = Vec::new();
    for prerequisite in &spec.prerequisites {
        match store.find_one(&prerequisite.collection, &prerequisite.filter).await? {
            Some(found) => {
                let id = found.get_object_id("_id").map_err(|_| {
                    MigrationError::InvalidDeclaration(format!(
                        "{} has no ObjectId _id",
                        prerequisite.label
                    ))
                })?;
                resolved.push(id);
            }
            None => missing.push(prerequisite.label.clone()),
        }
    }
    if !missing.is_empty() {
        warn!(collection = %spec.collection, missing = ?missing, "Prerequisites not found, skipping seed");
        return Ok(SeedOutcome::Skipped { missing });
    }

    let payload = (spec.build_payload)(&resolved);
    match store.upsert_on_insert(&spec.collection, &spec.natural_key, &payload).await? {
        UpsertOutcome::Inserted(id) => {
            info!(collection = %spec.collection, key = %spec.natural_key, id = %id, "Seeded record");
            Ok(SeedOutcome::Inserted)
        }
        UpsertOutcome::AlreadyPresent => {
            info!(collection = %spec.collection, key = %spec.natural_key, "Seed record already present");
            Ok(SeedOutcome::AlreadyPresent)
        }
    }
}
