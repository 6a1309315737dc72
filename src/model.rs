//! Declarative descriptions of the desired database state.
//!
//! These values are built once at startup and handed to the migration
//! operations; nothing here talks to a store.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::Serialize;

use crate::error::{MigrationError, Result};

/// How strictly a collection validator is applied to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Every insert and update is checked.
    #[cfg_attr(not(test), allow(dead_code))]
    Strict,
    /// Inserts and updates to already-valid documents are checked; existing
    /// non-conforming documents are left alone.
    Moderate,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Strict => "strict",
            ValidationLevel::Moderate => "moderate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    /// Ordered field -> direction (1 or -1).
    pub keys: Document,
    pub unique: bool,
}

impl IndexSpec {
    pub fn ascending(field: &str) -> Self {
        let mut keys = Document::new();
        keys.insert(field, 1_i32);
        IndexSpec { keys, unique: false }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Default server-side index name, e.g. `username_1` or `a_1_b_-1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, dir)| format!("{}_{}", field, direction(dir)))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(MigrationError::InvalidDeclaration("index has no key fields".into()));
        }
        Ok(())
    }
}

fn direction(value: &Bson) -> String {
    match value {
        Bson::Int32(v) => v.to_string(),
        Bson::Int64(v) => v.to_string(),
        Bson::Double(v) => (*v as i64).to_string(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub name: String,
    /// `{ $jsonSchema: ... }` validator document.
    pub validator: Document,
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MigrationError::InvalidDeclaration("collection name is empty".into()));
        }
        for index in &self.indexes {
            index.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BackfillSpec {
    pub collection: String,
    pub filter: Document,
    /// Fields set only on documents where they are absent.
    pub defaults: Document,
}

/// A record that must exist before a seed can be inserted.
#[derive(Debug, Clone)]
pub struct Prerequisite {
    pub collection: String,
    pub filter: Document,
    /// Human-readable name used when reporting a skip.
    pub label: String,
}

#[derive(Clone)]
pub struct SeedSpec {
    pub collection: String,
    pub natural_key: Document,
    pub prerequisites: Vec<Prerequisite>,
    /// Builds the insert-only payload from the resolved prerequisite ids,
    /// in the same order as `prerequisites`.
    pub build_payload: fn(&[ObjectId]) -> Document,
}

impl std::fmt::Debug for SeedSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedSpec")
            .field("collection", &self.collection)
            .field("natural_key", &self.natural_key)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted(Bson),
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedOutcome {
    Inserted,
    AlreadyPresent,
    Skipped { missing: Vec<String> },
}
