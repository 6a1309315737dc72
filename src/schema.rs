//! Desired state of the dollar_bill database.

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};

use crate::model::{BackfillSpec, CollectionSpec, IndexSpec, Prerequisite, SeedSpec};

pub const USERS: &str = "users";
pub const EXPENSES: &str = "expenses";
pub const GROUPS: &str = "groups";

pub const SAMPLE_GROUP: &str = "Roommates";
pub const SAMPLE_MEMBERS: [&str; 2] = ["arjun", "aditya"];

pub fn users() -> CollectionSpec {
    CollectionSpec {
        name: USERS.into(),
        validator: doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": ["username", "password_hash", "created_at"],
                "properties": {
                    "username":      { "bsonType": "string" },
                    "password_hash": { "bsonType": "string" },
                    "created_at":    { "bsonType": "date" }
                }
            }
        },
        indexes: vec![IndexSpec::ascending("username").unique()],
    }
}

pub fn expenses() -> CollectionSpec {
    CollectionSpec {
        name: EXPENSES.into(),
        validator: doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": ["user_id", "amount", "category", "date", "description"],
                "properties": {
                    "user_id":     { "bsonType": "objectId" },
                    "amount":      { "bsonType": ["double", "int", "decimal"] },
                    "category":    { "bsonType": "string" },
                    "date":        { "bsonType": "date" },
                    "description": { "bsonType": "string" },
                    "group_id":    { "bsonType": ["objectId", "null"] },
                    "payer_id":    { "bsonType": ["objectId", "null"] }
                }
            }
        },
        indexes: vec![
            IndexSpec::ascending("user_id"),
            IndexSpec::ascending("date"),
            IndexSpec::ascending("category"),
            IndexSpec::ascending("group_id"),
        ],
    }
}

pub fn groups() -> CollectionSpec {
    CollectionSpec {
        name: GROUPS.into(),
        validator: doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": ["name", "members", "created_at"],
                "properties": {
                    "name":       { "bsonType": "string" },
                    "members":    { "bsonType": "array", "items": { "bsonType": "objectId" } },
                    "created_at": { "bsonType": "date" }
                }
            }
        },
        indexes: vec![
            IndexSpec::ascending("name").unique(),
            IndexSpec::ascending("members"),
        ],
    }
}

/// Expenses written before group splitting existed get explicit nulls.
pub fn expense_split_backfill() -> BackfillSpec {
    BackfillSpec {
        collection: EXPENSES.into(),
        filter: doc! {},
        defaults: doc! { "group_id": null, "payer_id": null },
    }
}

pub fn roommates_seed() -> SeedSpec {
    SeedSpec {
        collection: GROUPS.into(),
        natural_key: doc! { "name": SAMPLE_GROUP },
        prerequisites: SAMPLE_MEMBERS
            .iter()
            .map(|username| Prerequisite {
                collection: USERS.into(),
                filter: doc! { "username": *username },
                label: format!("user '{}'", username),
            })
            .collect(),
        build_payload: roommates_payload,
    }
}

fn roommates_payload(members: &[ObjectId]) -> Document {
    doc! {
        "name": SAMPLE_GROUP,
        "members": members.to_vec(),
        "created_at": DateTime::now(),
    }
}
