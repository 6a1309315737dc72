//! Evaluates the `$jsonSchema` subset used by our collection validators:
//! `required`, `properties.<field>.bsonType` (single name or list) and
//! `items.bsonType` for arrays.

use mongodb::bson::{Bson, Document};

/// BSON type alias as used in `bsonType`.
fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        Bson::Boolean(_) => "bool",
        Bson::Null => "null",
        Bson::Int32(_) => "int",
        Bson::Int64(_) => "long",
        Bson::Decimal128(_) => "decimal",
        Bson::ObjectId(_) => "objectId",
        Bson::DateTime(_) => "date",
        Bson::Timestamp(_) => "timestamp",
        Bson::Binary(_) => "binData",
        Bson::RegularExpression(_) => "regex",
        _ => "unknown",
    }
}

fn type_matches(value: &Bson, expected: &Bson) -> bool {
    let actual = type_name(value);
    match expected {
        Bson::String(name) => name == actual || (name == "number" && is_number(value)),
        Bson::Array(names) => names.iter().any(|n| type_matches(value, n)),
        _ => false,
    }
}

fn is_number(value: &Bson) -> bool {
    matches!(
        value,
        Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_)
    )
}

/// Checks `document` against a validator of the form `{ $jsonSchema: {...} }`.
/// Returns the list of violations; empty means the document conforms.
/// Validators without `$jsonSchema` accept everything.
pub fn violations(validator: &Document, document: &Document) -> Vec<String> {
    match validator.get_document("$jsonSchema") {
        Ok(schema) => check_object(schema, document, ""),
        Err(_) => Vec::new(),
    }
}

pub fn conforms(validator: &Document, document: &Document) -> bool {
    violations(validator, document).is_empty()
}

fn check_object(schema: &Document, document: &Document, path: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Ok(required) = schema.get_array("required") {
        for field in required.iter().filter_map(Bson::as_str) {
            if !document.contains_key(field) {
                out.push(format!("missing required field '{}{}'", path, field));
            }
        }
    }
    if let Ok(properties) = schema.get_document("properties") {
        for (field, rule) in properties {
            let (Some(value), Bson::Document(rule)) = (document.get(field), rule) else {
                continue;
            };
            out.extend(check_value(rule, value, &format!("{}{}", path, field)));
        }
    }
    out
}

fn check_value(rule: &Document, value: &Bson, path: &str) -> Vec<String> {
    if let Some(expected) = rule.get("bsonType") {
        if !type_matches(value, expected) {
            return vec![format!(
                "field '{}' has type {}, expected {}",
                path,
                type_name(value),
                expected
            )];
        }
    }
    let mut out = Vec::new();
    if let (Bson::Array(items), Ok(item_rule)) = (value, rule.get_document("items")) {
        for (i, item) in items.iter().enumerate() {
            out.extend(check_value(item_rule, item, &format!("{}.{}", path, i)));
        }
    }
    if let Bson::Document(inner) = value {
        out.extend(check_object(rule, inner, &format!("{}.", path)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};

    fn groups_validator() -> Document {
        doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": ["name", "members"],
                "properties": {
                    "name": { "bsonType": "string" },
                    "members": { "bsonType": "array", "items": { "bsonType": "objectId" } },
                    "payer_id": { "bsonType": ["objectId", "null"] }
                }
            }
        }
    }

    #[test]
    fn test_conforming_document() {
        let d = doc! { "name": "Roommates", "members": [ObjectId::new()], "created_at": DateTime::now() };
        assert!(conforms(&groups_validator(), &d));
    }

    #[test]
    fn test_missing_required_field() {
        let v = violations(&groups_validator(), &doc! { "name": "x" });
        assert_eq!(v, vec!["missing required field 'members'".to_string()]);
    }

    #[test]
    fn test_array_item_types_are_checked() {
        let d = doc! { "name": "x", "members": [ObjectId::new(), "arjun"] };
        let v = violations(&groups_validator(), &d);
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("members.1"));
    }

    #[test]
    fn test_type_alternatives() {
        let v = groups_validator();
        assert!(conforms(&v, &doc! { "name": "x", "members": [], "payer_id": null }));
        assert!(conforms(&v, &doc! { "name": "x", "members": [], "payer_id": ObjectId::new() }));
        assert!(!conforms(&v, &doc! { "name": "x", "members": [], "payer_id": "someone" }));
    }

    #[test]
    fn test_validator_without_json_schema_accepts_anything() {
        assert!(conforms(&doc! {}, &doc! { "anything": 1 }));
    }
}
