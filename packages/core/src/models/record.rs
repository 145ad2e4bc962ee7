//! Value Records
//!
//! A value-record is the untyped input document handed to a save call:
//! field name → JSON value (scalar, array or nested record).

use crate::models::{SchemaNode, SchemaTree};
use serde_json::Value;
use std::collections::BTreeMap;

/// Untyped input document
pub type Record = serde_json::Map<String, Value>;

/// Flattened view of a record, keyed the same way as a flattened schema
pub type FlatRecord<'a> = BTreeMap<String, &'a Value>;

/// Null-or-absent check shared by resolution and validation
pub fn is_missing(value: Option<&Value>) -> bool {
    value.map_or(true, Value::is_null)
}

/// Flatten a record along the nested sub-schemas of `tree`
///
/// Only objects stored under a `Nested` schema node are descended into;
/// objects under `object`-typed fields stay whole. Keys lifted from a deeper
/// level overwrite shallower ones with the same name, mirroring
/// [`SchemaTree::flatten`].
pub fn flatten_record<'a>(record: &'a Record, tree: &SchemaTree) -> FlatRecord<'a> {
    let mut flat = FlatRecord::new();
    flatten_into(record, tree, &mut flat);
    flat
}

fn flatten_into<'a>(record: &'a Record, tree: &SchemaTree, flat: &mut FlatRecord<'a>) {
    for (key, value) in record {
        match (tree.get(key), value) {
            (Some(SchemaNode::Nested(sub)), Value::Object(inner)) => {
                flatten_into(inner, sub, flat);
            }
            _ => {
                flat.insert(key.clone(), value);
            }
        }
    }
}

/// Read the value at a nested key path
pub fn get_path<'a>(record: &'a Record, path: &[String]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = record;
    for key in parents {
        current = current.get(key)?.as_object()?;
    }
    current.get(last)
}

/// Write a value at a nested key path
///
/// Returns `false` (and writes nothing) when an intermediate level is not an
/// object.
pub fn set_path(record: &mut Record, path: &[String], value: Value) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    let mut current = record;
    for key in parents {
        match current.get_mut(key).and_then(Value::as_object_mut) {
            Some(next) => current = next,
            None => return false,
        }
    }
    current.insert(last.clone(), value);
    true
}
