// src/value.rs
//! The result tree: the nested count/sum/submapping structure produced by one
//! metric dispatch, and the unit of all aggregation merging.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::ser::{Serialize, Serializer};

use crate::error::{Result, StatsError};

/// One node of a result tree.
///
/// Counts and sums are kept apart so integer tallies stay exact integers and
/// monetary totals stay arbitrary-precision decimals all the way to the
/// serialization boundary. Lists hold per-record detail and never merge
/// element-wise.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Count(u64),
    Sum(Decimal),
    Tree(BTreeMap<String, Value>),
    List(Vec<Value>),
}

impl Value {
    #[must_use]
    pub fn empty_tree() -> Self {
        Value::Tree(BTreeMap::new())
    }

    #[must_use]
    pub fn as_tree(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Tree(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key in a tree value; None for non-trees.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_tree().and_then(|map| map.get(key))
    }

    /// Returns true for a zero count, zero sum, or empty tree/list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Count(n) => *n == 0,
            Value::Sum(d) => d.is_zero(),
            Value::Tree(map) => map.is_empty(),
            Value::List(items) => items.is_empty(),
        }
    }

    /// Merges `other` into `self`, key-wise and recursively.
    ///
    /// Numbers add (a count meeting a sum widens to a sum), trees union their
    /// keys and recurse where both sides carry the key. Any other pairing is
    /// a shape mismatch: a data-integrity condition surfaced to the caller,
    /// never papered over.
    pub fn merge(&mut self, other: Value) -> Result<()> {
        match (&mut *self, other) {
            (Value::Count(a), Value::Count(b)) => {
                *a = a.checked_add(b).ok_or(StatsError::Overflow)?;
                Ok(())
            }
            (Value::Sum(a), Value::Sum(b)) => {
                *a = a.checked_add(b).ok_or(StatsError::Overflow)?;
                Ok(())
            }
            (Value::Count(a), Value::Sum(b)) => {
                let widened = Decimal::from(*a)
                    .checked_add(b)
                    .ok_or(StatsError::Overflow)?;
                *self = Value::Sum(widened);
                Ok(())
            }
            (Value::Sum(a), Value::Count(b)) => {
                *a = a
                    .checked_add(Decimal::from(b))
                    .ok_or(StatsError::Overflow)?;
                Ok(())
            }
            (Value::Tree(a), Value::Tree(b)) => {
                for (key, incoming) in b {
                    match a.get_mut(&key) {
                        Some(existing) => existing.merge(incoming).map_err(|err| match err {
                            StatsError::ShapeMismatch { .. } => {
                                StatsError::ShapeMismatch { key: key.clone() }
                            }
                            other => other,
                        })?,
                        None => {
                            let _ = a.insert(key, incoming);
                        }
                    }
                }
                Ok(())
            }
            _ => Err(StatsError::ShapeMismatch {
                key: "<value>".to_string(),
            }),
        }
    }

    /// Rebuilds a result tree from parsed JSON.
    ///
    /// Integer numbers become counts, fractional numbers become exact
    /// decimals (serde_json is compiled with `arbitrary_precision`, so the
    /// digits never pass through an f64). Strings are accepted only when they
    /// hold the decimal fallback encoding.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        match json {
            serde_json::Value::Number(n) => {
                if let Some(count) = n.as_u64() {
                    Ok(Value::Count(count))
                } else {
                    Ok(Value::Sum(parse_decimal(&n.to_string())?))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Sum(
                Decimal::from_str_exact(s).map_err(|_| StatsError::UnsupportedJson("string"))?,
            )),
            serde_json::Value::Object(map) => {
                let mut tree = BTreeMap::new();
                for (key, value) in map {
                    let _ = tree.insert(key.clone(), Value::from_json(value)?);
                }
                Ok(Value::Tree(tree))
            }
            serde_json::Value::Array(items) => Ok(Value::List(
                items.iter().map(Value::from_json).collect::<Result<_>>()?,
            )),
            serde_json::Value::Bool(_) => Err(StatsError::UnsupportedJson("bool")),
            serde_json::Value::Null => Err(StatsError::UnsupportedJson("null")),
        }
    }
}

fn parse_decimal(repr: &str) -> Result<Decimal> {
    Decimal::from_str_exact(repr)
        .or_else(|_| Decimal::from_scientific(repr))
        .map_err(|_| StatsError::UnsupportedJson("number"))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Count(n) => serializer.serialize_u64(*n),
            Value::Sum(d) => {
                // Decimals render from their exact digit string; the string
                // fallback only exists at this boundary, never during merge.
                let repr = d.normalize().to_string();
                match serde_json::Number::from_str(&repr) {
                    Ok(number) => number.serialize(serializer),
                    Err(_) => serializer.serialize_str(&repr),
                }
            }
            Value::Tree(map) => map.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

/// Writes any serializable value as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StatsError::from(e).with_path(parent))?;
    }
    let file = File::create(path).map_err(|e| StatsError::from(e).with_path(path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Reads a JSON file back into a result tree.
pub fn read_value(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| StatsError::from(e).with_path(path))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    Value::from_json(&json)
}
