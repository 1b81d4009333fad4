// src/models/record.rs

//! Raw catalog records and the catalog mapping.
//!
//! The encyclopedia returns loosely shaped objects: the same concept may live
//! under several keys depending on endpoint and API revision. Every concept
//! gets exactly one accessor here that tries the known shapes in a fixed
//! order, so call sites never look up keys themselves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key carrying the ship identifier.
pub const ID_KEY: &str = "ship_id";

const NAME_KEYS: &[&str] = &["name", "localized_name", "ship_name"];
const TYPE_KEYS: &[&str] = &["type", "ship_type"];
const FLAT_PRICE_KEYS: &[&str] = &["price_credit", "price_gold"];

/// One ship entity as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRecord(Map<String, Value>);

impl CatalogRecord {
    /// Build a record from a JSON value, rejecting non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Identifier rendered as a string (numbers and strings accepted).
    pub fn ship_id(&self) -> Option<String> {
        match self.get(ID_KEY)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn has_ship_id(&self) -> bool {
        self.ship_id().is_some()
    }

    /// First non-empty of `name`, `localized_name`, `ship_name`.
    pub fn name(&self) -> Option<String> {
        first_string(self, NAME_KEYS)
    }

    /// `type`, then `ship_type`.
    pub fn ship_type(&self) -> Option<String> {
        first_string(self, TYPE_KEYS)
    }

    /// Tier from `tier`, or `level` when `tier` is absent.
    ///
    /// The raw value is coerced to an integer; the caller decides whether
    /// it lies in range.
    pub fn tier(&self) -> Option<i64> {
        let raw = match self.get("tier") {
            Some(Value::Null) | None => self.get("level")?,
            Some(value) => value,
        };
        coerce_int(raw)
    }

    /// Strict `is_premium == true`.
    pub fn is_premium(&self) -> bool {
        self.flag_is_true("is_premium")
    }

    /// Collectible or special ships sit outside the regular tree.
    pub fn is_collectible_or_special(&self) -> bool {
        self.get("is_collectible").is_some_and(is_truthy)
            || self.get("is_special").is_some_and(is_truthy)
    }

    /// Strict `is_researchable == true`.
    pub fn is_researchable(&self) -> bool {
        self.flag_is_true("is_researchable")
    }

    /// Whether any price field carries a strictly positive amount.
    ///
    /// `price` is consulted first and `prices` only when `price` is falsy.
    /// A mapping counts when any of its values is positive; scalar prices
    /// under those keys are ignored. Flat `price_credit` / `price_gold`
    /// are checked last.
    pub fn has_positive_price(&self) -> bool {
        let price = self
            .get("price")
            .filter(|v| is_truthy(v))
            .or_else(|| self.get("prices"));

        if let Some(Value::Object(amounts)) = price {
            if amounts.values().any(is_positive_number) {
                return true;
            }
        }

        FLAT_PRICE_KEYS
            .iter()
            .filter_map(|key| self.get(key))
            .any(is_positive_number)
    }

    /// Stamp the identifier when the record does not carry one.
    pub(crate) fn ensure_ship_id(&mut self, id: &str) {
        if !self.has_ship_id() {
            self.0.insert(ID_KEY.to_string(), Value::String(id.to_string()));
        }
    }

    fn flag_is_true(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }
}

impl From<Value> for CatalogRecord {
    fn from(value: Value) -> Self {
        Self::from_value(value).unwrap_or_default()
    }
}

/// The full set of fetched records keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, CatalogRecord>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogRecord> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Insert a record unless the identifier is already known.
    ///
    /// Returns `true` when the record was added.
    pub fn insert(&mut self, id: impl Into<String>, mut record: CatalogRecord) -> bool {
        let id = id.into();
        if self.0.contains_key(&id) {
            return false;
        }
        record.ensure_ship_id(&id);
        self.0.insert(id, record);
        true
    }

    /// Merge another page of records, keeping existing identifiers.
    pub fn merge(&mut self, records: impl IntoIterator<Item = (String, CatalogRecord)>) -> usize {
        records
            .into_iter()
            .map(|(id, record)| self.insert(id, record))
            .filter(|added| *added)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogRecord)> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl FromIterator<(String, CatalogRecord)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, CatalogRecord)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        catalog.merge(iter);
        catalog
    }
}

/// Truthiness of a loosely typed JSON value; absent and `null` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn is_positive_number(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
        _ => false,
    }
}

fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_string(record: &CatalogRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
