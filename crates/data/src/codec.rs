//! Reward document shapes.
//!
//! The current layout nests entries by category:
//! `{ "<category>": { "<world>|<x>|<y>|<z>": { ..record.. } } }`.
//! Two older layouts are still read: a flat map of location key to record,
//! and a `{ "categories": [..], "entries": { .. } }` wrapper. Every save
//! writes the nested layout.

use glint_core::{
    ActorId, Location, Payload, PayloadCodec, RewardRecord, RewardTable, WorldResolver,
    DEFAULT_CATEGORY,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// `rewardItem` as it appears on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPayload {
    Encoded { nbt: String },
    Stack { item: String, count: u32 },
    Empty { empty: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub dimension: String,
    pub position: Position,
    pub reward_item: StoredPayload,
    #[serde(default)]
    pub claimed_players: Vec<String>,
    /// Only present in flat legacy documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl StoredRecord {
    pub fn location(&self) -> Location {
        Location::new(
            self.dimension.clone(),
            self.position.x,
            self.position.y,
            self.position.z,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentShape {
    #[default]
    Nested,
    Flat,
    Wrapper,
}

/// One persisted entry, not yet materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub key: String,
    pub category: String,
    pub value: Value,
}

#[derive(Debug, Default)]
pub struct SniffedDocument {
    pub shape: DocumentShape,
    pub categories: Vec<String>,
    pub entries: Vec<RawEntry>,
    pub warnings: Vec<String>,
}

/// Splits a parsed document into raw entries. The layout is decided per
/// top-level value: an object under a location key or carrying a record
/// field is a flat record, any other object is a category bucket.
pub fn read_document(root: Value) -> SniffedDocument {
    let mut doc = SniffedDocument::default();
    let Value::Object(mut root) = root else {
        doc.warnings
            .push("reward document is not a JSON object".to_string());
        return doc;
    };
    if is_wrapper(&root) {
        doc.shape = DocumentShape::Wrapper;
        if let Some(Value::Array(names)) = root.remove("categories") {
            for name in names {
                match name {
                    Value::String(name) => doc.categories.push(name),
                    other => doc
                        .warnings
                        .push(format!("ignoring non-string category name {other}")),
                }
            }
        }
        if let Some(Value::Object(entries)) = root.remove("entries") {
            doc.read_level(entries);
        }
        return doc;
    }
    doc.read_level(root);
    doc
}

fn is_wrapper(root: &Map<String, Value>) -> bool {
    matches!(root.get("entries"), Some(Value::Object(_)))
        && root
            .keys()
            .all(|key| key == "entries" || key == "categories")
}

const RECORD_FIELDS: [&str; 4] = ["dimension", "position", "rewardItem", "claimedPlayers"];

/// A value keyed by a location key, or carrying any record field, is one
/// record even when it is missing required fields.
fn looks_like_record(key: &str, fields: &Map<String, Value>) -> bool {
    Location::parse_key(key).is_ok()
        || RECORD_FIELDS
            .iter()
            .any(|field| fields.contains_key(*field))
}

impl SniffedDocument {
    fn read_level(&mut self, level: Map<String, Value>) {
        for (key, value) in level {
            match value {
                Value::Object(fields) if looks_like_record(&key, &fields) => {
                    if self.shape == DocumentShape::Nested {
                        self.shape = DocumentShape::Flat;
                    }
                    let category = fields
                        .get("category")
                        .and_then(Value::as_str)
                        .unwrap_or(DEFAULT_CATEGORY)
                        .to_string();
                    self.entries.push(RawEntry {
                        key,
                        category,
                        value: Value::Object(fields),
                    });
                }
                Value::Object(bucket) => {
                    for (entry_key, entry) in bucket {
                        self.entries.push(RawEntry {
                            key: entry_key,
                            category: key.clone(),
                            value: entry,
                        });
                    }
                    self.categories.push(key);
                }
                other => self.warnings.push(format!(
                    "skipping {key}: expected an object, found {}",
                    kind(&other)
                )),
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Materializes one entry. The error is the warning line to report.
pub fn decode_entry(
    entry: &RawEntry,
    worlds: &dyn WorldResolver,
    codec: &dyn PayloadCodec,
) -> Result<RewardRecord, String> {
    let stored: StoredRecord = serde_json::from_value(entry.value.clone())
        .map_err(|err| format!("skipping entry {}: {err}", entry.key))?;
    let Some(world) = worlds.resolve_world(&stored.dimension) else {
        return Err(format!(
            "skipping entry {}: unknown world {}",
            entry.key, stored.dimension
        ));
    };
    let payload = match &stored.reward_item {
        StoredPayload::Encoded { nbt } => codec
            .decode(nbt, &world)
            .map_err(|err| format!("skipping entry {}: {err}", entry.key))?,
        StoredPayload::Stack { item, count } => Payload::new(item.clone(), *count),
        StoredPayload::Empty { .. } => Payload::empty(),
    };
    let location = stored.location();
    let claimants = stored.claimed_players.into_iter().map(ActorId::from);
    Ok(RewardRecord::in_category(location, payload, entry.category.clone()).with_claimants(claimants))
}

fn encode_payload(
    record: &RewardRecord,
    worlds: Option<&dyn WorldResolver>,
    codec: &dyn PayloadCodec,
) -> StoredPayload {
    let payload = record.payload();
    if payload.is_empty() {
        return StoredPayload::Empty { empty: true };
    }
    let world = worlds.and_then(|worlds| worlds.resolve_world(&record.location().world));
    let encoded = match &world {
        Some(world) => codec.encode(payload, world).map_err(|err| err.to_string()),
        None => Err(format!("world {} is not loaded", record.location().world)),
    };
    match encoded {
        Ok(nbt) => StoredPayload::Encoded { nbt },
        Err(reason) => {
            warn!(
                target: "glint::data",
                location = %record.location(),
                %reason,
                "payload encoding failed, writing item stub"
            );
            let stub = payload.stub();
            StoredPayload::Stack {
                item: stub.item,
                count: stub.count,
            }
        }
    }
}

pub fn encode_record(
    record: &RewardRecord,
    worlds: Option<&dyn WorldResolver>,
    codec: &dyn PayloadCodec,
) -> StoredRecord {
    let location = record.location();
    StoredRecord {
        dimension: location.world.clone(),
        position: Position {
            x: location.x,
            y: location.y,
            z: location.z,
        },
        reward_item: encode_payload(record, worlds, codec),
        claimed_players: record
            .claimants()
            .iter()
            .map(|actor| actor.as_str().to_string())
            .collect(),
        category: None,
    }
}

/// Builds the nested document for `table`. Every known category gets a
/// bucket, even an empty one. Deferred entries are written back unchanged
/// unless a live record now owns their key.
pub fn write_document(
    table: &RewardTable,
    deferred: &[RawEntry],
    worlds: Option<&dyn WorldResolver>,
    codec: &dyn PayloadCodec,
) -> Result<Value, serde_json::Error> {
    let mut buckets: BTreeMap<String, Map<String, Value>> = table
        .categories()
        .iter()
        .map(|name| (name.to_string(), Map::new()))
        .collect();
    for record in table.sorted() {
        let stored = encode_record(record, worlds, codec);
        buckets
            .entry(record.category().to_string())
            .or_default()
            .insert(record.location().key(), serde_json::to_value(stored)?);
    }
    for entry in deferred {
        let bucket = buckets.entry(entry.category.clone()).or_default();
        if !bucket.contains_key(&entry.key) {
            let mut value = entry.value.clone();
            if let Value::Object(fields) = &mut value {
                fields.remove("category");
            }
            bucket.insert(entry.key.clone(), value);
        }
    }
    Ok(Value::Object(
        buckets
            .into_iter()
            .map(|(name, bucket)| (name, Value::Object(bucket)))
            .collect(),
    ))
}
