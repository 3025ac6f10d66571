use crate::WorldContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const AIR_ITEM: &str = "minecraft:air";

/// Reward contents handed to a claiming actor.
///
/// The store never interprets a payload beyond emptiness; encoding and
/// decoding go through a [`PayloadCodec`] supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Payload {
    pub item: String,
    pub count: u32,
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}

impl Payload {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            components: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.trim().is_empty() || self.item == AIR_ITEM
    }

    /// The lossy `{item, count}` form written when full encoding fails.
    pub fn stub(&self) -> Self {
        Self::new(self.item.clone(), self.count)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        write!(f, "{}x {}", self.count, self.item)?;
        if let Some(name) = self.components.get("custom_name") {
            write!(f, " \"{}\"", name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("item {item} is not registered in world {world}")]
    UnknownItem { item: String, world: String },
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("payload is empty")]
    Empty,
}

/// Host-supplied (de)serializer for reward payloads. Materializing a payload
/// may need registries that only exist once a world is loaded, hence the
/// world context on both directions.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, payload: &Payload, world: &WorldContext) -> Result<String, PayloadError>;

    fn decode(&self, encoded: &str, world: &WorldContext) -> Result<Payload, PayloadError>;
}
