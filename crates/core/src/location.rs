use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const KEY_SEPARATOR: char = '|';

/// A block position inside a named world. Used as the unique key of a reward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationKeyError {
    #[error("location key {0:?} must have the form world|x|y|z")]
    Shape(String),
    #[error("location key {key:?} has a non-integer coordinate {value:?}")]
    Coordinate { key: String, value: String },
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Deterministic storage key, `world|x|y|z`.
    pub fn key(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.world,
            self.x,
            self.y,
            self.z,
            sep = KEY_SEPARATOR
        )
    }

    /// Inverse of [`Location::key`]. Coordinates are taken from the right so a
    /// world id may itself contain the separator.
    pub fn parse_key(key: &str) -> Result<Self, LocationKeyError> {
        let mut parts = key.rsplitn(4, KEY_SEPARATOR);
        let z = parts.next();
        let y = parts.next();
        let x = parts.next();
        let world = parts.next();
        let (Some(world), Some(x), Some(y), Some(z)) = (world, x, y, z) else {
            return Err(LocationKeyError::Shape(key.to_string()));
        };
        if world.is_empty() {
            return Err(LocationKeyError::Shape(key.to_string()));
        }
        let coord = |value: &str| {
            value
                .trim()
                .parse::<i32>()
                .map_err(|_| LocationKeyError::Coordinate {
                    key: key.to_string(),
                    value: value.to_string(),
                })
        };
        Ok(Self::new(world, coord(x)?, coord(y)?, coord(z)?))
    }

    /// Squared euclidean distance in blocks, or `None` across worlds.
    pub fn distance_sq(&self, other: &Location) -> Option<i64> {
        if self.world != other.world {
            return None;
        }
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        Some(dx * dx + dy * dy + dz * dz)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}, {}]", self.world, self.x, self.y, self.z)
    }
}
