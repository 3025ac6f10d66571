use crate::PLAYER_PLACEHOLDER;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Blocks within which an unclaimed reward is shown to a player.
    pub proximity_radius: u32,
    /// Window for the second `clearall` that confirms the first.
    pub clear_confirmation_secs: u64,
    /// Token in completion commands replaced by the claiming player's name.
    pub player_placeholder: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            proximity_radius: 16,
            clear_confirmation_secs: 30,
            player_placeholder: PLAYER_PLACEHOLDER.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn proximity_radius_sq(&self) -> i64 {
        let radius = i64::from(self.proximity_radius);
        radius * radius
    }
}
