use anyhow::Context;
use glint_core::{ActorId, ItemRegistry, ServiceConfig, StaticWorlds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "GLINT_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "config/glint";

pub fn default_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub rewards_file: String,
    pub completions_file: String,
    pub permissions_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            rewards_file: "glint.json".to_string(),
            completions_file: "completions.json".to_string(),
            permissions_file: "permissions.json".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn rewards_path(&self) -> PathBuf {
        self.dir.join(&self.rewards_file)
    }

    pub fn completions_path(&self) -> PathBuf {
        self.dir.join(&self.completions_file)
    }

    pub fn permissions_path(&self) -> PathBuf {
        self.dir.join(&self.permissions_file)
    }
}

/// A world known to the host. Without `items` any namespaced item id is
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub id: String,
    #[serde(default)]
    pub items: Option<Vec<String>>,
}

impl WorldConfig {
    fn open(id: &str) -> Self {
        Self {
            id: id.to_string(),
            items: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    pub storage: StorageConfig,
    pub service: ServiceConfig,
    pub worlds: Vec<WorldConfig>,
    pub operators: Vec<String>,
}

impl Default for GlintConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            service: ServiceConfig::default(),
            worlds: vec![
                WorldConfig::open("minecraft:overworld"),
                WorldConfig::open("minecraft:the_nether"),
                WorldConfig::open("minecraft:the_end"),
            ],
            operators: Vec::new(),
        }
    }
}

impl GlintConfig {
    pub fn static_worlds(&self) -> StaticWorlds {
        let mut worlds = StaticWorlds::new();
        for world in &self.worlds {
            let items = match &world.items {
                Some(items) => ItemRegistry::with_items(items.iter().cloned()),
                None => ItemRegistry::open(),
            };
            worlds.insert(world.id.clone(), items);
        }
        worlds
    }

    pub fn operator_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.operators.iter().map(|id| ActorId::new(id.as_str()))
    }
}

/// Reads `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<GlintConfig> {
    if !path.exists() {
        return Ok(GlintConfig::default());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(config)
}
