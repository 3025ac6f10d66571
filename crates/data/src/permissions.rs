use anyhow::Context;
use glint_core::{ActorId, GrantPermissions, OperatorPermissions, PermissionProvider};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// `{"defaults": [node..], "actors": {"<id>": [node..]}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PermissionsFile {
    defaults: Vec<String>,
    actors: BTreeMap<String, Vec<String>>,
}

pub fn load_grants(path: &Path) -> anyhow::Result<GrantPermissions> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let file: PermissionsFile =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    let mut grants = GrantPermissions::new();
    for node in file.defaults {
        grants = grants.with_default(node);
    }
    for (actor, nodes) in file.actors {
        let actor = ActorId::new(actor);
        for node in nodes {
            grants.grant(actor.clone(), node);
        }
    }
    Ok(grants)
}

/// Uses explicit grants when a permissions file is present and readable,
/// otherwise falls back to operator-based checks.
pub fn load_permission_provider(
    path: &Path,
    operators: impl IntoIterator<Item = ActorId>,
) -> Box<dyn PermissionProvider> {
    if path.exists() {
        match load_grants(path) {
            Ok(grants) => {
                info!(
                    target: "glint::data",
                    path = %path.display(),
                    actors = grants.actors(),
                    "using permission grants"
                );
                return Box::new(grants);
            }
            Err(err) => {
                warn!(
                    target: "glint::data",
                    error = %format!("{err:#}"),
                    "permission file unusable, falling back to operators"
                );
            }
        }
    }
    let provider = OperatorPermissions::new(operators);
    info!(target: "glint::data", provider = provider.name(), "using operator permissions");
    Box::new(provider)
}
