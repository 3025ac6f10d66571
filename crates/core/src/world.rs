use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Items a world knows about. An open registry accepts any namespaced id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRegistry {
    items: Option<BTreeSet<String>>,
}

impl ItemRegistry {
    pub fn open() -> Self {
        Self { items: None }
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: Some(items.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        match &self.items {
            Some(items) => items.contains(item),
            None => is_namespaced_id(item),
        }
    }
}

fn is_namespaced_id(item: &str) -> bool {
    let Some((namespace, path)) = item.split_once(':') else {
        return false;
    };
    let valid = |part: &str, extra: &[char]| {
        !part.is_empty()
            && part.chars().all(|ch| {
                ch.is_ascii_lowercase()
                    || ch.is_ascii_digit()
                    || matches!(ch, '_' | '-' | '.')
                    || extra.contains(&ch)
            })
    };
    valid(namespace, &[]) && valid(path, &['/'])
}

/// Everything needed to fully materialize payloads stored against one world.
#[derive(Debug, Clone)]
pub struct WorldContext {
    id: String,
    items: Arc<ItemRegistry>,
}

impl WorldContext {
    pub fn new(id: impl Into<String>, items: Arc<ItemRegistry>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }
}

/// Resolves world identifiers to loaded worlds. Hosts hand one to the store
/// once their worlds exist; before that, loading is deferred.
pub trait WorldResolver: Send + Sync {
    fn resolve_world(&self, world: &str) -> Option<WorldContext>;
}

/// Fixed set of worlds, typically built from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticWorlds {
    worlds: HashMap<String, WorldContext>,
}

impl StaticWorlds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_world(mut self, id: impl Into<String>, items: ItemRegistry) -> Self {
        self.insert(id, items);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, items: ItemRegistry) {
        let id = id.into();
        self.worlds
            .insert(id.clone(), WorldContext::new(id, Arc::new(items)));
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

impl WorldResolver for StaticWorlds {
    fn resolve_world(&self, world: &str) -> Option<WorldContext> {
        self.worlds.get(world).cloned()
    }
}
