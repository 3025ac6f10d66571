use crate::{Actor, ActorId};
use std::collections::{BTreeSet, HashMap, HashSet};

pub mod nodes {
    pub const ADMIN: &str = "glint.admin";
    pub const COMMAND_PREFIX: &str = "glint.command.";
    pub const COMMAND_CREATE: &str = "glint.command.create";
    pub const COMMAND_SET: &str = "glint.command.set";
    pub const COMMAND_REMOVE: &str = "glint.command.remove";
    pub const COMMAND_LIST: &str = "glint.command.list";
    pub const COMMAND_RELOAD: &str = "glint.command.reload";
    pub const COMMAND_RESET: &str = "glint.command.reset";
    pub const COMMAND_CLEARALL: &str = "glint.command.clearall";
    pub const COMMAND_COMPLETION: &str = "glint.command.completion";
    pub const CLAIM: &str = "glint.claim";
    pub const CLAIM_CATEGORY_WILDCARD: &str = "glint.claim.category.*";

    pub fn claim_category(category: &str) -> String {
        format!("{CLAIM}.category.{category}")
    }
}

pub trait PermissionProvider: Send + Sync {
    fn check_permission(&self, actor: &Actor, node: &str) -> bool;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Claim rights for `category`: the category node, then the category
/// wildcard, then the base claim node.
pub fn can_claim(provider: &dyn PermissionProvider, actor: &Actor, category: &str) -> bool {
    provider.check_permission(actor, &nodes::claim_category(category))
        || provider.check_permission(actor, nodes::CLAIM_CATEGORY_WILDCARD)
        || provider.check_permission(actor, nodes::CLAIM)
}

fn is_claim_node(node: &str) -> bool {
    node == nodes::CLAIM || node.starts_with("glint.claim.")
}

/// Fallback provider: operators hold every node, everyone else may claim.
#[derive(Debug, Clone, Default)]
pub struct OperatorPermissions {
    operators: HashSet<ActorId>,
}

impl OperatorPermissions {
    pub fn new<I>(operators: I) -> Self
    where
        I: IntoIterator<Item = ActorId>,
    {
        Self {
            operators: operators.into_iter().collect(),
        }
    }

    pub fn is_operator(&self, actor: &ActorId) -> bool {
        self.operators.contains(actor)
    }
}

impl PermissionProvider for OperatorPermissions {
    fn check_permission(&self, actor: &Actor, node: &str) -> bool {
        self.is_operator(&actor.id) || is_claim_node(node)
    }

    fn name(&self) -> &'static str {
        "operator"
    }
}

/// Explicit node grants per actor plus defaults granted to everyone.
///
/// A grant ending in `.*` covers every node below it; `*` covers all nodes;
/// [`nodes::ADMIN`] covers every command node.
#[derive(Debug, Clone, Default)]
pub struct GrantPermissions {
    defaults: BTreeSet<String>,
    grants: HashMap<ActorId, BTreeSet<String>>,
}

impl GrantPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, node: impl Into<String>) -> Self {
        self.defaults.insert(node.into());
        self
    }

    pub fn grant(&mut self, actor: ActorId, node: impl Into<String>) {
        self.grants.entry(actor).or_default().insert(node.into());
    }

    pub fn actors(&self) -> usize {
        self.grants.len()
    }

    fn covers(grant: &str, node: &str) -> bool {
        if grant == node || grant == "*" {
            return true;
        }
        if grant == nodes::ADMIN && node.starts_with(nodes::COMMAND_PREFIX) {
            return true;
        }
        match grant.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('.') => node.starts_with(prefix),
            _ => false,
        }
    }
}

impl PermissionProvider for GrantPermissions {
    fn check_permission(&self, actor: &Actor, node: &str) -> bool {
        let own = self.grants.get(&actor.id);
        self.defaults
            .iter()
            .chain(own.into_iter().flatten())
            .any(|grant| Self::covers(grant, node))
    }

    fn name(&self) -> &'static str {
        "grants"
    }
}
