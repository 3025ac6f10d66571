use crate::ActorId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Admin mode of a single actor. Setup and Remove are mutually exclusive by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorMode {
    #[default]
    None,
    /// The next interaction places a reward in `category`.
    Setup { category: String },
    /// The next interaction on a reward deletes it.
    Remove,
}

impl ActorMode {
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup { .. })
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Remove)
    }
}

/// Per-actor mode table. Actors in `None` are not stored, so the table only
/// grows with admins currently mid-action.
#[derive(Debug, Default)]
pub struct ActorModeTracker {
    modes: RwLock<HashMap<ActorId, ActorMode>>,
}

impl ActorModeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters Setup, clearing any Remove mode. Returns the previous mode.
    pub fn enter_setup(&self, actor: &ActorId, category: impl Into<String>) -> ActorMode {
        self.replace(
            actor,
            ActorMode::Setup {
                category: category.into(),
            },
        )
    }

    /// Enters Remove, clearing any Setup mode. Returns the previous mode.
    pub fn enter_remove(&self, actor: &ActorId) -> ActorMode {
        self.replace(actor, ActorMode::Remove)
    }

    pub fn exit(&self, actor: &ActorId) -> ActorMode {
        self.replace(actor, ActorMode::None)
    }

    /// Drops any mode for an actor that left. Safe for untracked actors.
    pub fn disconnect(&self, actor: &ActorId) {
        self.exit(actor);
    }

    pub fn mode(&self, actor: &ActorId) -> ActorMode {
        self.modes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(actor)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_setup(&self, actor: &ActorId) -> bool {
        self.modes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(actor)
            .is_some_and(ActorMode::is_setup)
    }

    pub fn is_remove(&self, actor: &ActorId) -> bool {
        self.modes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(actor)
            .is_some_and(ActorMode::is_remove)
    }

    pub fn tracked(&self) -> usize {
        self.modes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn replace(&self, actor: &ActorId, mode: ActorMode) -> ActorMode {
        let mut modes = self.modes.write().unwrap_or_else(|e| e.into_inner());
        let previous = match mode {
            ActorMode::None => modes.remove(actor),
            mode => modes.insert(actor.clone(), mode),
        };
        previous.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn setup_then_remove_is_exclusive() {
        let tracker = ActorModeTracker::new();
        let a = ActorId::new("a");
        tracker.enter_setup(&a, "default");
        assert!(tracker.is_setup(&a));
        let previous = tracker.enter_remove(&a);
        assert!(previous.is_setup());
        assert!(!tracker.is_setup(&a));
        assert!(tracker.is_remove(&a));
    }

    #[test]
    fn remove_then_setup_is_exclusive() {
        let tracker = ActorModeTracker::new();
        let a = ActorId::new("a");
        tracker.enter_remove(&a);
        tracker.enter_setup(&a, "event");
        assert!(!tracker.is_remove(&a));
        assert_eq!(
            tracker.mode(&a),
            ActorMode::Setup {
                category: "event".to_string()
            }
        );
    }

    #[test]
    fn disconnect_clears_any_state() {
        let tracker = ActorModeTracker::new();
        let a = ActorId::new("a");
        let never_seen = ActorId::new("ghost");
        tracker.disconnect(&never_seen);
        assert!(!tracker.is_setup(&never_seen));
        assert!(!tracker.is_remove(&never_seen));

        tracker.enter_setup(&a, "default");
        tracker.enter_remove(&a);
        tracker.disconnect(&a);
        assert!(!tracker.is_setup(&a));
        assert!(!tracker.is_remove(&a));
        assert_eq!(tracker.tracked(), 0);
    }

    #[test]
    fn exit_reports_previous_mode() {
        let tracker = ActorModeTracker::new();
        let a = ActorId::new("a");
        assert_eq!(tracker.exit(&a), ActorMode::None);
        tracker.enter_remove(&a);
        assert_eq!(tracker.exit(&a), ActorMode::Remove);
        assert_eq!(tracker.mode(&a), ActorMode::None);
    }

    #[test]
    fn actors_are_independent_across_threads() {
        let tracker = Arc::new(ActorModeTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    let actor = ActorId::new(format!("actor-{i}"));
                    for _ in 0..100 {
                        tracker.enter_setup(&actor, "default");
                        tracker.enter_remove(&actor);
                    }
                    assert!(tracker.is_remove(&actor));
                    assert!(!tracker.is_setup(&actor));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        assert_eq!(tracker.tracked(), 8);
    }
}
