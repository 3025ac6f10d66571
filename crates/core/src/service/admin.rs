use super::*;
use crate::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

impl<P: Persistence> RewardService<P> {
    /// Enters Setup mode for `category` (default when `None`). The category
    /// must already exist. Returns the previous mode.
    pub fn enter_setup_mode(
        &self,
        actor: &ActorId,
        category: Option<&str>,
        events: &mut EventBus,
    ) -> Result<ActorMode, Rejection> {
        let category = category.unwrap_or(DEFAULT_CATEGORY);
        if !self.store.categories().contains(category) {
            return Err(Rejection::UnknownCategory(category.to_string()));
        }
        let previous = self.modes.enter_setup(actor, category);
        events.push(Event::ModeChanged {
            actor: actor.clone(),
            from: previous.clone(),
            to: self.modes.mode(actor),
        });
        info!(target: "glint::service", %actor, category, "entered setup mode");
        Ok(previous)
    }

    pub fn enter_remove_mode(&self, actor: &ActorId, events: &mut EventBus) -> ActorMode {
        let previous = self.modes.enter_remove(actor);
        events.push(Event::ModeChanged {
            actor: actor.clone(),
            from: previous.clone(),
            to: ActorMode::Remove,
        });
        info!(target: "glint::service", %actor, "entered remove mode");
        previous
    }

    /// Leaves whichever mode is active and returns it.
    pub fn exit_mode(&self, actor: &ActorId, events: &mut EventBus) -> ActorMode {
        self.leave_mode(actor, events)
    }

    /// Host lifecycle hook: a disconnected actor never stays in a mode.
    pub fn on_disconnect(&self, actor: &ActorId) {
        self.modes.disconnect(actor);
    }

    pub(super) fn leave_mode(&self, actor: &ActorId, events: &mut EventBus) -> ActorMode {
        let previous = self.modes.exit(actor);
        if previous != ActorMode::None {
            events.push(Event::ModeChanged {
                actor: actor.clone(),
                from: previous.clone(),
                to: ActorMode::None,
            });
        }
        previous
    }

    /// Records sorted by category then location, optionally restricted to
    /// one known category.
    pub fn list_entries(&self, category: Option<&str>) -> Result<Vec<RewardRecord>, Rejection> {
        if let Some(category) = category {
            if !self.store.categories().contains(category) {
                return Err(Rejection::UnknownCategory(category.to_string()));
            }
        }
        Ok(self
            .store
            .list_sorted()
            .into_iter()
            .filter(|record| category.map_or(true, |category| record.category() == category))
            .collect())
    }

    pub fn create_category(&self, name: &str) -> Result<bool, Rejection> {
        let created = self
            .store
            .create_category(name)
            .map_err(|_| Rejection::InvalidCategoryName(name.to_string()))?;
        if created {
            info!(target: "glint::service", category = name, "category created");
        }
        Ok(created)
    }

    pub fn list_categories(&self) -> BTreeSet<String> {
        self.store.categories().to_set()
    }

    /// Reloads from disk with `worlds` as the new context and returns the
    /// number of live records.
    pub fn reload(&self, worlds: Option<Arc<dyn WorldResolver>>, events: &mut EventBus) -> usize {
        let summary = self.store.reload(worlds);
        events.push(Event::Reloaded {
            count: summary.loaded,
            deferred: summary.deferred,
        });
        info!(
            target: "glint::service",
            count = summary.loaded,
            deferred = summary.deferred,
            skipped = summary.warnings.len(),
            "reward data reloaded"
        );
        summary.loaded
    }

    /// Removes `target` from every claimant set so it may claim again.
    pub fn reset_claims(&self, target: &ActorId, events: &mut EventBus) -> usize {
        let count = self.store.modify_all(|record| record.reset_claim(target));
        if count > 0 {
            self.store.mark_dirty();
        }
        events.push(Event::ClaimsReset {
            actor: target.clone(),
            count,
        });
        info!(target: "glint::service", actor = %target, count, "claims reset");
        count
    }

    pub fn clear_all(&self, events: &mut EventBus) -> usize {
        let count = self.store.clear_all();
        events.push(Event::RewardsCleared { count });
        info!(target: "glint::service", count, "all rewards cleared");
        count
    }

    /// Checks a command-level node such as [`nodes::COMMAND_LIST`].
    pub fn has_permission(&self, actor: &Actor, node: &str) -> bool {
        self.permissions.check_permission(actor, node)
    }
}
