use super::*;
use crate::*;
use std::collections::BTreeMap;
use tracing::info;

impl<P: Persistence> RewardService<P> {
    /// Appends a completion command to a known category; returns its index.
    pub fn add_completion_command(&self, category: &str, command: &str) -> Result<usize, Rejection> {
        self.require_category(category)?;
        let index = self
            .store
            .modify_completions(|commands| commands.add(category, command));
        info!(target: "glint::service", category, index, "completion command added");
        Ok(index)
    }

    pub fn remove_completion_command(&self, category: &str, index: usize) -> Result<String, Rejection> {
        self.require_category(category)?;
        if index >= self.store.completions().for_category(category).len() {
            return Err(Rejection::NoSuchCompletionCommand {
                category: category.to_string(),
                index,
            });
        }
        self.store
            .modify_completions(|commands| commands.remove(category, index))
            .ok_or_else(|| Rejection::NoSuchCompletionCommand {
                category: category.to_string(),
                index,
            })
    }

    /// Commands per category, or only those of `category`.
    pub fn completion_commands(
        &self,
        category: Option<&str>,
    ) -> Result<BTreeMap<String, Vec<String>>, Rejection> {
        if let Some(category) = category {
            self.require_category(category)?;
        }
        let all = self.store.completions();
        Ok(all
            .iter()
            .filter(|(name, _)| category.map_or(true, |category| *name == category))
            .filter(|(_, commands)| !commands.is_empty())
            .map(|(name, commands)| (name.to_string(), commands.to_vec()))
            .collect())
    }

    /// After a claim: if `actor` now holds every reward of `category`, returns
    /// the rendered completion commands and emits `CategoryCompleted`.
    pub(super) fn category_completion(
        &self,
        actor: &Actor,
        category: &str,
        events: &mut EventBus,
    ) -> Option<CategoryCompletion> {
        let completions = self.store.completions();
        if completions.for_category(category).is_empty() {
            return None;
        }
        let snapshot = self.store.list_all();
        let mut in_category = snapshot
            .values()
            .filter(|record| record.category() == category)
            .peekable();
        in_category.peek()?;
        if !in_category.all(|record| record.has_claimed(&actor.id)) {
            return None;
        }
        let commands = completions.render(category, &self.config.player_placeholder, &actor.name);
        events.push(Event::CategoryCompleted {
            category: category.to_string(),
            actor: actor.id.clone(),
            commands: commands.clone(),
        });
        info!(
            target: "glint::service",
            player = %actor.name,
            category,
            commands = commands.len(),
            "category completed"
        );
        Some(CategoryCompletion {
            category: category.to_string(),
            commands,
        })
    }

    fn require_category(&self, category: &str) -> Result<(), Rejection> {
        if self.store.categories().contains(category) {
            Ok(())
        } else {
            Err(Rejection::UnknownCategory(category.to_string()))
        }
    }
}
