use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PLAYER_PLACEHOLDER: &str = "{player}";

/// Host commands run once an actor has claimed every reward of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionCommands {
    by_category: BTreeMap<String, Vec<String>>,
}

impl CompletionCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command and returns its index within the category.
    pub fn add(&mut self, category: &str, command: impl Into<String>) -> usize {
        let commands = self.by_category.entry(category.to_string()).or_default();
        commands.push(command.into());
        commands.len() - 1
    }

    pub fn remove(&mut self, category: &str, index: usize) -> Option<String> {
        let commands = self.by_category.get_mut(category)?;
        if index >= commands.len() {
            return None;
        }
        let removed = commands.remove(index);
        if commands.is_empty() {
            self.by_category.remove(category);
        }
        Some(removed)
    }

    pub fn for_category(&self, category: &str) -> &[String] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.by_category
            .iter()
            .map(|(category, commands)| (category.as_str(), commands.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.values().all(Vec::is_empty)
    }

    /// Commands for `category` with `placeholder` replaced by `player`.
    pub fn render(&self, category: &str, placeholder: &str, player: &str) -> Vec<String> {
        self.for_category(category)
            .iter()
            .map(|command| command.replace(placeholder, player))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_by_index() {
        let mut commands = CompletionCommands::new();
        assert_eq!(commands.add("easter", "give {player} cake"), 0);
        assert_eq!(commands.add("easter", "say {player} found every egg"), 1);
        assert_eq!(commands.remove("easter", 5), None);
        assert_eq!(
            commands.remove("easter", 0).as_deref(),
            Some("give {player} cake")
        );
        assert_eq!(commands.for_category("easter").len(), 1);
        assert_eq!(commands.remove("easter", 0).as_deref(), Some("say {player} found every egg"));
        assert!(commands.is_empty());
    }

    #[test]
    fn render_substitutes_every_placeholder() {
        let mut commands = CompletionCommands::new();
        commands.add("default", "tell {player} well done {player}");
        assert_eq!(
            commands.render("default", PLAYER_PLACEHOLDER, "Steve"),
            vec!["tell Steve well done Steve".to_string()]
        );
        assert!(commands.render("missing", PLAYER_PLACEHOLDER, "Steve").is_empty());
    }
}
