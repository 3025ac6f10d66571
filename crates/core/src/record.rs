use crate::{ActorId, Location, Payload, DEFAULT_CATEGORY};
use std::collections::BTreeSet;

/// A one-time reward placed at a location.
///
/// The location is fixed at construction; moving a reward is a remove
/// followed by an add. Claimants only change through [`RewardRecord::claim`]
/// and [`RewardRecord::reset_claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRecord {
    location: Location,
    payload: Payload,
    claimants: BTreeSet<ActorId>,
    category: String,
}

impl RewardRecord {
    pub fn new(location: Location, payload: Payload) -> Self {
        Self::in_category(location, payload, DEFAULT_CATEGORY)
    }

    pub fn in_category(location: Location, payload: Payload, category: impl Into<String>) -> Self {
        Self {
            location,
            payload,
            claimants: BTreeSet::new(),
            category: category.into(),
        }
    }

    pub fn with_claimants<I>(mut self, claimants: I) -> Self
    where
        I: IntoIterator<Item = ActorId>,
    {
        self.claimants.extend(claimants);
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn claimants(&self) -> &BTreeSet<ActorId> {
        &self.claimants
    }

    pub fn has_claimed(&self, actor: &ActorId) -> bool {
        self.claimants.contains(actor)
    }

    /// Returns `false` if the actor had already claimed.
    pub fn claim(&mut self, actor: &ActorId) -> bool {
        self.claimants.insert(actor.clone())
    }

    /// Returns `true` if the actor was a claimant.
    pub fn reset_claim(&mut self, actor: &ActorId) -> bool {
        self.claimants.remove(actor)
    }
}
