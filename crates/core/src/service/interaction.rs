use super::*;
use crate::permissions::{can_claim, nodes};
use crate::*;
use tracing::info;

impl<P: Persistence> RewardService<P> {
    /// Routes a block interaction: Setup mode places a reward, Remove mode
    /// deletes one, otherwise the actor tries to claim.
    pub fn handle_interaction(
        &self,
        actor: &Actor,
        location: &Location,
        held: Option<&Payload>,
        events: &mut EventBus,
    ) -> Interaction {
        match self.modes.mode(&actor.id) {
            ActorMode::Setup { category } => Interaction {
                path: InteractionPath::Setup,
                outcome: self.create_reward(actor, location, held, &category, events),
            },
            ActorMode::Remove => Interaction {
                path: InteractionPath::Remove,
                outcome: self.remove_reward(actor, location, events),
            },
            ActorMode::None => Interaction {
                path: InteractionPath::Claim,
                outcome: self.claim_reward(actor, location, events),
            },
        }
    }

    fn create_reward(
        &self,
        actor: &Actor,
        location: &Location,
        held: Option<&Payload>,
        category: &str,
        events: &mut EventBus,
    ) -> Outcome {
        if !self
            .permissions
            .check_permission(actor, nodes::COMMAND_SET)
        {
            return Outcome::Rejected(Rejection::NoPermission(nodes::COMMAND_SET.to_string()));
        }
        let Some(payload) = held.filter(|payload| !payload.is_empty()) else {
            return Outcome::Rejected(Rejection::EmptyPayload);
        };
        if self.store.resolve_world(&location.world).is_none() {
            return Outcome::Rejected(Rejection::InvalidLocation);
        }
        let record = RewardRecord::in_category(location.clone(), payload.clone(), category);
        // Never overwrite a live record; Setup mode stays active.
        if self.store.add_if_vacant(record.clone()).is_err() {
            return Outcome::Rejected(Rejection::RewardExists);
        }
        events.push(Event::RewardCreated {
            location: location.clone(),
            category: category.to_string(),
            actor: actor.id.clone(),
        });
        self.leave_mode(&actor.id, events);
        info!(
            target: "glint::service",
            player = %actor.name,
            %location,
            category,
            reward = %payload,
            "reward created"
        );
        Outcome::Created(record)
    }

    fn remove_reward(&self, actor: &Actor, location: &Location, events: &mut EventBus) -> Outcome {
        if !self
            .permissions
            .check_permission(actor, nodes::COMMAND_REMOVE)
        {
            return Outcome::Rejected(Rejection::NoPermission(
                nodes::COMMAND_REMOVE.to_string(),
            ));
        }
        let Some(removed) = self.store.remove(location) else {
            return Outcome::Rejected(Rejection::NoRewardHere);
        };
        events.push(Event::RewardRemoved {
            location: location.clone(),
            actor: actor.id.clone(),
        });
        self.leave_mode(&actor.id, events);
        info!(
            target: "glint::service",
            player = %actor.name,
            %location,
            "reward removed"
        );
        Outcome::Removed(removed)
    }

    fn claim_reward(&self, actor: &Actor, location: &Location, events: &mut EventBus) -> Outcome {
        let Some(category) = self
            .store
            .get(location)
            .map(|record| record.category().to_string())
        else {
            return Outcome::Rejected(Rejection::NoRewardHere);
        };
        if !can_claim(self.permissions.as_ref(), actor, &category) {
            return Outcome::Rejected(Rejection::NoPermission(nodes::claim_category(&category)));
        }
        // Check and insert under one write lock so a concurrent remove or a
        // second claim by the same actor observes the result.
        let claimed = self.store.modify(location, |record| {
            if record.claim(&actor.id) {
                Some(record.clone())
            } else {
                None
            }
        });
        let record = match claimed {
            None => return Outcome::Rejected(Rejection::NoRewardHere),
            Some(None) => return Outcome::Rejected(Rejection::AlreadyClaimed),
            Some(Some(record)) => record,
        };
        self.store.mark_dirty();

        let payload = record.payload().clone();
        events.push(Event::RewardClaimed {
            location: location.clone(),
            actor: actor.id.clone(),
            payload: payload.clone(),
        });
        info!(
            target: "glint::service",
            player = %actor.name,
            %location,
            reward = %payload,
            "reward claimed"
        );
        let completion = self.category_completion(actor, record.category(), events);
        Outcome::Claimed(Box::new(Claim {
            record,
            payload,
            completion,
        }))
    }

    /// Whether a reward sits at `location`; hosts refuse to break such blocks.
    pub fn is_protected(&self, location: &Location) -> bool {
        self.store.contains(location)
    }

    /// Rewards in the same world within `radius` blocks that `actor` has not
    /// claimed, taken from a snapshot. Records may vanish right after.
    pub fn unclaimed_near(&self, actor: &ActorId, origin: &Location, radius: u32) -> Vec<RewardRecord> {
        let radius = i64::from(radius);
        self.unclaimed_within(actor, origin, radius * radius)
    }

    /// [`RewardService::unclaimed_near`] with the configured radius.
    pub fn unclaimed_in_range(&self, actor: &ActorId, origin: &Location) -> Vec<RewardRecord> {
        self.unclaimed_within(actor, origin, self.config.proximity_radius_sq())
    }

    fn unclaimed_within(&self, actor: &ActorId, origin: &Location, limit_sq: i64) -> Vec<RewardRecord> {
        let mut nearby: Vec<_> = self
            .store
            .list_all()
            .into_values()
            .filter(|record| !record.has_claimed(actor))
            .filter(|record| {
                record
                    .location()
                    .distance_sq(origin)
                    .is_some_and(|distance| distance <= limit_sq)
            })
            .collect();
        nearby.sort_by(|a, b| a.location().cmp(b.location()));
        nearby
    }
}
