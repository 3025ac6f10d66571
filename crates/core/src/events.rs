use crate::{ActorId, ActorMode, Location, Payload};
use serde::{Deserialize, Serialize};

/// Something the host may want to react to: particles, chat, command dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RewardCreated {
        location: Location,
        category: String,
        actor: ActorId,
    },
    RewardRemoved {
        location: Location,
        actor: ActorId,
    },
    RewardClaimed {
        location: Location,
        actor: ActorId,
        payload: Payload,
    },
    CategoryCompleted {
        category: String,
        actor: ActorId,
        commands: Vec<String>,
    },
    ModeChanged {
        actor: ActorId,
        from: ActorMode,
        to: ActorMode,
    },
    ClaimsReset { actor: ActorId, count: usize },
    RewardsCleared { count: usize },
    Reloaded { count: usize, deferred: usize },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
