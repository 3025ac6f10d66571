use crate::{ActorMode, Payload, RewardRecord};
use thiserror::Error;

/// Routine refusals. These are answers to user input, not failures of the
/// store, and never leave state half-changed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("nothing is held to use as a reward")]
    EmptyPayload,
    #[error("that location is not in a loaded world")]
    InvalidLocation,
    #[error("there is no reward here")]
    NoRewardHere,
    #[error("a reward already exists here")]
    RewardExists,
    #[error("this reward was already claimed")]
    AlreadyClaimed,
    #[error("unknown category {0}")]
    UnknownCategory(String),
    #[error("invalid category name {0}")]
    InvalidCategoryName(String),
    #[error("no completion command {index} in category {category}")]
    NoSuchCompletionCommand { category: String, index: usize },
    #[error("missing permission {0}")]
    NoPermission(String),
}

/// A successful claim. The host delivers `payload` to the actor (inventory
/// or drop) and dispatches `completion` commands if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub record: RewardRecord,
    pub payload: Payload,
    pub completion: Option<CategoryCompletion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCompletion {
    pub category: String,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(RewardRecord),
    Removed(RewardRecord),
    Claimed(Box<Claim>),
    Rejected(Rejection),
}

impl Outcome {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Which branch of the interaction state machine handled the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPath {
    Setup,
    Remove,
    Claim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub path: InteractionPath,
    pub outcome: Outcome,
}

impl Interaction {
    /// Nothing here for the claim path: the host should process the
    /// interaction as if no reward system existed.
    pub fn passes_through(&self) -> bool {
        self.path == InteractionPath::Claim
            && self.outcome.rejection() == Some(&Rejection::NoRewardHere)
    }

    pub fn feedback(&self) -> Feedback {
        match &self.outcome {
            Outcome::Rejected(Rejection::NoRewardHere) if self.passes_through() => {
                Feedback::PassThrough
            }
            outcome => Feedback::of(outcome),
        }
    }
}

/// Fixed message categories for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    RewardCreated,
    RewardRemoved,
    RewardClaimed,
    CategoryCompleted,
    EmptyHand,
    InvalidLocation,
    NoRewardAtLocation,
    RewardAlreadyHere,
    AlreadyClaimed,
    UnknownCategory,
    InvalidCategoryName,
    NoSuchCompletionCommand,
    NoPermission,
    PassThrough,
    SetupModeEnabled,
    SetupModeDisabled,
    RemoveModeEnabled,
    RemoveModeDisabled,
    NoModeActive,
}

impl Feedback {
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Created(_) => Self::RewardCreated,
            Outcome::Removed(_) => Self::RewardRemoved,
            Outcome::Claimed(claim) if claim.completion.is_some() => Self::CategoryCompleted,
            Outcome::Claimed(_) => Self::RewardClaimed,
            Outcome::Rejected(rejection) => Self::rejected(rejection),
        }
    }

    pub fn rejected(rejection: &Rejection) -> Self {
        match rejection {
            Rejection::EmptyPayload => Self::EmptyHand,
            Rejection::InvalidLocation => Self::InvalidLocation,
            Rejection::NoRewardHere => Self::NoRewardAtLocation,
            Rejection::RewardExists => Self::RewardAlreadyHere,
            Rejection::AlreadyClaimed => Self::AlreadyClaimed,
            Rejection::UnknownCategory(_) => Self::UnknownCategory,
            Rejection::InvalidCategoryName(_) => Self::InvalidCategoryName,
            Rejection::NoSuchCompletionCommand { .. } => Self::NoSuchCompletionCommand,
            Rejection::NoPermission(_) => Self::NoPermission,
        }
    }

    /// Message for entering `to` or, when `to` is `None`, leaving `from`.
    pub fn mode_change(from: &ActorMode, to: &ActorMode) -> Self {
        match (from, to) {
            (_, ActorMode::Setup { .. }) => Self::SetupModeEnabled,
            (_, ActorMode::Remove) => Self::RemoveModeEnabled,
            (ActorMode::Setup { .. }, ActorMode::None) => Self::SetupModeDisabled,
            (ActorMode::Remove, ActorMode::None) => Self::RemoveModeDisabled,
            (ActorMode::None, ActorMode::None) => Self::NoModeActive,
        }
    }
}
