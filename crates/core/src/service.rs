use crate::{
    ActorModeTracker, Persistence, PermissionProvider, RewardStore, ServiceConfig,
};

mod admin;
mod completion;
mod interaction;

#[cfg(test)]
mod tests;

/// Create, remove and claim rewards on top of a [`RewardStore`] and the
/// per-actor admin modes.
///
/// The service owns its store; hosts share the service (typically behind an
/// `Arc`) across event threads. All methods take `&self`.
pub struct RewardService<P> {
    store: RewardStore<P>,
    modes: ActorModeTracker,
    permissions: Box<dyn PermissionProvider>,
    config: ServiceConfig,
}

impl<P: Persistence> RewardService<P> {
    pub fn new(
        store: RewardStore<P>,
        permissions: Box<dyn PermissionProvider>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            modes: ActorModeTracker::new(),
            permissions,
            config,
        }
    }

    pub fn store(&self) -> &RewardStore<P> {
        &self.store
    }

    pub fn modes(&self) -> &ActorModeTracker {
        &self.modes
    }

    pub fn permissions(&self) -> &dyn PermissionProvider {
        self.permissions.as_ref()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
