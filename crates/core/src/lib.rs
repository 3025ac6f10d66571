//! Reward placement and one-time claiming. Keep this crate free of IO and
//! platform concerns; persistence plugs in through [`Persistence`].

pub mod actor;
pub mod category;
pub mod completion;
pub mod config;
pub mod events;
pub mod location;
pub mod mode;
pub mod outcome;
pub mod payload;
pub mod permissions;
pub mod record;
pub mod service;
pub mod store;
pub mod world;

pub use actor::*;
pub use category::*;
pub use completion::*;
pub use config::*;
pub use events::*;
pub use location::*;
pub use mode::*;
pub use outcome::*;
pub use payload::*;
pub use permissions::*;
pub use record::*;
pub use service::*;
pub use store::*;
pub use world::*;
