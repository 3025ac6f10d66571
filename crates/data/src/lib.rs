//! JSON persistence, configuration and permission loading for glint.

pub mod codec;
pub mod config;
pub mod payload;
pub mod permissions;
pub mod persistence;

pub use config::*;
pub use payload::*;
pub use permissions::*;
pub use persistence::*;
