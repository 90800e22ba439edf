//! Plain data shared between the swarm engine and whatever observes it.

pub mod data;

pub use data::entity::{Color, EntityId, EntityKind};
pub use data::snapshot::{EntitySnapshot, QueenStats, SceneSnapshot};
