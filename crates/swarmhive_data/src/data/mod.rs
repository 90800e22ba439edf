//! Core data structures for the swarm simulation.

pub mod entity;
pub mod snapshot;
