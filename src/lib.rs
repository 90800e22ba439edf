//! Swarmhive: colonies of foraging workers led by queens.
//!
//! The engine lives in `swarmhive_core`; this crate adds configuration
//! loading, the headless driver and graceful shutdown.

pub mod app;
pub mod model;
