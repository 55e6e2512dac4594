//! Probe Swarm Core - Self-Replicating Probe Simulation Engine
//!
//! A deterministic, fixed-step simulation of a swarm of autonomous mining
//! probes spreading out from a central colony across a procedurally
//! generated starfield. Probes mine depletable stars, haul cargo home and
//! share what they have seen; the colony spends the proceeds on research,
//! research labs and more probes.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Stars and probes
//! - **Components**: Pure data attached to entities (Position, Star, Probe)
//! - **Systems**: Logic that queries and updates components, run once per tick
//!
//! Each tick advances every probe, runs colony automation once, rebuilds
//! the spatial grid and lets probes in range exchange knowledge.
//!
//! # Example
//!
//! ```rust,no_run
//! use probeswarm_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(SimConfig::default())?;
//!
//! engine.advance(1_000);
//! println!("{} probes after {} ticks", engine.probe_count(), engine.tick());
//! # Ok::<(), ConfigError>(())
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod snapshot;
pub mod spatial;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, SimConfig};
    pub use crate::engine::SimulationEngine;
    pub use crate::snapshot::{HoverTarget, WorldSnapshot};
}
