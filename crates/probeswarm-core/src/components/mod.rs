//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They carry only local bookkeeping - behavior lives in systems.

mod common;
mod probe;
mod resources;
mod star;

pub use common::*;
pub use probe::*;
pub use resources::*;
pub use star::*;
