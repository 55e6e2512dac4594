//! Systems - per-tick logic that operates on components

mod colony;
mod gossip;
mod probe;

pub use colony::*;
pub use gossip::*;
pub use probe::*;
