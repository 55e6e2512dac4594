//! Generation - procedural creation of the starfield

mod galaxy;
mod noise;

pub use galaxy::*;
pub use noise::*;
