//! Star components - depletable multi-resource nodes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ResourceKind, Resources};

/// A star that probes can mine.
///
/// Stocks only ever shrink. Once every stock reaches zero the star stays
/// depleted for the rest of the run but remains in the world, inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    /// Size multiplier from the density of the region the star was placed in
    pub size_mod: f32,
    /// Display color; its RGB channels seeded the three material stocks
    pub color: [u8; 3],
    /// Remaining stock of each resource kind
    pub stock: Resources,
    /// Number of successful extractions, counted by the mining system
    pub visits: u32,
}

impl Star {
    pub fn new(size_mod: f32, stock: Resources) -> Self {
        Self {
            size_mod,
            color: [255, 255, 255],
            stock,
            visits: 0,
        }
    }

    /// Random star whose material stocks follow a random color.
    ///
    /// Each RGB channel maps linearly onto `material_range`
    /// (red → minerals, green → gases, blue → energy); research is drawn
    /// uniformly from `research_range`.
    pub fn random(
        rng: &mut impl Rng,
        size_mod: f32,
        material_range: (u64, u64),
        research_range: (u64, u64),
    ) -> Self {
        let color: [u8; 3] = [rng.gen(), rng.gen(), rng.gen()];
        let (lo, hi) = material_range;
        let channel = |c: u8| lo + (c as u128 * (hi - lo) as u128 / 255) as u64;

        let stock = Resources::new(
            channel(color[0]),
            channel(color[1]),
            channel(color[2]),
            rng.gen_range(research_range.0..=research_range.1),
        );

        Self {
            size_mod,
            color,
            stock,
            visits: 0,
        }
    }

    pub fn total_resources(&self) -> u64 {
        self.stock.total()
    }

    pub fn is_depleted(&self) -> bool {
        self.total_resources() == 0
    }

    /// Extract up to `amount` of `kind`, returning what was actually removed.
    pub fn mine(&mut self, kind: ResourceKind, amount: u64) -> u64 {
        let stock = self.stock.get_mut(kind);
        let mined = amount.min(*stock);
        *stock -= mined;
        mined
    }
}
