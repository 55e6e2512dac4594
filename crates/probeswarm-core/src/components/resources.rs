//! Resource kinds and integer resource bundles.

use serde::{Deserialize, Serialize};

/// The four resource kinds carried through the economy.
///
/// Declaration order matters: probes address material shortages in this
/// order, so minerals are sought before gases before energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Minerals,
    Gases,
    Energy,
    Research,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Minerals,
        ResourceKind::Gases,
        ResourceKind::Energy,
        ResourceKind::Research,
    ];

    /// Material kinds in declared search order (research excluded)
    pub const MATERIALS: [ResourceKind; 3] = [
        ResourceKind::Minerals,
        ResourceKind::Gases,
        ResourceKind::Energy,
    ];

    pub fn is_material(self) -> bool {
        self != ResourceKind::Research
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Minerals => "minerals",
            ResourceKind::Gases => "gases",
            ResourceKind::Energy => "energy",
            ResourceKind::Research => "research",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A bundle of the four resource amounts.
///
/// Used for star stocks, probe cargo and capacities, colony treasury and
/// build costs alike. Amounts are unsigned so they can never go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub minerals: u64,
    pub gases: u64,
    pub energy: u64,
    pub research: u64,
}

impl Resources {
    pub const ZERO: Self = Self {
        minerals: 0,
        gases: 0,
        energy: 0,
        research: 0,
    };

    pub fn new(minerals: u64, gases: u64, energy: u64, research: u64) -> Self {
        Self {
            minerals,
            gases,
            energy,
            research,
        }
    }

    /// Same amount for every kind
    pub fn splat(amount: u64) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    pub fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Minerals => self.minerals,
            ResourceKind::Gases => self.gases,
            ResourceKind::Energy => self.energy,
            ResourceKind::Research => self.research,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::Minerals => &mut self.minerals,
            ResourceKind::Gases => &mut self.gases,
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Research => &mut self.research,
        }
    }

    /// Sum over every kind, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        ResourceKind::ALL
            .iter()
            .fold(0u64, |sum, &kind| sum.saturating_add(self.get(kind)))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Add every kind of `other` into `self`
    pub fn add(&mut self, other: &Resources) {
        for kind in ResourceKind::ALL {
            let slot = self.get_mut(kind);
            *slot = slot.saturating_add(other.get(kind));
        }
    }

    /// True if every kind of `cost` is available
    pub fn covers(&self, cost: &Resources) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&kind| self.get(kind) >= cost.get(kind))
    }

    /// Deduct `cost` if it is fully covered. All-or-nothing.
    pub fn consume(&mut self, cost: &Resources) -> bool {
        if !self.covers(cost) {
            return false;
        }
        for kind in ResourceKind::ALL {
            *self.get_mut(kind) -= cost.get(kind);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_get_mut() {
        let mut res = Resources::new(1, 2, 3, 4);
        assert_eq!(res.get(ResourceKind::Gases), 2);
        *res.get_mut(ResourceKind::Research) += 6;
        assert_eq!(res.research, 10);
        assert_eq!(res.total(), 16);
    }

    #[test]
    fn test_consume_is_all_or_nothing() {
        let mut treasury = Resources::new(100, 50, 0, 0);

        assert!(!treasury.consume(&Resources::new(70, 70, 0, 0)));
        assert_eq!(treasury, Resources::new(100, 50, 0, 0));

        assert!(treasury.consume(&Resources::new(70, 40, 0, 0)));
        assert_eq!(treasury, Resources::new(30, 10, 0, 0));
    }

    #[test]
    fn test_add_accumulates_every_kind() {
        let mut res = Resources::splat(1);
        res.add(&Resources::new(10, 20, 30, 40));
        assert_eq!(res, Resources::new(11, 21, 31, 41));
    }

    #[test]
    fn test_total_saturates() {
        let res = Resources::new(u64::MAX, 1, 0, 0);
        assert_eq!(res.total(), u64::MAX);
        assert!(!res.is_empty());
    }

    #[test]
    fn test_material_order() {
        assert_eq!(ResourceKind::MATERIALS[0], ResourceKind::Minerals);
        assert!(ResourceKind::MATERIALS.iter().all(|k| k.is_material()));
        assert!(!ResourceKind::Research.is_material());
    }
}
