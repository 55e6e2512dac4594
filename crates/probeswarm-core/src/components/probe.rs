//! Probe components - the autonomous mining agents.

use std::collections::HashSet;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::{Position, ResourceKind, Resources};

/// Discrete behavior state of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeState {
    Idle,
    TravelingToResource,
    TravelingToResourceForResearch,
    ReturningToColony,
    /// Heading for an anomaly
    Exploring,
}

impl ProbeState {
    pub fn name(&self) -> &'static str {
        match self {
            ProbeState::Idle => "idle",
            ProbeState::TravelingToResource => "traveling_to_resource",
            ProbeState::TravelingToResourceForResearch => "traveling_to_resource_for_research",
            ProbeState::ReturningToColony => "returning_to_colony",
            ProbeState::Exploring => "exploring",
        }
    }
}

/// Ephemeral point of interest that pays out a one-time bonus to the colony
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyTarget {
    pub position: Position,
}

/// What a probe is currently heading for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Star(Entity),
    Colony,
    Anomaly(AnomalyTarget),
}

/// Capacity-bounded inventory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub held: Resources,
    pub capacity: Resources,
}

impl Cargo {
    pub fn new(capacity: Resources) -> Self {
        Self {
            held: Resources::ZERO,
            capacity,
        }
    }

    pub fn remaining(&self, kind: ResourceKind) -> u64 {
        self.capacity.get(kind).saturating_sub(self.held.get(kind))
    }

    /// True while the hold for `kind` is below capacity
    pub fn needs(&self, kind: ResourceKind) -> bool {
        self.remaining(kind) > 0
    }

    /// Kinds still below capacity, in declared order
    pub fn needed_kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        ResourceKind::ALL
            .into_iter()
            .filter(move |&k| self.needs(k))
    }

    pub fn is_full(&self) -> bool {
        self.needed_kinds().next().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Load as much of `amount` as fits, returning what was loaded
    pub fn load(&mut self, kind: ResourceKind, amount: u64) -> u64 {
        let loaded = amount.min(self.remaining(kind));
        *self.held.get_mut(kind) += loaded;
        loaded
    }

    /// Empty the hold, returning its contents
    pub fn unload(&mut self) -> Resources {
        std::mem::take(&mut self.held)
    }
}

/// A self-replicating mining probe.
///
/// Stars are referenced by entity handle only; the visited set doubles as
/// the probe's knowledge of which stars are already claimed or drained.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Travel distance per tick
    pub speed: f32,
    /// Units extracted per tick, per kind
    pub mining_rate: Resources,
    pub cargo: Cargo,
    pub target: Option<Target>,
    pub state: ProbeState,
    pub visited: HashSet<Entity>,
}

impl Probe {
    pub fn new(speed: f32, mining_rate: Resources, capacity: Resources) -> Self {
        Self {
            speed,
            mining_rate,
            cargo: Cargo::new(capacity),
            target: None,
            state: ProbeState::Idle,
            visited: HashSet::new(),
        }
    }

    pub fn set_target(&mut self, target: Target, state: ProbeState) {
        self.target = Some(target);
        self.state = state;
    }

    /// Drop the current target and go idle
    pub fn clear_target(&mut self) {
        self.target = None;
        self.state = ProbeState::Idle;
    }

    pub fn has_visited(&self, star: Entity) -> bool {
        self.visited.contains(&star)
    }

    /// Teach `other` every star this probe knows about.
    ///
    /// One-directional set union; calling it again with unchanged sets is a no-op.
    pub fn communicate(&self, other: &mut Probe) -> bool {
        other.absorb(&self.visited)
    }

    /// Merge `knowledge` into the visited set, returning whether anything was new
    pub fn absorb(&mut self, knowledge: &HashSet<Entity>) -> bool {
        let before = self.visited.len();
        self.visited.extend(knowledge.iter().copied());
        self.visited.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn capacity() -> Resources {
        Resources::new(200, 200, 200, 100)
    }

    #[test]
    fn test_cargo_needs_and_load() {
        let mut cargo = Cargo::new(Resources::new(10, 10, 10, 5));
        assert!(cargo.is_empty());
        assert_eq!(cargo.needed_kinds().count(), 4);

        assert_eq!(cargo.load(ResourceKind::Minerals, 25), 10);
        assert!(!cargo.needs(ResourceKind::Minerals));
        assert_eq!(
            cargo.needed_kinds().collect::<Vec<_>>(),
            vec![ResourceKind::Gases, ResourceKind::Energy, ResourceKind::Research]
        );

        cargo.load(ResourceKind::Gases, 10);
        cargo.load(ResourceKind::Energy, 10);
        cargo.load(ResourceKind::Research, 5);
        assert!(cargo.is_full());

        let unloaded = cargo.unload();
        assert_eq!(unloaded, Resources::new(10, 10, 10, 5));
        assert!(cargo.is_empty());
        assert_eq!(cargo.capacity, Resources::new(10, 10, 10, 5));
    }

    #[test]
    fn test_set_and_clear_target() {
        let mut probe = Probe::new(2.0, Resources::splat(2), capacity());
        probe.set_target(Target::Colony, ProbeState::ReturningToColony);
        assert_eq!(probe.target, Some(Target::Colony));
        assert_eq!(probe.state, ProbeState::ReturningToColony);

        probe.clear_target();
        assert!(probe.target.is_none());
        assert_eq!(probe.state, ProbeState::Idle);
    }

    #[test]
    fn test_communicate_is_one_directional_and_idempotent() {
        let mut world = World::new();
        let s1 = world.spawn(());
        let s2 = world.spawn(());

        let mut a = Probe::new(2.0, Resources::splat(2), capacity());
        let mut b = Probe::new(2.0, Resources::splat(2), capacity());
        a.visited.insert(s1);
        b.visited.insert(s2);

        assert!(a.communicate(&mut b));
        assert!(b.has_visited(s1));
        assert!(!a.has_visited(s2));

        // Second identical call changes nothing
        let snapshot = b.visited.clone();
        assert!(!a.communicate(&mut b));
        assert_eq!(b.visited, snapshot);
    }
}
