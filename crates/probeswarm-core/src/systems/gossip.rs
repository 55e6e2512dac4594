//! Knowledge sharing - probes in communication range pool their visited sets

use std::collections::{BTreeMap, HashSet};

use hecs::{Entity, World};

use crate::components::{Position, Probe};
use crate::spatial::SpatialGrid;

/// Per-tick snapshot of probe handles and positions.
///
/// Slot `i` in the spatial grid refers to `entities[i]`. Buffers are reused
/// across ticks.
#[derive(Debug, Default, Clone)]
pub struct ProbeRoster {
    pub entities: Vec<Entity>,
    pub positions: Vec<Position>,
}

impl ProbeRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-collect every probe and re-bucket the grid from current positions
    pub fn rebuild(&mut self, world: &World, grid: &mut SpatialGrid) {
        self.entities.clear();
        self.positions.clear();
        for (entity, (pos, _)) in world.query::<(&Position, &Probe)>().iter() {
            self.entities.push(entity);
            self.positions.push(*pos);
        }
        grid.rebuild(&self.positions);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Union-find over roster slots
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
    }
}

/// Share visited-star knowledge between probes within `radius`.
///
/// Contact is transitive within a tick: every probe in a connected group
/// ends up with the union of the group's visited sets, regardless of the
/// order probes were collected in. Knowledge only grows, so running this
/// twice on an unchanged swarm changes nothing. The pooled result is what
/// repeated pairwise [`Probe::communicate`] along in-range links would reach
/// once nothing changes, computed in one pass per group.
///
/// `grid` must have been rebuilt from `roster` with cells no smaller than
/// `radius`. Returns the number of probes that learned something.
pub fn gossip_system(
    world: &World,
    grid: &SpatialGrid,
    roster: &ProbeRoster,
    radius: f32,
) -> usize {
    debug_assert!(grid.cell_size() >= radius);
    debug_assert_eq!(grid.len(), roster.len());

    let mut groups = DisjointSet::new(roster.len());
    for slot in 0..roster.len() {
        grid.neighbors_within(slot, radius, &mut |other| {
            if other > slot {
                groups.union(slot, other);
            }
        });
    }

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for slot in 0..roster.len() {
        members.entry(groups.find(slot)).or_default().push(slot);
    }

    let mut changed = 0;
    let mut pooled: HashSet<Entity> = HashSet::new();
    for group in members.values().filter(|g| g.len() > 1) {
        pooled.clear();
        for &slot in group {
            if let Ok(probe) = world.get::<&Probe>(roster.entities[slot]) {
                pooled.extend(probe.visited.iter().copied());
            }
        }
        for &slot in group {
            if let Ok(mut probe) = world.get::<&mut Probe>(roster.entities[slot]) {
                if probe.absorb(&pooled) {
                    changed += 1;
                }
            }
        }
    }

    if changed > 0 {
        log::trace!("Gossip updated {} probes", changed);
    }
    changed
}
