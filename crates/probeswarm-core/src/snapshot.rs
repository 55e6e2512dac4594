//! Read-only views of the simulation for presentation layers.
//!
//! Snapshots are plain data detached from the ECS world, so a renderer or
//! harness can hold onto them while the engine keeps ticking.

use hecs::{Entity, World};
use serde::Serialize;

use crate::components::{Cargo, Position, Probe, ProbeState, Resources, Star, Target};
use crate::generation::Galaxy;
use crate::systems::Colony;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarSnapshot {
    #[serde(skip)]
    pub entity: Entity,
    pub position: Position,
    pub size_mod: f32,
    pub color: [u8; 3],
    pub stock: Resources,
    pub visits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColonySnapshot {
    pub position: Position,
    pub treasury: Resources,
    pub research_labs: u32,
    pub probe_speed_researched: bool,
    pub probe_construction_timer: u32,
    pub lab_construction_timer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeSnapshot {
    #[serde(skip)]
    pub entity: Entity,
    pub position: Position,
    pub state: ProbeState,
    pub cargo: Cargo,
    pub speed: f32,
    /// Where the probe is heading, for drawing target lines
    pub target_position: Option<Position>,
    pub known_stars: usize,
}

/// What sits under a hover point
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    Colony(ColonySnapshot),
    Star(StarSnapshot),
    Probe(ProbeSnapshot),
}

/// Everything visible at one tick
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub colony: ColonySnapshot,
    pub stars: Vec<StarSnapshot>,
    pub probes: Vec<ProbeSnapshot>,
}

impl ColonySnapshot {
    pub fn capture(colony: &Colony) -> Self {
        Self {
            position: colony.position,
            treasury: colony.treasury,
            research_labs: colony.research_labs,
            probe_speed_researched: colony.probe_speed_researched,
            probe_construction_timer: colony.probe_construction_timer,
            lab_construction_timer: colony.lab_construction_timer,
        }
    }
}

impl WorldSnapshot {
    pub fn capture(world: &World, galaxy: &Galaxy, colony: &Colony, tick: u64) -> Self {
        let stars = galaxy
            .iter()
            .filter_map(|entry| {
                let star = world.get::<&Star>(entry.entity).ok()?;
                Some(StarSnapshot {
                    entity: entry.entity,
                    position: entry.position,
                    size_mod: star.size_mod,
                    color: star.color,
                    stock: star.stock,
                    visits: star.visits,
                })
            })
            .collect();

        let mut probes: Vec<ProbeSnapshot> = world
            .query::<(&Position, &Probe)>()
            .iter()
            .map(|(entity, (pos, probe))| ProbeSnapshot {
                entity,
                position: *pos,
                state: probe.state,
                cargo: probe.cargo,
                speed: probe.speed,
                target_position: probe
                    .target
                    .and_then(|target| target_position(world, colony, target)),
                known_stars: probe.visited.len(),
            })
            .collect();
        // hecs iteration order follows archetype layout, not spawn order
        probes.sort_by_key(|p| p.entity.id());

        Self {
            tick,
            colony: ColonySnapshot::capture(colony),
            stars,
            probes,
        }
    }

    /// Nearest colony, star or probe within `radius` of `point`.
    ///
    /// On equal distance probes win over stars and stars over the colony,
    /// since probes are drawn on top.
    pub fn entity_at(&self, point: Position, radius: f32) -> Option<HoverTarget> {
        let radius_sq = radius * radius;
        let mut best: Option<(f32, HoverTarget)> = None;
        let mut consider = |dist_sq: f32, hit: &dyn Fn() -> HoverTarget| {
            if dist_sq > radius_sq {
                return;
            }
            if best.as_ref().map_or(true, |(best_sq, _)| dist_sq <= *best_sq) {
                best = Some((dist_sq, hit()));
            }
        };

        consider(self.colony.position.distance_squared(&point), &|| {
            HoverTarget::Colony(self.colony.clone())
        });
        for star in &self.stars {
            consider(star.position.distance_squared(&point), &|| {
                HoverTarget::Star(star.clone())
            });
        }
        for probe in &self.probes {
            consider(probe.position.distance_squared(&point), &|| {
                HoverTarget::Probe(probe.clone())
            });
        }

        best.map(|(_, hit)| hit)
    }
}

fn target_position(world: &World, colony: &Colony, target: Target) -> Option<Position> {
    match target {
        Target::Star(star) => world.get::<&Position>(star).ok().map(|p| *p),
        Target::Colony => Some(colony.position),
        Target::Anomaly(anomaly) => Some(anomaly.position),
    }
}
