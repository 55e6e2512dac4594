//! Probe behavior - target selection, travel, mining and delivery

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::Rng;

use super::colony::Colony;
use crate::components::{AnomalyTarget, Position, Probe, ProbeState, ResourceKind, Star, Target};
use crate::config::ProbeConfig;
use crate::generation::Galaxy;

/// Spawn a probe at `position` and give it a first target straight away
pub fn spawn_probe(
    world: &mut World,
    galaxy: &Galaxy,
    config: &ProbeConfig,
    position: Position,
    speed: f32,
) -> Entity {
    let mut probe = Probe::new(speed, config.mining_rate, config.cargo_capacity);
    select_target(world, galaxy, position, &mut probe);
    world.spawn((position, probe))
}

/// Pick the next target for an idle probe.
///
/// Preference order: head home when every hold is full; otherwise the
/// nearest unvisited star holding the first material kind still needed
/// (minerals, gases, energy); then the nearest holding research; then the
/// nearest with any stock at all. With nothing left to claim the probe
/// goes home if it carries anything and stays idle if not.
///
/// The chosen star is marked visited immediately, so a probe never claims
/// the same star twice on one trip.
pub fn select_target(world: &World, galaxy: &Galaxy, position: Position, probe: &mut Probe) {
    if probe.cargo.is_full() {
        probe.set_target(Target::Colony, ProbeState::ReturningToColony);
        return;
    }

    for kind in ResourceKind::MATERIALS {
        if !probe.cargo.needs(kind) {
            continue;
        }
        if let Some(star) = nearest_star(world, galaxy, position, &probe.visited, |s| {
            s.stock.get(kind) > 0
        }) {
            claim(probe, star, ProbeState::TravelingToResource);
            return;
        }
    }

    if probe.cargo.needs(ResourceKind::Research) {
        if let Some(star) = nearest_star(world, galaxy, position, &probe.visited, |s| {
            s.stock.research > 0
        }) {
            claim(probe, star, ProbeState::TravelingToResourceForResearch);
            return;
        }
    }

    if let Some(star) = nearest_star(world, galaxy, position, &probe.visited, |s| {
        !s.is_depleted()
    }) {
        claim(probe, star, ProbeState::TravelingToResource);
        return;
    }

    if probe.cargo.is_empty() {
        probe.clear_target();
    } else {
        probe.set_target(Target::Colony, ProbeState::ReturningToColony);
    }
}

fn claim(probe: &mut Probe, star: Entity, state: ProbeState) {
    probe.visited.insert(star);
    probe.set_target(Target::Star(star), state);
    log::debug!("Probe claimed star {:?} ({})", star, state.name());
}

/// Nearest star not in `visited` that satisfies `eligible`.
///
/// Ties go to the star listed first in the galaxy (closest to the center).
fn nearest_star(
    world: &World,
    galaxy: &Galaxy,
    from: Position,
    visited: &HashSet<Entity>,
    eligible: impl Fn(&Star) -> bool,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for entry in galaxy.iter() {
        if visited.contains(&entry.entity) {
            continue;
        }
        let dist_sq = entry.position.distance_squared(&from);
        if best.map_or(false, |(_, best_sq)| dist_sq >= best_sq) {
            continue;
        }
        let Ok(star) = world.get::<&Star>(entry.entity) else {
            continue;
        };
        if eligible(&star) {
            best = Some((entry.entity, dist_sq));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Outcome of one mining attempt at a star
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MiningOutcome {
    /// Extracted something and the star still has stock
    Mined,
    /// Extracted the star's last units
    Exhausted,
    /// Nothing the probe wants is left here
    Blocked,
    /// Drained before the probe arrived
    Depleted,
}

fn mine_star(world: &World, probe: &mut Probe, entity: Entity) -> MiningOutcome {
    let Ok(mut star) = world.get::<&mut Star>(entity) else {
        return MiningOutcome::Depleted;
    };
    if star.is_depleted() {
        return MiningOutcome::Depleted;
    }

    let kind = if probe.state == ProbeState::TravelingToResourceForResearch {
        Some(ResourceKind::Research)
    } else {
        ResourceKind::MATERIALS
            .into_iter()
            .find(|&k| probe.cargo.needs(k) && star.stock.get(k) > 0)
    };
    let Some(kind) = kind else {
        return MiningOutcome::Blocked;
    };

    let request = probe
        .mining_rate
        .get(kind)
        .min(probe.cargo.remaining(kind));
    let mined = star.mine(kind, request);
    if mined == 0 {
        return MiningOutcome::Blocked;
    }
    probe.cargo.load(kind, mined);
    star.visits += 1;
    log::trace!("Mined {} {} from star {:?}", mined, kind, entity);

    if star.is_depleted() {
        MiningOutcome::Exhausted
    } else {
        MiningOutcome::Mined
    }
}

fn arrive_at_star(
    world: &World,
    galaxy: &Galaxy,
    position: Position,
    probe: &mut Probe,
    star: Entity,
) {
    let outcome = mine_star(world, probe, star);
    match outcome {
        MiningOutcome::Mined => {}
        MiningOutcome::Exhausted => {
            log::debug!("Star {:?} exhausted", star);
            probe.clear_target();
            select_target(world, galaxy, position, probe);
        }
        MiningOutcome::Blocked | MiningOutcome::Depleted => {
            probe.clear_target();
            select_target(world, galaxy, position, probe);
        }
    }
}

fn arrive_at_colony(colony: &mut Colony, probe: &mut Probe) {
    let cargo = probe.cargo.unload();
    colony.deliver(&cargo);
    probe.visited.clear();
    probe.clear_target();
    log::debug!(
        "Probe delivered {} units ({} minerals, {} gases, {} energy, {} research)",
        cargo.total(),
        cargo.minerals,
        cargo.gases,
        cargo.energy,
        cargo.research
    );
}

fn arrive_at_anomaly(
    colony: &mut Colony,
    probe: &mut Probe,
    bonus: (u64, u64),
    rng: &mut impl Rng,
) {
    let amount = rng.gen_range(bonus.0..=bonus.1);
    colony.receive_bonus(amount);
    probe.clear_target();
    log::info!("Anomaly explored, colony gains {} of each material", amount);
}

/// Send `probe` to explore an anomaly at `position`
pub fn dispatch_to_anomaly(probe: &mut Probe, position: Position) {
    probe.set_target(
        Target::Anomaly(AnomalyTarget { position }),
        ProbeState::Exploring,
    );
}

/// Advance every probe by one tick.
///
/// An idle probe selects a target and does not move. Otherwise it steps
/// toward its target; on reaching it, the arrival effect (mine, deliver or
/// explore) happens in the same tick.
pub fn probe_system(
    world: &mut World,
    galaxy: &Galaxy,
    colony: &mut Colony,
    anomaly_bonus: (u64, u64),
    rng: &mut impl Rng,
) {
    // Probes and stars live in different archetypes, so star lookups
    // below never alias the probe borrow held by this query.
    let world = &*world;
    for (_, (position, probe)) in world.query::<(&mut Position, &mut Probe)>().iter() {
        step_probe(world, galaxy, colony, position, probe, anomaly_bonus, rng);
    }
}

fn step_probe(
    world: &World,
    galaxy: &Galaxy,
    colony: &mut Colony,
    position: &mut Position,
    probe: &mut Probe,
    anomaly_bonus: (u64, u64),
    rng: &mut impl Rng,
) {
    let Some(target) = probe.target else {
        select_target(world, galaxy, *position, probe);
        return;
    };

    let destination = match target {
        Target::Star(star) => match world.get::<&Position>(star) {
            Ok(pos) => *pos,
            Err(_) => {
                probe.clear_target();
                select_target(world, galaxy, *position, probe);
                return;
            }
        },
        Target::Colony => colony.position,
        Target::Anomaly(anomaly) => anomaly.position,
    };

    if !position.step_toward(destination, probe.speed) {
        return;
    }

    match target {
        Target::Star(star) => arrive_at_star(world, galaxy, *position, probe, star),
        Target::Colony => arrive_at_colony(colony, probe),
        Target::Anomaly(_) => arrive_at_anomaly(colony, probe, anomaly_bonus, rng),
    }
}
