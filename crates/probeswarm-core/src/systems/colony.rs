//! Colony automation - treasury, research, probe replication and lab construction

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use super::probe::spawn_probe;
use crate::components::{Position, Probe, Resources};
use crate::config::{ColonyConfig, SimConfig};
use crate::generation::Galaxy;

/// Lifetime counters, for status displays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonyStats {
    pub probes_built: u64,
    pub labs_built: u64,
    /// Everything probes have unloaded at the colony
    pub delivered: Resources,
    /// Everything paid out by anomalies
    pub anomaly_income: Resources,
    pub anomalies_explored: u64,
}

/// The central colony (singleton).
///
/// Sits at the world center, collects probe deliveries, and spends its
/// treasury on research, new probes and research labs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colony {
    pub position: Position,
    pub treasury: Resources,
    pub research_labs: u32,
    /// Ticks until another probe may be built
    pub probe_construction_timer: u32,
    /// Ticks until another lab may be built
    pub lab_construction_timer: u32,
    pub probe_speed_researched: bool,
    pub stats: ColonyStats,
}

impl Colony {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            treasury: Resources::ZERO,
            research_labs: 0,
            probe_construction_timer: 0,
            lab_construction_timer: 0,
            probe_speed_researched: false,
            stats: ColonyStats::default(),
        }
    }

    /// Add resources to the treasury. There is no upper bound.
    pub fn deposit(&mut self, minerals: u64, gases: u64, energy: u64, research: u64) {
        self.treasury
            .add(&Resources::new(minerals, gases, energy, research));
    }

    /// Unload a probe's cargo into the treasury
    pub fn deliver(&mut self, cargo: &Resources) {
        self.treasury.add(cargo);
        self.stats.delivered.add(cargo);
    }

    /// Pay out an anomaly bonus of `amount` per material kind
    pub fn receive_bonus(&mut self, amount: u64) {
        let bonus = Resources::new(amount, amount, amount, 0);
        self.treasury.add(&bonus);
        self.stats.anomaly_income.add(&bonus);
        self.stats.anomalies_explored += 1;
    }

    /// Speed given to newly built probes
    pub fn probe_speed(&self, config: &SimConfig) -> f32 {
        if self.probe_speed_researched {
            config.probe.base_speed + config.colony.speed_upgrade_bonus
        } else {
            config.probe.base_speed
        }
    }

    /// One-time speed upgrade; returns true on the tick it completes
    pub fn research_probe_speed_upgrade(&mut self, config: &ColonyConfig) -> bool {
        if self.probe_speed_researched || self.treasury.research < config.speed_upgrade_cost {
            return false;
        }
        self.treasury.research -= config.speed_upgrade_cost;
        self.probe_speed_researched = true;
        log::info!("Probe speed upgrade researched");
        true
    }

    /// Whether every gate for probe construction is open
    pub fn ready_to_construct_probe(&self, population: usize, config: &ColonyConfig) -> bool {
        population < config.max_probes
            && self.treasury.minerals > config.construction_threshold
            && self.treasury.gases > config.construction_threshold
            && self.probe_construction_timer == 0
    }

    /// Whether every gate for lab construction is open
    pub fn ready_to_build_lab(&self, config: &ColonyConfig) -> bool {
        self.lab_construction_timer == 0
            && self.treasury.minerals > config.lab_cost.minerals + config.lab_buffer
            && self.treasury.gases > config.lab_cost.gases + config.lab_buffer
    }

    /// Pay for and build a research lab
    pub fn build_research_lab(&mut self, config: &ColonyConfig) -> bool {
        if !self.treasury.consume(&config.lab_cost) {
            return false;
        }
        self.research_labs += 1;
        self.lab_construction_timer = config.lab_cooldown;
        self.stats.labs_built += 1;
        log::info!("Research lab built ({} total)", self.research_labs);
        true
    }
}

/// Run one tick of colony automation.
///
/// Order is fixed: research, probe construction, construction cooldown,
/// lab research income, lab construction, lab cooldown. Research and both
/// construction steps draw on the same treasury.
///
/// Returns the newly built probe, if any.
pub fn colony_system(
    world: &mut World,
    colony: &mut Colony,
    galaxy: &Galaxy,
    config: &SimConfig,
) -> Option<Entity> {
    let policy = &config.colony;

    colony.research_probe_speed_upgrade(policy);

    let population = world.query::<&Probe>().iter().count();
    let mut built = None;
    if colony.ready_to_construct_probe(population, policy)
        && colony.treasury.consume(&policy.replication_cost)
    {
        let speed = colony.probe_speed(config);
        let probe = spawn_probe(world, galaxy, &config.probe, colony.position, speed);
        colony.probe_construction_timer = policy.construction_cooldown;
        colony.stats.probes_built += 1;
        log::info!(
            "Colony built probe #{} (speed {:.1}, population {})",
            colony.stats.probes_built,
            speed,
            population + 1
        );
        built = Some(probe);
    }

    if colony.probe_construction_timer > 0 {
        colony.probe_construction_timer -= 1;
    }

    let income = colony.research_labs as u64 * policy.lab_research_rate;
    colony.treasury.research = colony.treasury.research.saturating_add(income);

    if colony.ready_to_build_lab(policy) {
        colony.build_research_lab(policy);
    }

    if colony.lab_construction_timer > 0 {
        colony.lab_construction_timer -= 1;
    }

    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Star;

    fn setup() -> (World, Galaxy, Colony, SimConfig) {
        let mut world = World::new();
        world.spawn((Position::new(120.0, 100.0), Star::new(1.0, Resources::splat(100))));
        let galaxy = Galaxy::from_world(&world, 200.0, 200.0);
        let colony = Colony::new(galaxy.center());
        (world, galaxy, colony, SimConfig::default())
    }

    fn probe_count(world: &World) -> usize {
        world.query::<&Probe>().iter().count()
    }

    #[test]
    fn test_deposit_is_unbounded() {
        let mut colony = Colony::new(Position::default());
        colony.deposit(5, 6, 7, 0);
        colony.deposit(u64::MAX, 0, 0, 9);
        assert_eq!(colony.treasury.minerals, u64::MAX);
        assert_eq!(colony.treasury.gases, 6);
        assert_eq!(colony.treasury.research, 9);
    }

    #[test]
    fn test_single_probe_built_from_deposit() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(250, 250, 0, 0);

        let built = colony_system(&mut world, &mut colony, &galaxy, &config);

        assert!(built.is_some());
        assert_eq!(probe_count(&world), 1);
        assert_eq!(colony.treasury.minerals, 180);
        assert_eq!(colony.treasury.gases, 180);
        assert_eq!(colony.treasury.energy, 0);
        // Cooldown set then ticked once
        assert_eq!(
            colony.probe_construction_timer,
            config.colony.construction_cooldown - 1
        );
    }

    #[test]
    fn test_new_probe_gets_target_immediately() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(250, 250, 0, 0);
        let probe = colony_system(&mut world, &mut colony, &galaxy, &config).unwrap();

        let probe = world.get::<&Probe>(probe).unwrap();
        assert!(probe.target.is_some());
        assert_eq!(probe.speed, config.probe.base_speed);
    }

    #[test]
    fn test_threshold_is_strict() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(200, 1000, 0, 0);
        assert!(colony_system(&mut world, &mut colony, &galaxy, &config).is_none());
        assert_eq!(colony.treasury.minerals, 200);
    }

    #[test]
    fn test_cooldown_spaces_construction() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(10_000, 10_000, 0, 0);

        let mut built_ticks = Vec::new();
        for tick in 0..250 {
            if colony_system(&mut world, &mut colony, &galaxy, &config).is_some() {
                built_ticks.push(tick);
            }
        }

        assert_eq!(built_ticks, vec![0, 100, 200]);
    }

    #[test]
    fn test_population_cap_blocks_construction() {
        let (mut world, galaxy, mut colony, mut config) = setup();
        config.colony.max_probes = 2;
        for _ in 0..2 {
            spawn_probe(&mut world, &galaxy, &config.probe, colony.position, 2.0);
        }
        colony.deposit(1_000_000, 1_000_000, 0, 0);

        for _ in 0..500 {
            assert!(colony_system(&mut world, &mut colony, &galaxy, &config).is_none());
        }
        assert_eq!(probe_count(&world), 2);
    }

    #[test]
    fn test_speed_upgrade_researched_once() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(0, 0, 0, 400);

        colony_system(&mut world, &mut colony, &galaxy, &config);
        assert!(colony.probe_speed_researched);
        assert_eq!(colony.treasury.research, 250);

        colony_system(&mut world, &mut colony, &galaxy, &config);
        assert_eq!(colony.treasury.research, 250);
    }

    #[test]
    fn test_upgraded_colony_builds_faster_probes() {
        let (mut world, galaxy, mut colony, config) = setup();
        colony.deposit(250, 250, 0, 150);

        let probe = colony_system(&mut world, &mut colony, &galaxy, &config).unwrap();
        let probe = world.get::<&Probe>(probe).unwrap();
        assert_eq!(
            probe.speed,
            config.probe.base_speed + config.colony.speed_upgrade_bonus
        );
    }

    #[test]
    fn test_lab_built_with_buffer_and_produces_research() {
        let (mut world, galaxy, mut colony, mut config) = setup();
        config.colony.max_probes = 1;
        spawn_probe(&mut world, &galaxy, &config.probe, colony.position, 2.0);
        colony.deposit(1401, 1001, 0, 0);

        colony_system(&mut world, &mut colony, &galaxy, &config);
        assert_eq!(colony.research_labs, 1);
        assert_eq!(colony.treasury.minerals, 601);
        assert_eq!(colony.treasury.gases, 601);
        assert_eq!(colony.lab_construction_timer, config.colony.lab_cooldown - 1);
        // Income accrues from the next tick on
        assert_eq!(colony.treasury.research, 0);

        colony_system(&mut world, &mut colony, &galaxy, &config);
        assert_eq!(colony.treasury.research, config.colony.lab_research_rate);
    }

    #[test]
    fn test_lab_needs_buffer_above_cost() {
        let (mut world, galaxy, mut colony, mut config) = setup();
        config.colony.max_probes = 1;
        spawn_probe(&mut world, &galaxy, &config.probe, colony.position, 2.0);
        colony.deposit(1400, 1000, 0, 0);

        colony_system(&mut world, &mut colony, &galaxy, &config);
        assert_eq!(colony.research_labs, 0);
    }

    #[test]
    fn test_probe_construction_precedes_lab() {
        let (mut world, galaxy, mut colony, config) = setup();
        // Enough for a lab only if the probe is not paid for first
        colony.deposit(1450, 1050, 0, 0);

        let built = colony_system(&mut world, &mut colony, &galaxy, &config);
        assert!(built.is_some());
        assert_eq!(colony.research_labs, 0);
        assert_eq!(colony.treasury.minerals, 1380);
    }
}
