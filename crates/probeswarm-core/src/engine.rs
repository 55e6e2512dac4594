//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::{ConfigError, SimConfig};
use crate::generation::{generate_galaxy, perlin_field, DensityField, Galaxy};
use crate::snapshot::WorldSnapshot;
use crate::spatial::SpatialGrid;
use crate::systems::*;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing every star and probe
    pub world: World,
    /// Star handles in distance-from-center order
    pub galaxy: Galaxy,
    /// The central colony
    pub colony: Colony,
    config: SimConfig,
    grid: SpatialGrid,
    roster: ProbeRoster,
    rng: StdRng,
    tick: u64,
}

impl SimulationEngine {
    /// Build a galaxy from the configured Perlin field and seed the colony
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = perlin_field(config.seed, &config.galaxy.noise);
        Self::with_field(config, &field)
    }

    /// Same as [`SimulationEngine::new`] but with a caller-supplied density field
    pub fn with_field(config: SimConfig, field: &impl DensityField) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut world = World::new();
        let galaxy = generate_galaxy(&mut world, &config.galaxy, field, &mut rng)?;
        let colony = Colony::new(galaxy.center());

        let speed = colony.probe_speed(&config);
        for _ in 0..config.initial_probes {
            spawn_probe(&mut world, &galaxy, &config.probe, colony.position, speed);
        }

        let mut grid =
            SpatialGrid::with_capacity(config.communication_radius, config.colony.max_probes)?;
        let mut roster = ProbeRoster::new();
        roster.rebuild(&world, &mut grid);

        log::info!(
            "Simulation ready: seed {}, {} stars, {} probes",
            config.seed,
            galaxy.len(),
            config.initial_probes
        );

        Ok(Self {
            world,
            galaxy,
            colony,
            config,
            grid,
            roster,
            rng,
            tick: 0,
        })
    }

    /// Run `ticks` fixed steps
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn step(&mut self) {
        probe_system(
            &mut self.world,
            &self.galaxy,
            &mut self.colony,
            self.config.anomaly_bonus,
            &mut self.rng,
        );

        colony_system(&mut self.world, &mut self.colony, &self.galaxy, &self.config);

        self.roster.rebuild(&self.world, &mut self.grid);
        gossip_system(
            &self.world,
            &self.grid,
            &self.roster,
            self.config.communication_radius,
        );

        self.tick += 1;
    }

    /// Ticks completed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn probe_count(&self) -> usize {
        self.world.query::<&Probe>().iter().count()
    }

    pub fn star_count(&self) -> usize {
        self.galaxy.len()
    }

    pub fn depleted_star_count(&self) -> usize {
        self.world
            .query::<&Star>()
            .iter()
            .filter(|(_, star)| star.is_depleted())
            .count()
    }

    /// Stock left across every star
    pub fn total_star_stock(&self) -> Resources {
        let mut total = Resources::ZERO;
        for (_, star) in self.world.query::<&Star>().iter() {
            total.add(&star.stock);
        }
        total
    }

    /// Cargo currently aboard probes
    pub fn cargo_in_transit(&self) -> Resources {
        let mut total = Resources::ZERO;
        for (_, probe) in self.world.query::<&Probe>().iter() {
            total.add(&probe.cargo.held);
        }
        total
    }

    /// Probes grouped by behavior state, in declaration order
    pub fn probes_by_state(&self) -> Vec<(ProbeState, usize)> {
        let states = [
            ProbeState::Idle,
            ProbeState::TravelingToResource,
            ProbeState::TravelingToResourceForResearch,
            ProbeState::ReturningToColony,
            ProbeState::Exploring,
        ];
        let mut counts = [0usize; 5];
        for (_, probe) in self.world.query::<&Probe>().iter() {
            if let Some(i) = states.iter().position(|s| *s == probe.state) {
                counts[i] += 1;
            }
        }
        states.into_iter().zip(counts).collect()
    }

    /// Send `probe` to explore an anomaly at `position`.
    ///
    /// Returns false if `probe` is not a live probe.
    pub fn dispatch_to_anomaly(&mut self, probe: Entity, position: Position) -> bool {
        match self.world.get::<&mut Probe>(probe) {
            Ok(mut probe) => {
                dispatch_to_anomaly(&mut probe, position);
                true
            }
            Err(_) => false,
        }
    }

    /// Detached view of the current tick.
    ///
    /// Capture once per frame and run hover queries against the result with
    /// [`WorldSnapshot::entity_at`].
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, &self.galaxy, &self.colony, self.tick)
    }
}
