//! Simulation configuration - every tunable threshold, cost and radius.
//!
//! A [`SimConfig`] is handed to the engine at construction and never
//! mutated afterwards. Defaults reproduce the reference tuning; any subset
//! of fields can be overridden from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{ResourceKind, Resources};

/// Upper bound on any configured stock or bonus amount
pub const MAX_STOCK: u64 = u32::MAX as u64;

/// Errors raised while validating a configuration or generating a galaxy
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("world size must be positive and finite, got {width}x{height}")]
    InvalidWorldSize { width: f32, height: f32 },
    #[error("star count must be at least 1")]
    InvalidStarCount,
    #[error("minimum star distance must be non-negative and finite, got {0}")]
    InvalidMinStarDistance(f32),
    #[error("density threshold must lie in [0, 1), got {0}")]
    InvalidDensityThreshold(f64),
    #[error("invalid noise parameters: {0}")]
    InvalidNoise(&'static str),
    #[error("invalid {name} range: {min}..={max}")]
    InvalidRange {
        name: &'static str,
        min: u64,
        max: u64,
    },
    #[error("{name} range upper bound {max} exceeds the limit of {limit}")]
    RangeTooLarge {
        name: &'static str,
        max: u64,
        limit: u64,
    },
    #[error("probe mining rate for {0} must be at least 1")]
    ZeroMiningRate(ResourceKind),
    #[error("probe cargo capacity for {0} must be at least 1")]
    ZeroCargoCapacity(ResourceKind),
    #[error("probe speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),
    #[error("speed upgrade bonus must be non-negative and finite, got {0}")]
    InvalidSpeedBonus(f32),
    #[error("communication radius must be positive and finite, got {0}")]
    InvalidCommunicationRadius(f32),
    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("lab cooldown ({lab}) must be longer than the probe construction cooldown ({probe})")]
    InvalidCooldowns { probe: u32, lab: u32 },
    #[error("population cap must be at least 1")]
    InvalidPopulationCap,
    #[error("initial probe count {initial} exceeds the population cap {cap}")]
    InvalidInitialProbes { initial: usize, cap: usize },
    #[error("galaxy saturated: placed {placed} of {requested} stars before running out of attempts")]
    GalaxySaturated { placed: usize, requested: usize },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coherent noise parameters for the star density field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// World units per noise unit; larger values give broader clusters
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 100.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::InvalidNoise("scale must be positive"));
        }
        if self.octaves == 0 {
            return Err(ConfigError::InvalidNoise("octaves must be at least 1"));
        }
        if !(self.persistence.is_finite() && self.persistence > 0.0) {
            return Err(ConfigError::InvalidNoise("persistence must be positive"));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return Err(ConfigError::InvalidNoise("lacunarity must be positive"));
        }
        Ok(())
    }
}

/// Procedural starfield parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    pub width: f32,
    pub height: f32,
    pub star_count: usize,
    /// No two stars are placed closer than this
    pub min_star_distance: f32,
    /// Normalized noise value a candidate point must exceed
    pub density_threshold: f64,
    /// Size multiplier gained per unit of noise above the threshold
    pub size_gain: f32,
    /// Inclusive range each material stock is mapped into
    pub material_range: (u64, u64),
    /// Inclusive range research stock is drawn from
    pub research_range: (u64, u64),
    /// Candidate samples allowed per requested star before giving up
    pub max_attempts_per_star: u32,
    pub noise: NoiseConfig,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            width: 4000.0,
            height: 4000.0,
            star_count: 2000,
            min_star_distance: 15.0,
            density_threshold: 0.1,
            size_gain: 0.5,
            material_range: (50, 200),
            research_range: (20, 100),
            max_attempts_per_star: 10_000,
            noise: NoiseConfig::default(),
        }
    }
}

impl GalaxyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_side = |v: f32| v.is_finite() && v > 0.0;
        if !valid_side(self.width) || !valid_side(self.height) {
            return Err(ConfigError::InvalidWorldSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.star_count == 0 {
            return Err(ConfigError::InvalidStarCount);
        }
        if !(self.min_star_distance.is_finite() && self.min_star_distance >= 0.0) {
            return Err(ConfigError::InvalidMinStarDistance(self.min_star_distance));
        }
        if !(0.0..1.0).contains(&self.density_threshold) {
            return Err(ConfigError::InvalidDensityThreshold(self.density_threshold));
        }
        validate_range("material", self.material_range)?;
        validate_range("research", self.research_range)?;
        self.noise.validate()
    }

    /// World center, where the colony sits
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Defaults for newly built probes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub base_speed: f32,
    pub mining_rate: Resources,
    pub cargo_capacity: Resources,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            mining_rate: Resources::splat(2),
            cargo_capacity: Resources::new(200, 200, 200, 100),
        }
    }
}

/// Colony automation policy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Hard ceiling on the probe population
    pub max_probes: usize,
    /// Deducted per probe built (energy is free)
    pub replication_cost: Resources,
    /// Minerals and gases must both exceed this before a probe is built
    pub construction_threshold: u64,
    /// Ticks between probe constructions
    pub construction_cooldown: u32,
    pub speed_upgrade_cost: u64,
    pub speed_upgrade_bonus: f32,
    pub lab_cost: Resources,
    /// Extra minerals and gases held back on top of the lab cost
    pub lab_buffer: u64,
    /// Research produced per lab per tick
    pub lab_research_rate: u64,
    /// Ticks between lab constructions
    pub lab_cooldown: u32,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            max_probes: 100,
            replication_cost: Resources::new(70, 70, 0, 0),
            construction_threshold: 200,
            construction_cooldown: 100,
            speed_upgrade_cost: 150,
            speed_upgrade_bonus: 1.0,
            lab_cost: Resources::new(800, 400, 0, 0),
            lab_buffer: 600,
            lab_research_rate: 1,
            lab_cooldown: 200,
        }
    }
}

/// Top-level simulation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the galaxy noise and every random draw of the run
    pub seed: u64,
    pub galaxy: GalaxyConfig,
    pub probe: ProbeConfig,
    pub colony: ColonyConfig,
    /// Probes within this distance share visited-star knowledge
    pub communication_radius: f32,
    /// Probes present at tick zero
    pub initial_probes: usize,
    /// Inclusive range of the per-material anomaly bonus
    pub anomaly_bonus: (u64, u64),
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            galaxy: GalaxyConfig::default(),
            probe: ProbeConfig::default(),
            colony: ColonyConfig::default(),
            communication_radius: 200.0,
            initial_probes: 1,
            anomaly_bonus: (20, 50),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.galaxy.validate()?;
        self.validate_probes()?;
        self.validate_colony()?;
        validate_range("anomaly bonus", self.anomaly_bonus)?;
        if !(self.communication_radius.is_finite() && self.communication_radius > 0.0) {
            return Err(ConfigError::InvalidCommunicationRadius(
                self.communication_radius,
            ));
        }
        Ok(())
    }

    fn validate_probes(&self) -> Result<(), ConfigError> {
        let speed = self.probe.base_speed;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(speed));
        }
        for kind in ResourceKind::ALL {
            if self.probe.mining_rate.get(kind) == 0 {
                return Err(ConfigError::ZeroMiningRate(kind));
            }
            if self.probe.cargo_capacity.get(kind) == 0 {
                return Err(ConfigError::ZeroCargoCapacity(kind));
            }
        }
        Ok(())
    }

    fn validate_colony(&self) -> Result<(), ConfigError> {
        let colony = &self.colony;
        if colony.max_probes == 0 {
            return Err(ConfigError::InvalidPopulationCap);
        }
        if self.initial_probes > colony.max_probes {
            return Err(ConfigError::InvalidInitialProbes {
                initial: self.initial_probes,
                cap: colony.max_probes,
            });
        }
        let bonus = colony.speed_upgrade_bonus;
        if !(bonus.is_finite() && bonus >= 0.0) {
            return Err(ConfigError::InvalidSpeedBonus(bonus));
        }
        if colony.lab_cooldown <= colony.construction_cooldown {
            return Err(ConfigError::InvalidCooldowns {
                probe: colony.construction_cooldown,
                lab: colony.lab_cooldown,
            });
        }
        Ok(())
    }
}

fn validate_range(name: &'static str, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvalidRange { name, min, max });
    }
    if max > MAX_STOCK {
        return Err(ConfigError::RangeTooLarge {
            name,
            max,
            limit: MAX_STOCK,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn lab_cooldown_exceeds_probe_cooldown() {
        let colony = ColonyConfig::default();
        assert!(colony.lab_cooldown > colony.construction_cooldown);
    }

    #[test]
    fn rejects_non_positive_world() {
        let mut config = SimConfig::default();
        config.galaxy.width = -10.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorldSize { .. })
        ));
    }

    #[test]
    fn rejects_zero_star_count() {
        let mut config = SimConfig::default();
        config.galaxy.star_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStarCount)
        ));
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut config = SimConfig::default();
        config.galaxy.material_range = (200, 50);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { name: "material", .. })
        ));
    }

    #[test]
    fn rejects_oversized_stock_ranges() {
        let mut config = SimConfig::default();
        config.galaxy.material_range = (0, u64::MAX / 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RangeTooLarge { name: "material", .. })
        ));

        let mut config = SimConfig::default();
        config.galaxy.research_range = (0, MAX_STOCK);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_zero_mining_rate_or_capacity() {
        let mut config = SimConfig::default();
        config.probe.mining_rate.gases = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroMiningRate(ResourceKind::Gases))
        ));

        let mut config = SimConfig::default();
        config.probe.cargo_capacity.research = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCargoCapacity(ResourceKind::Research))
        ));
    }

    #[test]
    fn rejects_lab_cooldown_not_longer() {
        let mut config = SimConfig::default();
        config.colony.lab_cooldown = config.colony.construction_cooldown;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCooldowns { .. })
        ));
    }

    #[test]
    fn rejects_bad_radius_and_speed() {
        let mut config = SimConfig::default();
        config.communication_radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.probe.base_speed = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpeed(_))));
    }

    #[test]
    fn rejects_initial_probes_over_cap() {
        let mut config = SimConfig::default();
        config.initial_probes = config.colony.max_probes + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInitialProbes { .. })
        ));
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let json = r#"{
            "seed": 42,
            "galaxy": { "star_count": 300, "width": 1000.0, "height": 1000.0 },
            "colony": { "max_probes": 25 }
        }"#;
        let config = SimConfig::from_json(json).unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.galaxy.star_count, 300);
        assert_eq!(config.galaxy.min_star_distance, 15.0);
        assert_eq!(config.colony.max_probes, 25);
        assert_eq!(config.colony.construction_threshold, 200);
        assert_eq!(config.probe, ProbeConfig::default());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        let json = r#"{ "galaxy": { "star_count": 0 } }"#;
        assert!(matches!(
            SimConfig::from_json(json),
            Err(ConfigError::InvalidStarCount)
        ));
        assert!(matches!(
            SimConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
