//! Galaxy generation - noise-guided rejection sampling of star positions

use hecs::{Entity, World};
use rand::Rng;

use super::DensityField;
use crate::components::{Position, Star};
use crate::config::{ConfigError, GalaxyConfig};

/// A star's handle together with its (immutable) position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarEntry {
    pub entity: Entity,
    pub position: Position,
}

/// Generated starfield layout.
///
/// Star entries are ordered by distance from the world center once, at
/// construction, so that probes scanning the list explore outward.
#[derive(Debug, Clone)]
pub struct Galaxy {
    pub stars: Vec<StarEntry>,
    pub width: f32,
    pub height: f32,
}

impl Galaxy {
    /// Index every star entity already in `world`
    pub fn from_world(world: &World, width: f32, height: f32) -> Self {
        let mut stars: Vec<StarEntry> = world
            .query::<(&Position, &Star)>()
            .iter()
            .map(|(entity, (pos, _))| StarEntry {
                entity,
                position: *pos,
            })
            .collect();

        let center = Position::new(width / 2.0, height / 2.0);
        stars.sort_by(|a, b| {
            a.position
                .distance_squared(&center)
                .partial_cmp(&b.position.distance_squared(&center))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Self {
            stars,
            width,
            height,
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StarEntry> {
        self.stars.iter()
    }
}

/// Generate a starfield in the ECS world.
///
/// Candidates are drawn uniformly over the world and kept only where the
/// density field exceeds the configured threshold and no accepted star lies
/// within the minimum distance. The spacing check scans every accepted star;
/// this runs once at setup, never per tick.
pub fn generate_galaxy(
    world: &mut World,
    config: &GalaxyConfig,
    field: &impl DensityField,
    rng: &mut impl Rng,
) -> Result<Galaxy, ConfigError> {
    config.validate()?;

    let placements = place_stars(config, field, rng)?;
    for (position, size_mod) in placements {
        let star = Star::random(rng, size_mod, config.material_range, config.research_range);
        world.spawn((position, star));
    }

    let galaxy = Galaxy::from_world(world, config.width, config.height);
    log::info!(
        "Generated galaxy: {} stars over {}x{}",
        galaxy.len(),
        config.width,
        config.height
    );
    Ok(galaxy)
}

/// Rejection-sample star positions and their size modifiers
fn place_stars(
    config: &GalaxyConfig,
    field: &impl DensityField,
    rng: &mut impl Rng,
) -> Result<Vec<(Position, f32)>, ConfigError> {
    let mut placed: Vec<(Position, f32)> = Vec::with_capacity(config.star_count);
    let min_distance_sq = config.min_star_distance * config.min_star_distance;

    for _ in 0..config.star_count {
        let mut accepted = None;

        for _ in 0..config.max_attempts_per_star {
            let x = rng.gen_range(0.0..config.width);
            let y = rng.gen_range(0.0..config.height);

            let density = field.density(x as f64, y as f64);
            if density <= config.density_threshold {
                continue;
            }

            let candidate = Position::new(x, y);
            let crowded = placed
                .iter()
                .any(|(p, _)| p.distance_squared(&candidate) < min_distance_sq);
            if crowded {
                continue;
            }

            // Denser regions get bigger stars
            let size_mod = 1.0 + (density - config.density_threshold) as f32 * config.size_gain;
            accepted = Some((candidate, size_mod));
            break;
        }

        match accepted {
            Some(star) => placed.push(star),
            None => {
                return Err(ConfigError::GalaxySaturated {
                    placed: placed.len(),
                    requested: config.star_count,
                })
            }
        }
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{perlin_field, UniformField};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GalaxyConfig {
        GalaxyConfig {
            width: 1000.0,
            height: 1000.0,
            star_count: 300,
            ..Default::default()
        }
    }

    fn star_positions(world: &World) -> Vec<Position> {
        world
            .query::<(&Position, &Star)>()
            .iter()
            .map(|(_, (p, _))| *p)
            .collect()
    }

    #[test]
    fn test_generates_requested_count() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1);
        let config = small_config();
        let field = perlin_field(1, &config.noise);

        let galaxy = generate_galaxy(&mut world, &config, &field, &mut rng).unwrap();
        assert_eq!(galaxy.len(), 300);
        assert_eq!(star_positions(&world).len(), 300);
    }

    #[test]
    fn test_min_spacing_holds() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(2);
        let config = small_config();
        let field = perlin_field(2, &config.noise);
        generate_galaxy(&mut world, &config, &field, &mut rng).unwrap();

        let positions = star_positions(&world);
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(b) >= config.min_star_distance);
            }
        }
    }

    #[test]
    fn test_stars_inside_world_and_sized_by_density() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        let config = small_config();
        generate_galaxy(&mut world, &config, &UniformField(0.9), &mut rng).unwrap();

        let expected_size = 1.0 + (0.9 - config.density_threshold) as f32 * config.size_gain;
        for (_, (pos, star)) in world.query::<(&Position, &Star)>().iter() {
            assert!(pos.x >= 0.0 && pos.x < config.width);
            assert!(pos.y >= 0.0 && pos.y < config.height);
            assert!((star.size_mod - expected_size).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sorted_by_distance_from_center() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(4);
        let config = small_config();
        let galaxy =
            generate_galaxy(&mut world, &config, &UniformField(0.5), &mut rng).unwrap();

        let center = galaxy.center();
        let distances: Vec<f32> = galaxy
            .iter()
            .map(|s| s.position.distance(&center))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_same_seed_same_galaxy() {
        let config = small_config();
        let build = || {
            let mut world = World::new();
            let mut rng = StdRng::seed_from_u64(5);
            let field = perlin_field(5, &config.noise);
            let galaxy = generate_galaxy(&mut world, &config, &field, &mut rng).unwrap();
            galaxy
                .iter()
                .map(|s| (s.position.x, s.position.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_field_below_threshold_saturates() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(6);
        let config = GalaxyConfig {
            star_count: 5,
            max_attempts_per_star: 50,
            ..small_config()
        };

        let result = generate_galaxy(&mut world, &config, &UniformField(0.05), &mut rng);
        assert!(matches!(
            result,
            Err(ConfigError::GalaxySaturated { placed: 0, requested: 5 })
        ));
    }

    #[test]
    fn test_overcrowded_world_saturates() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(7);
        let config = GalaxyConfig {
            width: 20.0,
            height: 20.0,
            star_count: 50,
            min_star_distance: 15.0,
            max_attempts_per_star: 200,
            ..Default::default()
        };

        let result = generate_galaxy(&mut world, &config, &UniformField(1.0), &mut rng);
        assert!(matches!(result, Err(ConfigError::GalaxySaturated { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(8);
        let config = GalaxyConfig {
            height: 0.0,
            ..small_config()
        };
        let result = generate_galaxy(&mut world, &config, &UniformField(1.0), &mut rng);
        assert!(matches!(result, Err(ConfigError::InvalidWorldSize { .. })));
    }
}
