//! Uniform-grid broad phase for probe neighborhood queries.
//!
//! The grid is rebuilt from scratch every tick. Cells are at least as wide
//! as the communication radius, so every probe within range of another sits
//! in the same or an adjacent cell and a 3×3 block scan finds it.

use std::collections::HashMap;

use crate::components::Position;
use crate::config::ConfigError;

type CellKey = (i32, i32);

/// Bucketed agent slots keyed by grid cell.
///
/// Entries are plain slot indices into the position slice passed to
/// [`SpatialGrid::rebuild`]; the grid never owns agents. Buckets of cells
/// that stay occupied are cleared rather than dropped between rebuilds, so
/// a settled swarm does not reallocate.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
    slot_cells: Vec<CellKey>,
    positions: Vec<Position>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Result<Self, ConfigError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            slot_cells: Vec::new(),
            positions: Vec::new(),
        })
    }

    /// Grid sized for `capacity` agents up front
    pub fn with_capacity(cell_size: f32, capacity: usize) -> Result<Self, ConfigError> {
        let mut grid = Self::new(cell_size)?;
        grid.cells.reserve(capacity);
        grid.slot_cells.reserve(capacity);
        grid.positions.reserve(capacity);
        Ok(grid)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_of(&self, pos: Position) -> CellKey {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Re-bucket every agent. Slot `i` refers to `positions[i]`.
    pub fn rebuild(&mut self, positions: &[Position]) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.slot_cells.clear();
        self.positions.clear();
        self.positions.extend_from_slice(positions);

        for (slot, &pos) in positions.iter().enumerate() {
            let key = self.cell_of(pos);
            self.cells.entry(key).or_default().push(slot);
            self.slot_cells.push(key);
        }

        // Forget cells nobody occupies any more so the map tracks the swarm
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    pub fn len(&self) -> usize {
        self.slot_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_cells.is_empty()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Every slot in the 3×3 block of cells around `slot`, including `slot`.
    ///
    /// These are candidates only; callers still apply a distance check.
    pub fn query_neighbors(&self, slot: usize) -> impl Iterator<Item = usize> + '_ {
        self.slot_cells
            .get(slot)
            .copied()
            .into_iter()
            .flat_map(move |center| self.block_around(center))
    }

    fn block_around(&self, (cx, cy): CellKey) -> impl Iterator<Item = usize> + '_ {
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Visit every other slot within `radius` of `slot`
    pub fn neighbors_within(&self, slot: usize, radius: f32, visitor: &mut dyn FnMut(usize)) {
        let Some(&center) = self.positions.get(slot) else {
            return;
        };
        let radius_sq = radius * radius;
        for other in self.query_neighbors(slot) {
            if other != slot && self.positions[other].distance_squared(&center) <= radius_sq {
                visitor(other);
            }
        }
    }
}
