use crate::particle::ParticleSet;
use crate::types::ParticleIndex;
use glam::Vec2;
use std::collections::HashMap;

/// A uniform spatial hash over particle positions, rebuilt every frame.
///
/// The grid buckets particle indices by the fixed-size cell their current
/// position falls in, which bounds pairwise neighbor search to the 3×3
/// block of cells around a particle instead of the whole set.
///
/// The cell size must be chosen so that any two particles close enough to
/// interact (separation padding plus both radii) land in the same or an
/// adjacent cell; [`SpatialGrid::rebuild`] takes it as a parameter because
/// it depends on the population's density scale.
///
/// Cells are keyed by the `(x, y)` cell coordinate pair directly. Vectors
/// for cells that stay occupied between frames keep their allocations;
/// cells left empty by a rebuild are dropped.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<ParticleIndex>>,
    inv_cell_size: f32,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
            inv_cell_size: 1.0,
        }
    }

    /// Rebuilds the grid from the current particle positions.
    ///
    /// The previous frame's contents are discarded entirely; there is no
    /// incremental update. A frame must rebuild before querying so that
    /// lookups always reflect that frame's pre-update positions.
    ///
    /// ### Parameters
    /// - `set` - The particle set to index.
    /// - `cell_size` - Edge length of one grid cell; must be positive.
    pub fn rebuild(&mut self, set: &ParticleSet, cell_size: f32) {
        self.inv_cell_size = 1.0 / cell_size;

        // Keep allocations for cells that were occupied last frame.
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        for (index, particle) in set.particles.iter().enumerate() {
            let cell = self.cell_of(particle.pos);
            self.cells.entry(cell).or_default().push(index);
        }

        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Returns the cell coordinate containing a position.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x * self.inv_cell_size).floor() as i32,
            (pos.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Visits every particle index in the 3×3 block of cells around `pos`,
    /// excluding `index` itself.
    ///
    /// The union of those cells is a superset of all particles within one
    /// cell size of `pos`; callers still apply their own distance test.
    ///
    /// ### Parameters
    /// - `index` - The querying particle, excluded from the visit.
    /// - `pos` - The querying particle's position.
    /// - `f` - Callback invoked once per candidate neighbor index.
    pub fn for_each_neighbor(
        &self,
        index: ParticleIndex,
        pos: Vec2,
        mut f: impl FnMut(ParticleIndex),
    ) {
        let (cx, cy) = self.cell_of(pos);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &other in bucket {
                    if other != index {
                        f(other);
                    }
                }
            }
        }
    }

    /// Number of occupied cells, mainly for diagnostics.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::FILLER_COLOR;
    use crate::particle::Particle;

    fn set_with_positions(positions: &[(f32, f32)]) -> ParticleSet {
        let mut set = ParticleSet::new();
        for &(x, y) in positions {
            set.push(Particle::new(
                Vec2::new(x, y),
                4.0,
                FILLER_COLOR,
                1.0,
                None,
                0,
                0.0,
            ));
        }
        set
    }

    fn neighbors_of(grid: &SpatialGrid, index: usize, pos: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        grid.for_each_neighbor(index, pos, |j| out.push(j));
        out.sort_unstable();
        out
    }

    #[test]
    fn rebuild_on_empty_set_yields_no_cells() {
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set_with_positions(&[]), 50.0);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn same_cell_particles_are_neighbors() {
        let set = set_with_positions(&[(10.0, 10.0), (12.0, 11.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);

        assert_eq!(neighbors_of(&grid, 0, set.particles[0].pos), vec![1]);
        assert_eq!(neighbors_of(&grid, 1, set.particles[1].pos), vec![0]);
    }

    #[test]
    fn adjacent_cell_particles_are_neighbors() {
        // Cell size 50: positions straddle the x = 50 cell boundary.
        let set = set_with_positions(&[(49.0, 10.0), (51.0, 10.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);

        assert_eq!(neighbors_of(&grid, 0, set.particles[0].pos), vec![1]);
    }

    #[test]
    fn distant_particles_are_not_neighbors() {
        let set = set_with_positions(&[(0.0, 0.0), (500.0, 500.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);

        assert!(neighbors_of(&grid, 0, set.particles[0].pos).is_empty());
        assert!(neighbors_of(&grid, 1, set.particles[1].pos).is_empty());
    }

    #[test]
    fn query_never_yields_the_querying_index() {
        let set = set_with_positions(&[(10.0, 10.0), (10.0, 10.0), (11.0, 10.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);

        for i in 0..set.len() {
            let neighbors = neighbors_of(&grid, i, set.particles[i].pos);
            assert!(!neighbors.contains(&i));
            assert_eq!(neighbors.len(), 2);
        }
    }

    #[test]
    fn rebuild_reflects_moved_positions() {
        let mut set = set_with_positions(&[(10.0, 10.0), (12.0, 10.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);
        assert_eq!(neighbors_of(&grid, 0, set.particles[0].pos), vec![1]);

        // Move the second particle far away; a rebuild must not see the
        // stale bucket.
        set.particles[1].pos = Vec2::new(1000.0, 1000.0);
        grid.rebuild(&set, 50.0);
        assert!(neighbors_of(&grid, 0, set.particles[0].pos).is_empty());
    }

    #[test]
    fn negative_coordinates_bucket_correctly() {
        let set = set_with_positions(&[(-10.0, -10.0), (-12.0, -11.0)]);
        let mut grid = SpatialGrid::new();
        grid.rebuild(&set, 50.0);

        assert_eq!(neighbors_of(&grid, 0, set.particles[0].pos), vec![1]);
    }
}
