// src/map/analysis.rs

//! Topology checks over a carved grid. Open cells are the nodes and every pair of
//! 4-adjacent open cells is an edge; a perfect maze is a single tree.

use serde::Serialize;
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::map::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MazeStats {
    pub open_cells: usize,
    pub wall_cells: usize,
    /// Pairs of 4-adjacent open cells.
    pub passages: usize,
    pub components: usize,
    /// Edges that closed a loop when added.
    pub cycles: usize,
}

impl MazeStats {
    pub fn of(grid: &Grid) -> Self {
        let (width, depth) = (grid.width(), grid.depth());
        let mut sets: QuickUnionUf<UnionBySize> = QuickUnionUf::new(width * depth);
        let mut stats = MazeStats::default();

        for (x, z, _) in grid.cells() {
            if !grid.is_open(x, z) {
                stats.wall_cells += 1;
                continue;
            }
            stats.open_cells += 1;
            let here = x * depth + z;
            for (nx, nz) in [(x + 1, z), (x, z + 1)] {
                if grid.is_open(nx, nz) {
                    stats.passages += 1;
                    if !sets.union(here, nx * depth + nz) {
                        stats.cycles += 1;
                    }
                }
            }
        }

        let mut roots: Vec<usize> = grid
            .cells()
            .filter(|(x, z, _)| grid.is_open(*x, *z))
            .map(|(x, z, _)| sets.find(x * depth + z))
            .collect();
        roots.sort_unstable();
        roots.dedup();
        stats.components = roots.len();
        stats
    }

    /// Connected and acyclic over at least one open cell.
    pub fn is_perfect(&self) -> bool {
        self.open_cells > 0
            && self.components == 1
            && self.cycles == 0
            && self.passages + 1 == self.open_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::grid::CellState;

    fn open(grid: &mut Grid, cells: &[(usize, usize)]) {
        for &(x, z) in cells {
            grid.set(x, z, CellState::Open).unwrap();
        }
    }

    #[test]
    fn test_corridor_is_perfect() {
        let mut grid = Grid::new(5, 1);
        open(&mut grid, &[(0, 0), (1, 0), (2, 0)]);
        let stats = MazeStats::of(&grid);
        assert_eq!(stats.open_cells, 3);
        assert_eq!(stats.passages, 2);
        assert!(stats.is_perfect());
    }

    #[test]
    fn test_loop_detected() {
        let mut grid = Grid::new(2, 2);
        open(&mut grid, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        let stats = MazeStats::of(&grid);
        assert_eq!(stats.cycles, 1);
        assert!(!stats.is_perfect());
    }

    #[test]
    fn test_split_components_detected() {
        let mut grid = Grid::new(3, 1);
        open(&mut grid, &[(0, 0), (2, 0)]);
        let stats = MazeStats::of(&grid);
        assert_eq!(stats.components, 2);
        assert!(!stats.is_perfect());
    }

    #[test]
    fn test_all_walls_is_not_perfect() {
        let stats = MazeStats::of(&Grid::new(3, 3));
        assert_eq!(stats.wall_cells, 9);
        assert!(!stats.is_perfect());
    }
}
