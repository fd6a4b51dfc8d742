// src/map/carver.rs

//! Randomized recursive-backtracking carver.
//!
//! The walk moves over a step-2 lattice starting at `(0, 0)`: lattice cells sit on
//! even coordinates, and carving a passage opens the destination cell together with
//! the midpoint between it and the current cell. The recursion is unrolled into an
//! explicit stack so large mazes cannot exhaust the call stack; draws from the random
//! source happen in exactly the same order as in the recursive formulation.

use log::debug;
use rand::Rng;

use crate::error::Result;
use crate::map::grid::{CellState, Grid, VisitedSet};

/// Distance between two lattice cells.
pub const STEP: usize = 2;

/// Outcome of a single [`MazeCarver::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarveStep {
    /// A passage was opened from `from` into the previously unvisited `to`.
    Advanced { from: (usize, usize), to: (usize, usize) },
    /// `cell` was exhausted and the walk returned to its parent.
    Backtracked { cell: (usize, usize) },
    /// The start cell has no unvisited neighbours left.
    Finished,
}

/// Lattice cells next to `(x, z)` that have not been visited yet.
///
/// The scan only ever yields one neighbour per axis: `-x` if it qualifies, otherwise
/// `+x`; then `-z`, otherwise `+z`. A move to `-x` needs `x > STEP` and a move to `+x`
/// needs `x < width - STEP` (likewise along `z`), so the walk never steps back onto
/// coordinate `0` once it has left it.
pub fn unvisited_neighbors(
    (x, z): (usize, usize),
    width: usize,
    depth: usize,
    visited: &VisitedSet,
) -> Vec<(usize, usize)> {
    let mut neighbors = Vec::with_capacity(2);
    let min = STEP as i64;
    let max_x = width as i64 - STEP as i64;
    let max_z = depth as i64 - STEP as i64;
    let (xi, zi) = (x as i64, z as i64);

    if xi > min && !visited.contains(x - STEP, z) {
        neighbors.push((x - STEP, z));
    } else if xi < max_x && !visited.contains(x + STEP, z) {
        neighbors.push((x + STEP, z));
    }

    if zi > min && !visited.contains(x, z - STEP) {
        neighbors.push((x, z - STEP));
    } else if zi < max_z && !visited.contains(x, z + STEP) {
        neighbors.push((x, z + STEP));
    }

    neighbors
}

/// Iterative state of one carving pass. Owns the visited set and the backtracking
/// stack; the grid is borrowed per step so the caller keeps ownership of it.
#[derive(Debug)]
pub struct MazeCarver {
    width: usize,
    depth: usize,
    stack: Vec<(usize, usize)>,
    visited: VisitedSet,
    passages: usize,
}

impl MazeCarver {
    /// Starts a walk at `(0, 0)`. The start cell is opened so the carved cells form a
    /// single connected tree.
    pub fn new(grid: &mut Grid) -> Result<Self> {
        grid.set(0, 0, CellState::Open)?;
        let mut visited = VisitedSet::for_grid(grid);
        visited.insert(0, 0);
        Ok(Self {
            width: grid.width(),
            depth: grid.depth(),
            stack: vec![(0, 0)],
            visited,
            passages: 0,
        })
    }

    /// Advances the walk by one carve or one backtrack.
    pub fn step<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) -> Result<CarveStep> {
        let Some(&current) = self.stack.last() else {
            return Ok(CarveStep::Finished);
        };

        let candidates = unvisited_neighbors(current, self.width, self.depth, &self.visited);
        if candidates.is_empty() {
            self.stack.pop();
            return Ok(if self.stack.is_empty() {
                CarveStep::Finished
            } else {
                CarveStep::Backtracked { cell: current }
            });
        }

        let next = candidates[rng.random_range(0..candidates.len())];
        let midpoint = ((current.0 + next.0) / 2, (current.1 + next.1) / 2);
        grid.set(next.0, next.1, CellState::Open)?;
        grid.set(midpoint.0, midpoint.1, CellState::Open)?;

        self.visited.insert(next.0, next.1);
        self.stack.push(next);
        self.passages += 1;
        Ok(CarveStep::Advanced { from: current, to: next })
    }

    pub fn is_finished(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of passages opened so far.
    pub fn passages(&self) -> usize {
        self.passages
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Carves `grid` to completion without suspending. Returns the passage count.
    pub fn carve<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<usize> {
        let mut carver = MazeCarver::new(grid)?;
        while carver.step(grid, rng)? != CarveStep::Finished {}
        debug!(
            "Carved {} passages over {} lattice cells in a {}x{} grid",
            carver.passages(),
            carver.visited().len(),
            grid.width(),
            grid.depth()
        );
        Ok(carver.passages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::analysis::MazeStats;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Straight recursive formulation, kept as the reference for the iterative walk.
    fn carve_recursive(
        grid: &mut Grid,
        visited: &mut VisitedSet,
        cell: (usize, usize),
        rng: &mut StdRng,
    ) {
        visited.insert(cell.0, cell.1);
        let mut neighbors = unvisited_neighbors(cell, grid.width(), grid.depth(), visited);
        while !neighbors.is_empty() {
            let next = neighbors[rng.random_range(0..neighbors.len())];
            grid.set(next.0, next.1, CellState::Open).unwrap();
            grid.set((cell.0 + next.0) / 2, (cell.1 + next.1) / 2, CellState::Open).unwrap();
            carve_recursive(grid, visited, next, rng);
            neighbors = unvisited_neighbors(cell, grid.width(), grid.depth(), visited);
        }
    }

    #[test]
    fn test_single_cell_finishes_immediately() {
        let mut grid = Grid::new(1, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut carver = MazeCarver::new(&mut grid).unwrap();
        assert_eq!(carver.step(&mut grid, &mut rng).unwrap(), CarveStep::Finished);
        assert_eq!(carver.passages(), 0);
        assert!(carver.is_finished());
        assert_eq!(grid.get(0, 0).unwrap(), CellState::Open);
    }

    #[test]
    fn test_degenerate_strip() {
        let mut grid = Grid::new(2, 9);
        let mut rng = StdRng::seed_from_u64(3);
        MazeCarver::carve(&mut grid, &mut rng).unwrap();
        assert!(MazeStats::of(&grid).is_perfect());
        // No lattice column besides x = 0 fits in a width of 2.
        assert!((0..9).all(|z| grid.get(1, z).unwrap() == CellState::Wall));
    }

    #[test]
    fn test_neighbor_scan_takes_one_per_axis() {
        let grid = Grid::new(11, 11);
        let visited = VisitedSet::for_grid(&grid);
        // Both -x and +x are free, only -x is offered; same for z.
        assert_eq!(unvisited_neighbors((4, 6), 11, 11, &visited), vec![(2, 6), (4, 4)]);
    }

    #[test]
    fn test_neighbor_scan_falls_through_to_positive() {
        let grid = Grid::new(11, 11);
        let mut visited = VisitedSet::for_grid(&grid);
        visited.insert(2, 6);
        visited.insert(4, 4);
        assert_eq!(unvisited_neighbors((4, 6), 11, 11, &visited), vec![(6, 6), (4, 8)]);
    }

    #[test]
    fn test_neighbor_scan_bounds() {
        let grid = Grid::new(7, 7);
        let visited = VisitedSet::for_grid(&grid);
        // x = 2 may not step back to 0; from (4, 4) the negative side wins on both axes.
        assert_eq!(unvisited_neighbors((2, 2), 7, 7, &visited), vec![(4, 2), (2, 4)]);
        assert_eq!(unvisited_neighbors((4, 4), 7, 7, &visited), vec![(2, 4), (4, 2)]);
        assert!(unvisited_neighbors((0, 0), 1, 1, &visited).is_empty());
    }

    #[test]
    fn test_four_by_four_layout() {
        for seed in 0..16 {
            let mut grid = Grid::new(4, 4);
            let mut rng = StdRng::seed_from_u64(seed);
            let passages = MazeCarver::carve(&mut grid, &mut rng).unwrap();
            assert_eq!(passages, 3);
            assert_eq!(grid.count(CellState::Open), 7);
            assert_eq!(grid.count(CellState::Wall), 9);
            assert!(MazeStats::of(&grid).is_perfect());
        }
    }

    #[test]
    fn test_carved_maze_is_perfect() {
        for (w, d) in [(3, 3), (5, 5), (9, 7), (10, 10), (15, 15), (21, 8), (31, 31)] {
            for seed in 0..4 {
                let mut grid = Grid::new(w, d);
                let mut rng = StdRng::seed_from_u64(seed);
                let passages = MazeCarver::carve(&mut grid, &mut rng).unwrap();
                let stats = MazeStats::of(&grid);
                assert!(
                    stats.is_perfect(),
                    "{}x{} seed {} is not perfect: {:?}",
                    w,
                    d,
                    seed,
                    stats
                );
                assert_eq!(stats.open_cells, 2 * passages + 1);
            }
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let mut a = Grid::new(25, 19);
        let mut b = Grid::new(25, 19);
        MazeCarver::carve(&mut a, &mut StdRng::seed_from_u64(42)).unwrap();
        MazeCarver::carve(&mut b, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_iterative_matches_recursive() {
        for seed in 0..8 {
            let mut iterative = Grid::new(17, 13);
            MazeCarver::carve(&mut iterative, &mut StdRng::seed_from_u64(seed)).unwrap();

            let mut recursive = Grid::new(17, 13);
            recursive.set(0, 0, CellState::Open).unwrap();
            let mut visited = VisitedSet::for_grid(&recursive);
            carve_recursive(&mut recursive, &mut visited, (0, 0), &mut StdRng::seed_from_u64(seed));

            assert_eq!(iterative, recursive, "seed {}", seed);
        }
    }

    #[test]
    fn test_step_reports_backtracking() {
        let mut grid = Grid::new(9, 9);
        let mut rng = StdRng::seed_from_u64(7);
        let mut carver = MazeCarver::new(&mut grid).unwrap();
        let mut advanced = 0;
        let mut backtracked = 0;
        loop {
            match carver.step(&mut grid, &mut rng).unwrap() {
                CarveStep::Advanced { from, to } => {
                    assert_eq!(from.0.abs_diff(to.0) + from.1.abs_diff(to.1), STEP);
                    advanced += 1;
                }
                CarveStep::Backtracked { .. } => backtracked += 1,
                CarveStep::Finished => break,
            }
        }
        // Every cell pushed after the start is popped exactly once.
        assert_eq!(advanced, backtracked);
        assert_eq!(carver.visited().len(), advanced + 1);
    }
}
