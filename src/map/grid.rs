// src/map/grid.rs

use crate::error::{MazeError, Result};

/// Occupancy of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellState {
    Open = 0,
    Wall = 1,
}

/// The maze occupancy grid, `width` cells along `x` by `depth` cells along `z`.
/// Cells are stored `x`-major so iteration order matches the layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    depth: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a grid with every cell set to [`CellState::Wall`].
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            cells: vec![CellState::Wall; width * depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_in_bounds(&self, x: usize, z: usize) -> bool {
        x < self.width && z < self.depth
    }

    fn index(&self, x: usize, z: usize) -> Result<usize> {
        if self.is_in_bounds(x, z) {
            Ok(x * self.depth + z)
        } else {
            Err(MazeError::OutOfRange {
                x,
                z,
                width: self.width,
                depth: self.depth,
            })
        }
    }

    pub fn get(&self, x: usize, z: usize) -> Result<CellState> {
        let idx = self.index(x, z)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, x: usize, z: usize, state: CellState) -> Result<()> {
        let idx = self.index(x, z)?;
        self.cells[idx] = state;
        Ok(())
    }

    pub fn is_open(&self, x: usize, z: usize) -> bool {
        matches!(self.get(x, z), Ok(CellState::Open))
    }

    /// Iterates `(x, z, state)` with `x` in the outer loop.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        let depth = self.depth;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (i / depth, i % depth, *state))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|c| **c == state).count()
    }

    /// One text row per `z`, `#` for walls and `.` for open cells.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.depth);
        for z in 0..self.depth {
            for x in 0..self.width {
                out.push(match self.cells[x * self.depth + z] {
                    CellState::Wall => '#',
                    CellState::Open => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

/// Cells reached by one carving pass. Only ever grows.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    depth: usize,
    flags: Vec<bool>,
    len: usize,
}

impl VisitedSet {
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            depth: grid.depth(),
            flags: vec![false; grid.width() * grid.depth()],
            len: 0,
        }
    }

    /// Marks a cell as visited; returns `false` if it already was.
    pub fn insert(&mut self, x: usize, z: usize) -> bool {
        let idx = x * self.depth + z;
        match self.flags.get_mut(idx) {
            Some(flag) if !*flag => {
                *flag = true;
                self.len += 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, x: usize, z: usize) -> bool {
        self.flags
            .get(x * self.depth + z)
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_walls() {
        let grid = Grid::new(5, 3);
        assert_eq!(grid.count(CellState::Wall), 15);
        assert_eq!(grid.count(CellState::Open), 0);
    }

    #[test]
    fn test_get_set() {
        let mut grid = Grid::new(4, 4);
        grid.set(3, 1, CellState::Open).unwrap();
        assert_eq!(grid.get(3, 1).unwrap(), CellState::Open);
        assert_eq!(grid.get(1, 3).unwrap(), CellState::Wall);
        assert!(grid.is_open(3, 1));
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = Grid::new(4, 2);
        assert!(!grid.is_in_bounds(4, 0));
        assert!(!grid.is_in_bounds(0, 2));
        match grid.get(4, 0) {
            Err(MazeError::OutOfRange { x, z, width, depth }) => {
                assert_eq!((x, z, width, depth), (4, 0, 4, 2));
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
        assert!(grid.set(0, 9, CellState::Open).is_err());
    }

    #[test]
    fn test_cells_iterate_x_major() {
        let grid = Grid::new(2, 3);
        let coords: Vec<(usize, usize)> = grid.cells().map(|(x, z, _)| (x, z)).collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_render_ascii() {
        let mut grid = Grid::new(3, 2);
        grid.set(1, 0, CellState::Open).unwrap();
        assert_eq!(grid.render_ascii(), "#.#\n###\n");
    }

    #[test]
    fn test_visited_set_grows() {
        let grid = Grid::new(3, 3);
        let mut visited = VisitedSet::for_grid(&grid);
        assert!(visited.is_empty());
        assert!(visited.insert(2, 2));
        assert!(!visited.insert(2, 2));
        assert!(visited.contains(2, 2));
        assert!(!visited.contains(0, 0));
        assert_eq!(visited.len(), 1);
    }
}
