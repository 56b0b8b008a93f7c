// ============================================================================
// grid.rs — LifeRewind
// Fixed-size boolean cell grid and the Game of Life step function.
// ============================================================================

use rand::Rng;

/// A `width × height` matrix of boolean cells, row-major. The shape is fixed
/// at construction; cells outside the grid are permanently dead (no wrap).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        self.cells[y * self.width + x] = alive;
    }

    /// Row-major cell slice, for upload to the renderer.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Kill every cell.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Turn roughly `fill` of all cells alive (OR-ed onto the existing
    /// pattern). Used by the noise command and the headless soup.
    pub fn sprinkle<R: Rng>(&mut self, rng: &mut R, fill: f64) {
        let fill = fill.clamp(0.0, 1.0);
        for cell in &mut self.cells {
            if rng.gen_bool(fill) {
                *cell = true;
            }
        }
    }

    /// Compute the next generation under standard Life rules:
    /// a live cell survives with 2 or 3 live Moore neighbors, a dead cell is
    /// born with exactly 3. Edge and corner cells count only the neighbors
    /// that exist.
    ///
    /// Pure: `self` is untouched and the result depends on nothing else.
    pub fn step(&self) -> Grid {
        let mut next = Grid::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let n = self.live_neighbors(x, y);
                let alive = if self.get(x, y) {
                    n == 2 || n == 3
                } else {
                    n == 3
                };
                next.cells[y * self.width + x] = alive;
            }
        }
        next
    }

    fn live_neighbors(&self, x: usize, y: usize) -> u32 {
        let mut count = 0;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
                    continue;
                }
                if self.cells[ny as usize * self.width + nx as usize] {
                    count += 1;
                }
            }
        }
        count
    }
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(width: usize, height: usize, live: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(width, height);
        for &(x, y) in live {
            grid.set(x, y, true);
        }
        grid
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let gen0 = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        let gen1 = gen0.step();
        let gen2 = gen1.step();

        assert_eq!(gen1, grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]));
        assert_eq!(gen2, gen0);
    }

    #[test]
    fn step_does_not_mutate_input() {
        let gen0 = grid_with(4, 4, &[(0, 0), (1, 0), (0, 1)]);
        let copy = gen0.clone();
        let _ = gen0.step();
        assert_eq!(gen0, copy);
    }

    #[test]
    fn block_in_corner_is_stable() {
        let block = grid_with(4, 4, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(block.step(), block);
    }

    #[test]
    fn lone_corner_cell_dies() {
        // The original implementation froze the outermost ring of cells;
        // here every cell is processed, so an isolated corner cell starves.
        let grid = grid_with(4, 4, &[(0, 0)]);
        assert_eq!(grid.step().population(), 0);
    }

    #[test]
    fn birth_on_exactly_three_neighbors() {
        let grid = grid_with(3, 3, &[(0, 1), (1, 0), (1, 2)]);
        assert!(grid.step().get(1, 1));
    }

    #[test]
    fn overcrowded_cell_dies() {
        let grid = grid_with(
            3,
            3,
            &[(1, 1), (0, 0), (1, 0), (2, 0), (0, 1)],
        );
        assert!(!grid.step().get(1, 1));
    }

    #[test]
    fn neighbors_do_not_wrap_around_edges() {
        // Two cells on opposite vertical edges: with wraparound they would
        // be neighbors; without it they are isolated and die.
        let grid = grid_with(5, 3, &[(0, 1), (4, 1)]);
        assert_eq!(grid.step().population(), 0);
    }
}
