// ============================================================================
// metrics.rs — LifeRewind
// Grid statistics for the HUD and the history population plot.
// ============================================================================

use crate::grid::Grid;
use crate::history::HistoryRing;

/// Statistics of one displayed frame.
#[derive(Clone, Copy, Debug)]
pub struct GridStats {
    pub population: usize,
    /// Live fraction of all cells.
    pub density: f32,
}

impl GridStats {
    pub fn from_grid(grid: &Grid) -> Self {
        let population = grid.population();
        let cells = grid.width() * grid.height();
        Self {
            population,
            density: population as f32 / cells as f32,
        }
    }
}

/// Population of every retained frame, oldest first, as plot points
/// (x = offset from tail, y = live cells).
pub fn population_series(ring: &HistoryRing) -> Vec<[f64; 2]> {
    (0..ring.len())
        .map(|offset| {
            let snapshot = ring.read(offset).expect("offset within window");
            [offset as f64, snapshot.grid.population() as f64]
        })
        .collect()
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_live_cells() {
        let mut grid = Grid::new(10, 10);
        grid.set(0, 0, true);
        grid.set(5, 5, true);
        grid.set(9, 9, true);

        let stats = GridStats::from_grid(&grid);
        assert_eq!(stats.population, 3);
        assert!((stats.density - 0.03).abs() < 1e-6);
    }

    #[test]
    fn series_covers_the_whole_window_oldest_first() {
        let mut ring = HistoryRing::new(8, 4, 4);
        for generation in 1..=3 {
            ring.advance_head();
            let mut grid = Grid::new(4, 4);
            for x in 0..generation {
                grid.set(x, 0, true);
            }
            ring.write_head(grid);
        }

        let series = population_series(&ring);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], [0.0, 0.0]);
        assert_eq!(series[3], [3.0, 3.0]);
    }
}
