// ============================================================================
// history.rs — LifeRewind
// Fixed-capacity circular store of grid snapshots with head/tail/target
// cursors. Backs both forward simulation and scrubbing.
// ============================================================================

use thiserror::Error;

use crate::grid::Grid;

/// Contract violations on ring access. These indicate a caller bug, not a
/// recoverable runtime condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RingError {
    #[error("offset {offset} outside the valid window of {len} frames")]
    OutOfRange { offset: usize, len: usize },
}

/// One stored generation. A snapshot with `computed == false` is logically
/// undefined: it must never be displayed or used as a simulation input.
pub struct Snapshot {
    pub grid: Grid,
    pub computed: bool,
}

/// Circular buffer of snapshots, cursor-based; no pointers between slots.
///
/// Walking forward from `tail` to `head` (modulo capacity, inclusive) visits
/// only computed slots; every slot outside that arc is uncomputed or stale.
pub struct HistoryRing {
    slots: Vec<Snapshot>,
    head: usize,
    tail: usize,
    target: usize,
}

impl HistoryRing {
    /// Create a ring of `capacity` slots for `width × height` grids.
    /// Slot 0 starts as the single valid, all-dead frame.
    pub fn new(capacity: usize, width: usize, height: usize) -> Self {
        assert!(capacity >= 2, "history capacity must be at least 2");
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Snapshot {
                grid: Grid::new(width, height),
                computed: false,
            });
        }
        slots[0].computed = true;
        Self {
            slots,
            head: 0,
            tail: 0,
            target: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of valid frames, i.e. the length of the `tail..=head` arc.
    pub fn len(&self) -> usize {
        self.offset_of_head() + 1
    }

    /// Offset of `head` from `tail` within the ring.
    pub fn offset_of_head(&self) -> usize {
        (self.head + self.capacity() - self.tail) % self.capacity()
    }

    /// Slot preceding `slot` in ring order.
    pub fn prev_slot(&self, slot: usize) -> usize {
        debug_assert!(slot < self.capacity());
        (slot + self.capacity() - 1) % self.capacity()
    }

    pub fn is_computed(&self, slot: usize) -> bool {
        self.slots[slot].computed
    }

    /// Aim the controller at `slot`.
    pub fn set_target(&mut self, slot: usize) {
        assert!(slot < self.capacity(), "target slot {slot} out of range");
        self.target = slot;
    }

    /// Mark a slot undefined ahead of a controlled eviction, when the
    /// controller is about to leap past the ring's own lazy-eviction point.
    pub fn invalidate(&mut self, slot: usize) {
        self.slots[slot].computed = false;
    }

    /// Store `grid` in the head slot and mark it computed.
    pub fn write_head(&mut self, grid: Grid) {
        self.slots[self.head] = Snapshot {
            grid,
            computed: true,
        };
    }

    /// Move `head` forward one slot. If the ring is full this evicts the
    /// oldest frame: the reused slot becomes uncomputed and `tail` advances.
    pub fn advance_head(&mut self) {
        self.head = (self.head + 1) % self.capacity();
        if self.head == self.tail {
            self.slots[self.head].computed = false;
            self.tail = (self.tail + 1) % self.capacity();
        }
    }

    /// Jump `head` straight to `target`. Only legal when the target slot is
    /// already computed (replaying a cached frame).
    pub fn jump_head_to_target(&mut self) {
        assert!(
            self.slots[self.target].computed,
            "jump to uncomputed slot {}",
            self.target
        );
        self.head = self.target;
    }

    /// Snapshot at `offset` frames after `tail`. Valid offsets are
    /// `0..=offset_of_head()`.
    pub fn read(&self, offset: usize) -> Result<&Snapshot, RingError> {
        let len = self.len();
        if offset >= len {
            return Err(RingError::OutOfRange { offset, len });
        }
        Ok(&self.slots[(self.tail + offset) % self.capacity()])
    }

    /// Grid stored at `slot`, which must be computed.
    pub fn grid_at(&self, slot: usize) -> &Grid {
        let snapshot = &self.slots[slot];
        assert!(snapshot.computed, "read of uncomputed slot {slot}");
        &snapshot.grid
    }

    /// The grid at `head`, for display.
    pub fn current_grid(&self) -> &Grid {
        self.grid_at(self.head)
    }

    /// Mutable access to the head grid, for painting while editing. The
    /// head slot stays computed; the caller is responsible for collapsing
    /// the rest of the history afterwards.
    pub fn current_grid_mut(&mut self) -> &mut Grid {
        debug_assert!(self.slots[self.head].computed);
        &mut self.slots[self.head].grid
    }

    /// Collapse the whole history to the single frame at `head`: the past
    /// has changed, so every cached ancestor and descendant is invalid.
    pub fn collapse_to_current(&mut self) {
        let head = self.head;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if index != head {
                slot.computed = false;
            }
        }
        self.tail = head;
        self.target = head;
    }

    /// Drop everything and return to a single all-dead frame at slot 0.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.computed = false;
        }
        self.head = 0;
        self.tail = 0;
        self.target = 0;
        self.slots[0].grid.clear();
        self.slots[0].computed = true;
    }

    /// How many slots are currently computed. Never exceeds the capacity.
    pub fn computed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.computed).count()
    }
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> HistoryRing {
        HistoryRing::new(capacity, 4, 4)
    }

    #[test]
    fn starts_with_one_valid_frame() {
        let ring = ring(8);
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.computed_count(), 1);
        assert!(ring.is_computed(0));
        assert_eq!((ring.tail(), ring.head(), ring.target()), (0, 0, 0));
    }

    #[test]
    fn advancing_grows_the_window_until_full() {
        let mut ring = ring(4);
        for expected_len in 2..=4 {
            ring.advance_head();
            ring.write_head(Grid::new(4, 4));
            assert_eq!(ring.len(), expected_len);
            assert_eq!(ring.tail(), 0);
        }
    }

    #[test]
    fn eviction_keeps_exactly_capacity_frames_in_a_contiguous_arc() {
        let capacity = 4;
        let mut ring = ring(capacity);
        // Append capacity + 3 generations past the initial frame.
        for _ in 0..capacity + 3 {
            ring.advance_head();
            ring.write_head(Grid::new(4, 4));
        }

        assert_eq!(ring.computed_count(), capacity);
        assert_eq!(ring.len(), capacity);
        // Every slot from tail to head is computed.
        for offset in 0..capacity {
            assert!(ring.read(offset).unwrap().computed);
        }
    }

    #[test]
    fn computed_count_never_exceeds_capacity() {
        let mut ring = ring(5);
        for _ in 0..23 {
            ring.advance_head();
            ring.write_head(Grid::new(4, 4));
            assert!(ring.computed_count() <= 5);
        }
    }

    #[test]
    fn read_past_head_is_out_of_range() {
        let mut ring = ring(4);
        ring.advance_head();
        ring.write_head(Grid::new(4, 4));

        assert!(ring.read(1).is_ok());
        assert_eq!(
            ring.read(2).err(),
            Some(RingError::OutOfRange { offset: 2, len: 2 })
        );
    }

    #[test]
    fn collapse_keeps_only_the_current_frame() {
        let mut ring = ring(6);
        for _ in 0..4 {
            ring.advance_head();
            ring.write_head(Grid::new(4, 4));
        }
        let head = ring.head();

        ring.collapse_to_current();

        assert_eq!(ring.tail(), head);
        assert_eq!(ring.target(), head);
        assert_eq!(ring.computed_count(), 1);
        assert!(ring.is_computed(head));
    }

    #[test]
    fn reset_returns_to_a_single_dead_frame_at_slot_zero() {
        let mut ring = ring(6);
        for _ in 0..9 {
            ring.advance_head();
            let mut grid = Grid::new(4, 4);
            grid.set(1, 1, true);
            ring.write_head(grid);
        }

        ring.reset();

        assert_eq!((ring.tail(), ring.head(), ring.target()), (0, 0, 0));
        assert_eq!(ring.computed_count(), 1);
        assert_eq!(ring.current_grid().population(), 0);
    }
}
