// ============================================================================
// input.rs — LifeRewind
// Pointer state tracked between winit events for paint and pan gestures.
// ============================================================================

/// Mouse state carried across events. Painting re-fires only when the
/// pointer enters a new cell, so `last_paint_cell` remembers where the
/// previous paint landed within the current press.
#[derive(Default)]
pub struct PointerState {
    pub pos: [f32; 2],
    pub left_down: bool,
    pub right_down: bool,
    pub middle_down: bool,
    pub last_paint_cell: Option<(usize, usize)>,
}

impl PointerState {
    /// A fresh press starts a new paint stroke.
    pub fn begin_stroke(&mut self) {
        self.last_paint_cell = None;
    }
}
