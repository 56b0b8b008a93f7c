// ============================================================================
// camera.rs — LifeRewind
// Pan/zoom view state & GPU uniform. Pan via middle-mouse drag, zoom via
// wheel, kept centered on the grid.
// ============================================================================

/// Base cell edge in pixels at zoom 1.0, plus the gutter between cells.
pub const CELL_SIZE: f32 = 15.0;
pub const GUTTER: f32 = 1.0;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 1.0;

/// GPU-side view uniforms uploaded every frame.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// Top-left corner of the grid, in window pixels.
    pub offset: [f32; 2],
    /// Pixel distance between cell origins (cell edge + gutter).
    pub stride: f32,
    /// Filled cell edge in pixels (stride minus gutter).
    pub fill: f32,
}

/// CPU-side view state tracked between frames.
pub struct CameraState {
    pub offset: [f32; 2],
    pub zoom: f32,
    drag_anchor: Option<[f32; 2]>,
}

fn stride_for(zoom: f32) -> f32 {
    // Cell edges snap to whole pixels so gutters stay uniform.
    (CELL_SIZE * zoom).floor() + GUTTER
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.0],
            zoom: 1.0,
            drag_anchor: None,
        }
    }
}

impl CameraState {
    /// Center the grid in a window of the given size.
    pub fn center_on(&mut self, window_width: f32, window_height: f32, grid_width: usize, grid_height: usize) {
        let stride = self.stride();
        self.offset = [
            window_width / 2.0 - grid_width as f32 * stride / 2.0,
            window_height / 2.0 - grid_height as f32 * stride / 2.0,
        ];
    }

    pub fn stride(&self) -> f32 {
        stride_for(self.zoom)
    }

    /// Wheel zoom, shifting the offset so the grid center stays put.
    pub fn apply_scroll(&mut self, wheel: f32, grid_width: usize, grid_height: usize) {
        if wheel == 0.0 {
            return;
        }
        let new_zoom = (self.zoom + wheel / 50.0).clamp(MIN_ZOOM, MAX_ZOOM);
        let old_stride = self.stride();
        let new_stride = stride_for(new_zoom);
        self.offset[0] += (old_stride - new_stride) * grid_width as f32 * 0.5;
        self.offset[1] += (old_stride - new_stride) * grid_height as f32 * 0.5;
        self.zoom = new_zoom;
    }

    pub fn begin_drag(&mut self, pos: [f32; 2]) {
        self.drag_anchor = Some(pos);
    }

    pub fn drag_to(&mut self, pos: [f32; 2]) {
        if let Some(anchor) = self.drag_anchor {
            self.offset[0] += pos[0] - anchor[0];
            self.offset[1] += pos[1] - anchor[1];
            self.drag_anchor = Some(pos);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Cell under a window position, if any.
    pub fn cell_at(&self, pos: [f32; 2], grid_width: usize, grid_height: usize) -> Option<(usize, usize)> {
        let stride = self.stride();
        let x = (pos[0] - self.offset[0]) / stride;
        let y = (pos[1] - self.offset[1]) / stride;
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= grid_width || y >= grid_height {
            return None;
        }
        Some((x, y))
    }

    /// Build the GPU uniform from current state.
    pub fn uniforms(&self) -> CameraUniforms {
        let stride = self.stride();
        CameraUniforms {
            offset: self.offset,
            stride,
            fill: stride - GUTTER,
        }
    }
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_lookup_respects_offset_and_bounds() {
        let mut camera = CameraState::default();
        camera.offset = [100.0, 50.0];

        assert_eq!(camera.cell_at([100.0, 50.0], 8, 8), Some((0, 0)));
        assert_eq!(camera.cell_at([99.0, 50.0], 8, 8), None);

        let stride = camera.stride();
        let pos = [100.0 + 3.5 * stride, 50.0 + 7.5 * stride];
        assert_eq!(camera.cell_at(pos, 8, 8), Some((3, 7)));
        assert_eq!(camera.cell_at(pos, 8, 4), None);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = CameraState::default();
        for _ in 0..100 {
            camera.apply_scroll(1.0, 8, 8);
        }
        assert!((camera.zoom - MAX_ZOOM).abs() < f32::EPSILON);
        for _ in 0..100 {
            camera.apply_scroll(-1.0, 8, 8);
        }
        assert!((camera.zoom - MIN_ZOOM).abs() < 1e-5);
    }

    #[test]
    fn drag_moves_the_offset_by_the_pointer_delta() {
        let mut camera = CameraState::default();
        camera.begin_drag([10.0, 10.0]);
        camera.drag_to([25.0, 4.0]);
        assert_eq!(camera.offset, [15.0, -6.0]);
        camera.end_drag();
        camera.drag_to([100.0, 100.0]);
        assert_eq!(camera.offset, [15.0, -6.0]);
    }
}
