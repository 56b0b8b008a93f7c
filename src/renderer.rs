// ============================================================================
// renderer.rs — LifeRewind
// HUD text overlay via glyphon: frame position, playback state, stats.
// ============================================================================

use glyphon::{
    Attrs, Buffer as TextBuffer, Cache as GlyphCache, Color as GlyphColor, Family, FontSystem,
    Metrics, Resolution, Shaping, SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer,
    Viewport as GlyphViewport,
};

use crate::metrics::GridStats;
use crate::playback::RenderView;

/// All glyphon resources needed for HUD text rendering.
pub struct HudRenderer {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    pub glyph_viewport: GlyphViewport,
    pub text_atlas: TextAtlas,
    pub text_renderer: TextRenderer,
}

impl HudRenderer {
    /// Initialize the HUD text rendering subsystem.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let mut font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let glyph_cache = GlyphCache::new(device);
        let glyph_viewport = GlyphViewport::new(device, &glyph_cache);
        let mut text_atlas = TextAtlas::new(device, queue, &glyph_cache, surface_format);
        let text_renderer =
            TextRenderer::new(&mut text_atlas, device, wgpu::MultisampleState::default(), None);

        // Prime font system so first frame renders correctly
        let mut primer = TextBuffer::new(&mut font_system, Metrics::new(16.0, 20.0));
        primer.set_text(
            &mut font_system,
            "LifeRewind",
            Attrs::new().family(Family::Monospace),
            Shaping::Basic,
        );

        Self {
            font_system,
            swash_cache,
            glyph_viewport,
            text_atlas,
            text_renderer,
        }
    }

    /// Prepare HUD text for the current frame.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &RenderView<'_>,
        stats: &GridStats,
        fps: f32,
        zoom: f32,
        period: f32,
        extended: bool,
        win_w: u32,
        win_h: u32,
    ) {
        self.glyph_viewport.update(
            queue,
            Resolution {
                width: win_w,
                height: win_h,
            },
        );

        let hud_text = build_hud_text(view, stats, fps, zoom, period, extended);

        let mut text_buf = TextBuffer::new(&mut self.font_system, Metrics::new(14.0, 18.0));
        text_buf.set_size(&mut self.font_system, Some(win_w as f32), Some(win_h as f32));
        text_buf.set_text(
            &mut self.font_system,
            &hud_text,
            Attrs::new().family(Family::Monospace),
            Shaping::Basic,
        );
        text_buf.shape_until_scroll(&mut self.font_system, false);

        self.text_renderer
            .prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.text_atlas,
                &self.glyph_viewport,
                [TextArea {
                    buffer: &text_buf,
                    left: 10.0,
                    top: 10.0,
                    scale: 1.0,
                    bounds: TextBounds {
                        left: 0,
                        top: 0,
                        right: win_w as i32,
                        bottom: win_h as i32,
                    },
                    default_color: GlyphColor::rgb(220, 220, 220),
                    custom_glyphs: &[],
                }],
                &mut self.swash_cache,
            )
            .unwrap();
    }

    /// Render HUD overlay into an active render pass.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        self.text_renderer
            .render(&self.text_atlas, &self.glyph_viewport, pass)
            .unwrap();
    }

    /// Trim the glyph atlas after presenting.
    pub fn trim(&mut self) {
        self.text_atlas.trim();
    }
}

// ======================== HUD Text Builder ========================

fn build_hud_text(
    view: &RenderView<'_>,
    stats: &GridStats,
    fps: f32,
    zoom: f32,
    period: f32,
    extended: bool,
) -> String {
    if extended {
        format!(
            "━━━ LifeRewind ━━━\n\
             Frame: {}/{}  [{}]   FPS: {:.0}  |  Zoom: {:.2}x\n\
             Population: {} ({:.2}% of {}×{})\n\
             \n\
             CONTROLS:\n\
             • Space: play/pause  |  R: reset  |  N: noise  |  ESC: quit\n\
             • Left drag: paint   |  Right drag: erase\n\
             • Middle drag: pan   |  Wheel: zoom  |  H: compact HUD\n\
             • Bottom bar: scrub through {} retained generations\n\
             \n\
             Period: {:.2}s per generation",
            view.frame_offset + 1,
            view.capacity,
            view.state.name(),
            fps,
            zoom,
            stats.population,
            stats.density * 100.0,
            view.grid.width(),
            view.grid.height(),
            view.capacity,
            period,
        )
    } else {
        format!(
            "Frame: {}/{}  [{}]   Pop: {}   FPS: {:.0}   Zoom: {:.2}x\n\
             Space: play | R: reset | N: noise | H: help",
            view.frame_offset + 1,
            view.capacity,
            view.state.name(),
            stats.population,
            fps,
            zoom,
        )
    }
}
