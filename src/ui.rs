// ============================================================================
// ui.rs — LifeRewind
// egui control panel and the scrub bar. UI interactions never mutate the
// core directly; they emit commands the app feeds into the next tick.
// ============================================================================

use egui_plot::{Line, Plot, PlotPoints};

use crate::history::HistoryRing;
use crate::metrics::{self, GridStats};
use crate::playback::{Command, PlaybackState, RenderView};

const SCRUB_BAR_HEIGHT: f32 = 20.0;

const SLOT_COMPUTED: egui::Color32 = egui::Color32::from_rgb(0xfc, 0x77, 0x02);
const SLOT_EMPTY: egui::Color32 = egui::Color32::from_rgb(0x5a, 0x2b, 0x01);
const BAR_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(51, 51, 51);
const CURRENT_MARKER: egui::Color32 = egui::Color32::WHITE;
const TARGET_MARKER: egui::Color32 = egui::Color32::from_rgb(0, 255, 0);

/// UI-owned settings; the app copies `period` into the core each frame.
pub struct ControlPanel {
    pub show_panel: bool,
    pub extended_hud: bool,
    pub period: f32,
    pub noise_fill: f32,
}

impl ControlPanel {
    pub fn new(period: f32) -> Self {
        Self {
            show_panel: true,
            extended_hud: false,
            period,
            noise_fill: 0.15,
        }
    }
}

/// Render all UI panels for one frame, pushing resulting commands.
pub fn render_ui(
    ctx: &egui::Context,
    view: &RenderView<'_>,
    stats: &GridStats,
    ring: &HistoryRing,
    panel: &mut ControlPanel,
    commands: &mut Vec<Command>,
) {
    render_scrub_bar_panel(ctx, view, ring, commands);
    if panel.show_panel {
        render_control_panel(ctx, view, stats, ring, panel, commands);
    }
}

// ======================== Control Panel ========================

fn render_control_panel(
    ctx: &egui::Context,
    view: &RenderView<'_>,
    stats: &GridStats,
    ring: &HistoryRing,
    panel: &mut ControlPanel,
    commands: &mut Vec<Command>,
) {
    egui::SidePanel::left("control_panel")
        .default_width(230.0)
        .min_width(200.0)
        .show(ctx, |ui| {
            ui.heading("LifeRewind");
            ui.separator();

            ui.horizontal(|ui| {
                let play_label = if view.state == PlaybackState::Playing {
                    "⏸ Pause"
                } else {
                    "▶ Play"
                };
                if ui.button(play_label).clicked() {
                    commands.push(if view.state == PlaybackState::Playing {
                        Command::Pause
                    } else {
                        Command::Play
                    });
                }
                if ui.button("🔄 Reset").clicked() {
                    commands.push(Command::Reset);
                }
                if ui.button("🎲 Noise").clicked() {
                    commands.push(Command::Sprinkle {
                        fill: panel.noise_fill as f64,
                    });
                }
            });

            ui.add_space(4.0);
            ui.add(
                egui::Slider::new(&mut panel.period, 0.05..=2.0)
                    .suffix("s")
                    .text("period"),
            );
            ui.add(
                egui::Slider::new(&mut panel.noise_fill, 0.01..=0.5)
                    .text("noise fill"),
            );

            ui.separator();
            ui.label(format!("State: {}", view.state.name()));
            ui.label(format!(
                "Frame: {}/{} retained",
                view.frame_offset + 1,
                view.capacity
            ));
            ui.label(format!(
                "Population: {} ({:.2}%)",
                stats.population,
                stats.density * 100.0
            ));

            ui.separator();
            ui.collapsing("📈 Population history", |ui| {
                // Scanning every retained frame is too expensive to do each
                // redraw; the closure only runs while the section is open.
                let series = metrics::population_series(ring);
                let line = Line::new(PlotPoints::from(series));
                Plot::new("population_plot")
                    .height(120.0)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false)
                    .show(ui, |plot_ui| plot_ui.line(line));
            });
        });
}

// ======================== Scrub Bar ========================

fn render_scrub_bar_panel(
    ctx: &egui::Context,
    view: &RenderView<'_>,
    ring: &HistoryRing,
    commands: &mut Vec<Command>,
) {
    egui::TopBottomPanel::bottom("scrub_bar")
        .exact_height(SCRUB_BAR_HEIGHT + 6.0)
        .show(ctx, |ui| {
            scrub_bar(ui, view, ring, commands);
        });
}

/// Whether the slot `offset` frames after `tail` holds a computed frame.
/// Not the same as being inside the tail..=head arc: after a scrub back,
/// slots ahead of `head` keep their cached future frames.
fn slot_is_computed(ring: &HistoryRing, offset: usize) -> bool {
    ring.is_computed((ring.tail() + offset) % ring.capacity())
}

/// One marker per ring slot, drawn tail-first so the bar reads left to
/// right in history order. Clicking or dragging maps the pointer fraction
/// onto the ring and emits the scrub command sequence.
fn scrub_bar(
    ui: &mut egui::Ui,
    view: &RenderView<'_>,
    ring: &HistoryRing,
    commands: &mut Vec<Command>,
) {
    let desired = egui::vec2(ui.available_width(), SCRUB_BAR_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, 0.0, BAR_BACKGROUND);

    let slot_width = rect.width() / view.capacity as f32;
    for offset in 0..view.capacity {
        let x = rect.left() + offset as f32 * slot_width;
        let marker = egui::Rect::from_min_size(
            egui::pos2(x, rect.top()),
            egui::vec2((slot_width - 1.0).max(1.0), rect.height()),
        );
        let color = if slot_is_computed(ring, offset) {
            SLOT_COMPUTED
        } else {
            SLOT_EMPTY
        };
        painter.rect_filled(marker, 0.0, color);
    }

    let marker_line = |offset: usize, color: egui::Color32| {
        let x = rect.left() + (offset as f32 + 0.5) * slot_width;
        painter.rect_filled(
            egui::Rect::from_min_size(
                egui::pos2(x - 1.0, rect.top()),
                egui::vec2(2.0, rect.height()),
            ),
            0.0,
            color,
        );
    };

    let target_offset =
        (view.target + view.capacity - view.tail) % view.capacity;
    if target_offset != view.frame_offset {
        marker_line(target_offset, TARGET_MARKER);
    }
    marker_line(view.frame_offset, CURRENT_MARKER);

    // Gesture → commands. The core rejects these while playing.
    let began = response.drag_started() || response.clicked();
    if began {
        commands.push(Command::BeginScrub);
    }
    if began || response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            let fraction = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 1.0);
            commands.push(Command::ScrubTo(fraction as f64));
        }
    }
    if response.drag_stopped() || response.clicked() {
        commands.push(Command::EndScrub);
    }
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::playback::Sandbox;

    #[test]
    fn future_slots_stay_marked_computed_after_scrubbing_back() {
        let mut sandbox = Sandbox::new(&SandboxConfig {
            grid_width: 5,
            grid_height: 5,
            history_size: 8,
            simulate_period: 0.1,
            ..SandboxConfig::default()
        });
        for x in 1..=3 {
            sandbox.tick(0.0, &[Command::Paint { x, y: 2, alive: true }]);
        }
        sandbox.tick(0.0, &[Command::Play]);
        for _ in 0..5 {
            sandbox.tick(0.1, &[]);
        }
        sandbox.tick(0.0, &[Command::Pause]);

        // Scrub back to the third retained frame; the ring keeps the five
        // frames it already simulated.
        let fraction = 2.5 / 8.0;
        sandbox.tick(
            0.0,
            &[
                Command::BeginScrub,
                Command::ScrubTo(fraction),
                Command::EndScrub,
            ],
        );

        assert_eq!(sandbox.view().frame_offset, 2);
        for offset in 0..=5 {
            assert!(slot_is_computed(sandbox.ring(), offset), "offset {offset}");
        }
        for offset in 6..8 {
            assert!(!slot_is_computed(sandbox.ring(), offset), "offset {offset}");
        }
    }
}
