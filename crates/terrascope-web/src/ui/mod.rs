pub mod controls;
pub mod debug;
pub mod lore;

use egui_wgpu::ScreenDescriptor;
use terrascope_core::{ParamDelta, SimulationState};

use crate::flows::ContentFlow;
use debug::DebugPanel;

/// Manages egui context and its wgpu renderer.
pub struct UiState {
    pub ctx: egui::Context,
    pub renderer: egui_wgpu::Renderer,
}

impl UiState {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, dpi_scale: f32) -> Self {
        let ctx = egui::Context::default();
        ctx.set_pixels_per_point(dpi_scale);
        ctx.set_visuals(egui::Visuals::dark());

        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self { ctx, renderer }
    }

    pub fn screen_descriptor(&self, width: u32, height: u32) -> ScreenDescriptor {
        ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }
}

/// Something the user asked for that is not a plain parameter change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Start(ContentFlow),
    ToggleProbe,
    TogglePhoto,
    ToggleAudio,
    ClosePoi,
    SetVolume(f32),
}

/// Everything one UI pass produced.
#[derive(Debug, Default)]
pub struct PanelOutput {
    pub delta: ParamDelta,
    pub actions: Vec<UiAction>,
}

impl PanelOutput {
    pub fn push(&mut self, delta: ParamDelta) {
        self.delta = std::mem::take(&mut self.delta).merge(delta);
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty() && self.actions.is_empty()
    }
}

/// Read-only inputs to one UI pass.
pub struct PanelView<'a> {
    pub state: &'a SimulationState,
    pub content_enabled: bool,
    pub volume: f32,
    pub debug: &'a DebugPanel,
}

/// Lay out the whole overlay. Photo mode hides everything but its exit button.
pub fn show(ctx: &egui::Context, view: &PanelView<'_>, out: &mut PanelOutput) {
    // egui may repeat a discarded pass; only the last one counts.
    *out = PanelOutput::default();

    if view.state.photo_mode {
        egui::Area::new(egui::Id::new("photo-exit"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
            .show(ctx, |ui| {
                if ui.button("Exit Photo Mode").clicked() {
                    out.actions.push(UiAction::TogglePhoto);
                }
            });
        return;
    }

    controls::show(ctx, view, out);
    lore::show_lore(ctx, view.state);
    lore::show_overlays(ctx, view.state, out);
    view.debug.show(ctx);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &SimulationState, content_enabled: bool) -> PanelOutput {
        let ctx = egui::Context::default();
        let debug = DebugPanel::new("test".into());
        let view = PanelView {
            state,
            content_enabled,
            volume: 0.7,
            debug: &debug,
        };
        let mut out = PanelOutput::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| show(ctx, &view, &mut out));
        out
    }

    #[test]
    fn test_idle_pass_emits_nothing() {
        let mut state = SimulationState::default();
        assert!(run(&state, true).is_empty());
        assert!(run(&state, false).is_empty());

        state.begin_loading("Analyzing Sector...");
        state.toggle_probe();
        assert!(run(&state, true).is_empty());

        state.toggle_photo();
        assert!(run(&state, true).is_empty());
    }

    #[test]
    fn test_push_merges_deltas() {
        let mut out = PanelOutput::default();
        out.push(ParamDelta {
            cloud_density: Some(0.2),
            ..Default::default()
        });
        out.push(ParamDelta {
            snow_level: Some(0.4),
            cloud_density: Some(0.3),
            ..Default::default()
        });
        assert_eq!(out.delta.cloud_density, Some(0.3));
        assert_eq!(out.delta.snow_level, Some(0.4));
        assert!(!out.is_empty());
    }
}
