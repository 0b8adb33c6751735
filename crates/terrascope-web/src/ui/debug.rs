/// Debug panel: adapter, frame timing and material-engine counters.
pub struct DebugPanel {
    adapter_label: String,
    frame_times: [f64; 60],
    frame_index: usize,
    avg_frame_time_ms: f64,
    camera_distance: f32,
    constructions: u64,
    uniform_writes: u64,
    pipeline_rebuilds: u64,
    pending_textures: usize,
}

impl DebugPanel {
    pub fn new(adapter_label: String) -> Self {
        Self {
            adapter_label,
            frame_times: [0.0; 60],
            frame_index: 0,
            avg_frame_time_ms: 0.0,
            camera_distance: 0.0,
            constructions: 0,
            uniform_writes: 0,
            pipeline_rebuilds: 0,
            pending_textures: 0,
        }
    }

    /// Record a frame's delta time and update rolling average.
    pub fn update(&mut self, delta_ms: f64) {
        self.frame_times[self.frame_index] = delta_ms;
        self.frame_index = (self.frame_index + 1) % 60;
        let sum: f64 = self.frame_times.iter().sum();
        self.avg_frame_time_ms = sum / 60.0;
    }

    pub fn set_camera_distance(&mut self, distance: f32) {
        self.camera_distance = distance;
    }

    pub fn set_engine_info(&mut self, constructions: u64, uniform_writes: u64, rebuilds: u64) {
        self.constructions = constructions;
        self.uniform_writes = uniform_writes;
        self.pipeline_rebuilds = rebuilds;
    }

    pub fn set_pending_textures(&mut self, pending: usize) {
        self.pending_textures = pending;
    }

    pub fn avg_frame_time_ms(&self) -> f64 {
        self.avg_frame_time_ms
    }

    pub fn show(&self, ctx: &egui::Context) {
        egui::Window::new("Debug")
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(8.0, -8.0))
            .default_open(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(&self.adapter_label);
                ui.separator();
                let fps = if self.avg_frame_time_ms > 0.0 {
                    1000.0 / self.avg_frame_time_ms
                } else {
                    0.0
                };
                ui.label(format!("{:.2} ms", self.avg_frame_time_ms));
                ui.label(format!("{:.0} FPS", fps));
                ui.separator();
                ui.label(format!("Material builds: {}", self.constructions));
                ui.label(format!("Pipeline rebuilds: {}", self.pipeline_rebuilds));
                ui.label(format!("Uniform writes: {}", self.uniform_writes));
                ui.label(format!("Textures loading: {}", self.pending_textures));
                ui.separator();
                ui.label(format!("Camera distance: {:.2}", self.camera_distance));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average() {
        let mut panel = DebugPanel::new(String::new());
        for _ in 0..60 {
            panel.update(20.0);
        }
        assert!((panel.avg_frame_time_ms() - 20.0).abs() < 1e-9);
        // Thirty 10 ms frames replace half the window.
        for _ in 0..30 {
            panel.update(10.0);
        }
        assert!((panel.avg_frame_time_ms() - 15.0).abs() < 1e-9);
    }
}
