use terrascope_core::constants::CHALLENGE_TOLERANCE;
use terrascope_core::SimulationState;

use super::{PanelOutput, UiAction};

const GOOD: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
const BAD: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);
const WARN: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);

/// Right-hand lore panel.
pub fn show_lore(ctx: &egui::Context, state: &SimulationState) {
    let lore = &state.lore;
    egui::Window::new("Planet")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
        .resizable(false)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading(&lore.name);
            ui.label(format!("Civilization: {}", lore.civilization_type));
            ui.label(&lore.description);
            ui.separator();

            let score = lore.habitability_score;
            ui.label(format!("Habitability: {score:.0}"));
            let fill = if score > 80.0 { GOOD } else { WARN };
            ui.add(
                egui::ProgressBar::new((score / 100.0).clamp(0.0, 1.0))
                    .fill(fill)
                    .desired_height(6.0),
            );
            ui.label(format!("Population: {}", lore.population));
            ui.label(format!("Age: {}", lore.age));
            ui.label(format!(
                "Atmosphere: {}",
                lore.atmosphere_composition.join(", ")
            ));
            ui.separator();
            ui.small("Interact with the globe to scan sectors");
        });
}

/// Loading banner, challenge status, location report and probe overlay.
pub fn show_overlays(ctx: &egui::Context, state: &SimulationState, out: &mut PanelOutput) {
    if state.is_loading {
        let message = if state.loading_message.is_empty() {
            "Processing..."
        } else {
            state.loading_message.as_str()
        };
        egui::Area::new(egui::Id::new("loading"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 16.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new(message).strong());
                });
            });
    }

    if state.challenge.active {
        show_challenge(ctx, state);
    }

    if let Some(poi) = &state.selected_poi {
        let (lat, lon) = poi.lat_lon();
        egui::Window::new(&poi.title)
            .id(egui::Id::new("poi-report"))
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.monospace(format!("LAT: {lat} | LON: {lon}"));
                ui.label(&poi.description);
                if ui.button("Close Report").clicked() {
                    out.actions.push(UiAction::ClosePoi);
                }
            });
    }

    if state.is_probe_landing {
        egui::Area::new(egui::Id::new("probe"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -48.0))
            .interactable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("ESTABLISHING LINK...");
                    ui.label("DESCENDING TO SURFACE");
                });
            });
    }
}

fn show_challenge(ctx: &egui::Context, state: &SimulationState) {
    let challenge = &state.challenge;
    let params = state.params();
    egui::Window::new("Terraforming Goal")
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-8.0, -8.0))
        .resizable(false)
        .default_width(260.0)
        .show(ctx, |ui| {
            if challenge.success {
                ui.colored_label(GOOD, "SUCCESS");
            }
            ui.label(&challenge.description);
            if let Some(target) = challenge.target_stats.cloud_density {
                let met = (params.cloud_density - target).abs() <= CHALLENGE_TOLERANCE;
                ui.horizontal(|ui| {
                    ui.label(format!("Target Clouds: {target:.1}"));
                    ui.colored_label(
                        if met { GOOD } else { BAD },
                        format!("Curr: {:.1}", params.cloud_density),
                    );
                });
            }
            if let Some(target) = challenge.target_stats.habitability_score {
                let score = state.lore.habitability_score;
                ui.horizontal(|ui| {
                    ui.label(format!("Target Hab: {target:.0}"));
                    ui.colored_label(
                        if score >= target { GOOD } else { BAD },
                        format!("Curr: {score:.0}"),
                    );
                });
            }
        });
}
