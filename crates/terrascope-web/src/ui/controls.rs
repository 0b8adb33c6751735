use std::ops::RangeInclusive;

use terrascope_core::constants::MAX_CITY_INTENSITY;
use terrascope_core::{DataLayer, ParamDelta, Rgb, SunType};

use super::{PanelOutput, PanelView, UiAction};
use crate::flows::ContentFlow;

/// Left-hand control panel: world actions, sliders, selectors and toggles.
pub fn show(ctx: &egui::Context, view: &PanelView<'_>, out: &mut PanelOutput) {
    let state = view.state;
    let params = state.params();

    egui::Window::new("Planetary Control")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            let can_request = view.content_enabled && !state.is_loading;
            let generate = if state.is_loading {
                "Simulating..."
            } else {
                "Generate World"
            };
            if ui
                .add_enabled(can_request, egui::Button::new(generate))
                .clicked()
            {
                out.actions.push(UiAction::Start(ContentFlow::GenerateWorld));
            }
            if !view.content_enabled {
                ui.small("No content service configured");
            }

            ui.separator();
            ui.label("Data Layer");
            ui.horizontal(|ui| {
                for layer in DataLayer::ALL {
                    let active = params.data_layer == layer;
                    if ui.selectable_label(active, layer_label(layer)).clicked() && !active {
                        out.push(ParamDelta {
                            data_layer: Some(layer),
                            ..Default::default()
                        });
                    }
                }
            });

            ui.separator();
            ui.label("Atmospheric Composition");
            slider(ui, "Cloud Density", params.cloud_density, 0.0..=1.0, out, |v| {
                ParamDelta {
                    cloud_density: Some(v),
                    ..Default::default()
                }
            });
            slider(ui, "Snow Cover (Ice Age)", params.snow_level, 0.0..=1.0, out, |v| {
                ParamDelta {
                    snow_level: Some(v),
                    ..Default::default()
                }
            });
            slider(ui, "Toxicity (Murkiness)", params.water_murkiness, 0.0..=1.0, out, |v| {
                ParamDelta {
                    water_murkiness: Some(v),
                    ..Default::default()
                }
            });
            color(ui, "Atmosphere", params.atmosphere_color, out, |c| ParamDelta {
                atmosphere_color: Some(c),
                ..Default::default()
            });

            ui.separator();
            ui.label("Civilization");
            slider(
                ui,
                "City Lights",
                params.city_light_intensity,
                0.0..=MAX_CITY_INTENSITY,
                out,
                |v| ParamDelta {
                    city_light_intensity: Some(v),
                    ..Default::default()
                },
            );
            color(ui, "Light Color", params.city_light_color, out, |c| ParamDelta {
                city_light_color: Some(c),
                ..Default::default()
            });

            ui.separator();
            ui.label("Star System");
            ui.horizontal(|ui| {
                for sun in SunType::ALL {
                    let active = params.sun_type == sun;
                    if ui.selectable_label(active, sun_label(sun)).clicked() && !active {
                        out.push(ParamDelta {
                            sun_type: Some(sun),
                            ..Default::default()
                        });
                    }
                }
            });
            slider(ui, "Rotation", params.rotation_speed, 0.0..=0.5, out, |v| {
                ParamDelta {
                    rotation_speed: Some(v),
                    ..Default::default()
                }
            });
            slider(ui, "Axial Tilt", params.tilt, 0.0..=1.5, out, |v| ParamDelta {
                tilt: Some(v),
                ..Default::default()
            });

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(can_request, egui::Button::new("Evolution Step (+1ky)"))
                    .clicked()
                {
                    out.actions.push(UiAction::Start(ContentFlow::Evolve));
                }
                if ui
                    .add_enabled(can_request, egui::Button::new("Trigger Event"))
                    .clicked()
                {
                    out.actions.push(UiAction::Start(ContentFlow::Disaster));
                }
            });
            if ui
                .add_enabled(
                    can_request,
                    egui::Button::new("Start Terraforming Challenge"),
                )
                .clicked()
            {
                out.actions.push(UiAction::Start(ContentFlow::Challenge));
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(params.show_satellites, "Satellites")
                    .clicked()
                {
                    out.push(ParamDelta {
                        show_satellites: Some(!params.show_satellites),
                        ..Default::default()
                    });
                }
                let probe = if state.is_probe_landing {
                    "Abort"
                } else {
                    "Land Probe"
                };
                if ui.selectable_label(state.is_probe_landing, probe).clicked() {
                    out.actions.push(UiAction::ToggleProbe);
                }
                if ui.button("Photo Mode").clicked() {
                    out.actions.push(UiAction::TogglePhoto);
                }
                let audio = if state.audio_enabled {
                    "Audio: On"
                } else {
                    "Audio: Off"
                };
                if ui.selectable_label(state.audio_enabled, audio).clicked() {
                    out.actions.push(UiAction::ToggleAudio);
                }
            });
            if state.audio_enabled {
                let mut volume = view.volume;
                if ui
                    .add(egui::Slider::new(&mut volume, 0.0..=1.0).text("Volume"))
                    .changed()
                {
                    out.actions.push(UiAction::SetVolume(volume));
                }
            }
        });
}

fn slider(
    ui: &mut egui::Ui,
    label: &str,
    mut value: f32,
    range: RangeInclusive<f32>,
    out: &mut PanelOutput,
    delta: impl FnOnce(f32) -> ParamDelta,
) {
    if ui
        .add(egui::Slider::new(&mut value, range).text(label))
        .changed()
    {
        out.push(delta(value));
    }
}

fn color(
    ui: &mut egui::Ui,
    label: &str,
    value: Rgb,
    out: &mut PanelOutput,
    delta: impl FnOnce(Rgb) -> ParamDelta,
) {
    let mut srgb = value.as_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    ui.horizontal(|ui| {
        ui.label(label);
        if ui.color_edit_button_srgb(&mut srgb).changed() {
            let [r, g, b] = srgb.map(|c| f32::from(c) / 255.0);
            out.push(delta(Rgb::new(r, g, b)));
        }
    });
}

fn layer_label(layer: DataLayer) -> &'static str {
    match layer {
        DataLayer::Visual => "Visual",
        DataLayer::Thermal => "Thermal",
        DataLayer::Population => "Pop",
        DataLayer::Vegetation => "Bio",
    }
}

fn sun_label(sun: SunType) -> &'static str {
    match sun {
        SunType::Yellow => "Yellow",
        SunType::Red => "Red",
        SunType::Blue => "Blue",
    }
}
