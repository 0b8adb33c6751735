use wasm_bindgen::prelude::*;

use crate::bridge::AudioBridge;
use crate::generators::{AmbientGenerator, DroneGenerator, WindGenerator};
use crate::AmbientLevels;

/// The two ambient layers on one audio context.
pub struct AmbientMixer {
    bridge: AudioBridge,
    wind: WindGenerator,
    drone: DroneGenerator,
}

impl AmbientMixer {
    pub fn new(volume: f32) -> Result<Self, JsValue> {
        let bridge = AudioBridge::new(volume)?;
        bridge.resume();
        let mut wind = WindGenerator::default();
        let mut drone = DroneGenerator::default();
        wind.start(&bridge)?;
        drone.start(&bridge)?;
        Ok(Self {
            bridge,
            wind,
            drone,
        })
    }

    pub fn apply(&mut self, levels: AmbientLevels) {
        self.wind.set_level(&self.bridge, levels.wind);
        self.drone.set_level(&self.bridge, levels.drone);
    }

    pub fn set_volume(&self, volume: f32) {
        self.bridge.set_master_volume(volume);
    }

    /// Stop both layers and close the context.
    pub fn shutdown(&mut self) {
        self.wind.stop();
        self.drone.stop();
        self.bridge.close();
    }
}
