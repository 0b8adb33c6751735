use wasm_bindgen::prelude::*;
use web_sys::{AudioBufferSourceNode, GainNode, OscillatorNode, OscillatorType};

use terrascope_core::constants::DRONE_FREQUENCY_HZ;

use crate::bridge::AudioBridge;

/// A continuously running ambient layer whose loudness is steered from outside.
pub trait AmbientGenerator {
    fn start(&mut self, bridge: &AudioBridge) -> Result<(), JsValue>;
    fn set_level(&mut self, bridge: &AudioBridge, level: f32);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Wind: looping pink noise.
#[derive(Default)]
pub struct WindGenerator {
    source: Option<AudioBufferSourceNode>,
    gain: Option<GainNode>,
}

impl AmbientGenerator for WindGenerator {
    #[allow(deprecated)]
    fn start(&mut self, bridge: &AudioBridge) -> Result<(), JsValue> {
        if self.is_active() {
            return Ok(());
        }
        let (source, gain) = bridge.create_noise_source()?;
        source.start()?;
        self.source = Some(source);
        self.gain = Some(gain);
        Ok(())
    }

    fn set_level(&mut self, bridge: &AudioBridge, level: f32) {
        if let Some(gain) = &self.gain {
            if let Err(e) = bridge.ramp(gain, level) {
                log::warn!("wind ramp failed: {:?}", e);
            }
        }
    }

    #[allow(deprecated)]
    fn stop(&mut self) {
        if let Some(source) = self.source.take() {
            let _ = source.stop();
        }
        self.gain = None;
    }

    fn is_active(&self) -> bool {
        self.source.is_some()
    }
}

/// Drone: a low sine hum.
#[derive(Default)]
pub struct DroneGenerator {
    osc: Option<OscillatorNode>,
    gain: Option<GainNode>,
}

impl AmbientGenerator for DroneGenerator {
    #[allow(deprecated)]
    fn start(&mut self, bridge: &AudioBridge) -> Result<(), JsValue> {
        if self.is_active() {
            return Ok(());
        }
        let (osc, gain) = bridge.create_oscillator(DRONE_FREQUENCY_HZ, OscillatorType::Sine)?;
        osc.start()?;
        self.osc = Some(osc);
        self.gain = Some(gain);
        Ok(())
    }

    fn set_level(&mut self, bridge: &AudioBridge, level: f32) {
        if let Some(gain) = &self.gain {
            if let Err(e) = bridge.ramp(gain, level) {
                log::warn!("drone ramp failed: {:?}", e);
            }
        }
    }

    #[allow(deprecated)]
    fn stop(&mut self) {
        if let Some(osc) = self.osc.take() {
            let _ = osc.stop();
        }
        self.gain = None;
    }

    fn is_active(&self) -> bool {
        self.osc.is_some()
    }
}
