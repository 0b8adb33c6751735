use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use web_sys::{AudioBuffer, AudioBufferSourceNode, AudioContext, GainNode, OscillatorNode, OscillatorType};

use terrascope_core::constants::GAIN_RAMP_SECONDS;

use crate::noise::pink_noise_buffer;

/// Seconds of pink noise looped by the wind layer.
const NOISE_SECONDS: f32 = 4.0;

/// Wraps the Web Audio API: the context, the master gain and a shared
/// looping pink-noise buffer.
pub struct AudioBridge {
    ctx: AudioContext,
    master_gain: GainNode,
    noise_buffer: AudioBuffer,
}

impl AudioBridge {
    pub fn new(volume: f32) -> Result<Self, JsValue> {
        let ctx = AudioContext::new()?;
        let master_gain = ctx.create_gain()?;
        master_gain.connect_with_audio_node(&ctx.destination())?;
        master_gain.gain().set_value(volume.clamp(0.0, 1.0));

        let sample_rate = ctx.sample_rate();
        let length = (sample_rate * NOISE_SECONDS) as u32;
        let noise_buffer = ctx.create_buffer(1, length, sample_rate)?;
        let samples = pink_noise_buffer(&mut StdRng::from_entropy(), length as usize);
        noise_buffer.copy_to_channel(&samples, 0)?;

        Ok(Self {
            ctx,
            master_gain,
            noise_buffer,
        })
    }

    pub fn set_master_volume(&self, volume: f32) {
        self.master_gain.gain().set_value(volume.clamp(0.0, 1.0));
    }

    /// Resume the context (needed after a user gesture on most browsers).
    pub fn resume(&self) {
        let _ = self.ctx.resume();
    }

    pub fn close(&self) {
        if let Err(e) = self.ctx.close() {
            log::warn!("Error closing AudioContext: {:?}", e);
        }
    }

    /// Oscillator -> gain -> master. The gain starts silent.
    pub fn create_oscillator(
        &self,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Result<(OscillatorNode, GainNode), JsValue> {
        let osc = self.ctx.create_oscillator()?;
        osc.set_type(osc_type);
        osc.frequency().set_value(freq);

        let gain_node = self.ctx.create_gain()?;
        gain_node.gain().set_value(0.0);

        osc.connect_with_audio_node(&gain_node)?;
        gain_node.connect_with_audio_node(&self.master_gain)?;
        Ok((osc, gain_node))
    }

    /// Looping pink noise -> gain -> master. The gain starts silent.
    pub fn create_noise_source(&self) -> Result<(AudioBufferSourceNode, GainNode), JsValue> {
        let source = self.ctx.create_buffer_source()?;
        source.set_buffer(Some(&self.noise_buffer));
        source.set_loop(true);

        let gain_node = self.ctx.create_gain()?;
        gain_node.gain().set_value(0.0);

        source.connect_with_audio_node(&gain_node)?;
        gain_node.connect_with_audio_node(&self.master_gain)?;
        Ok((source, gain_node))
    }

    /// Glide a gain toward `target` with the shared ramp time constant.
    pub fn ramp(&self, gain: &GainNode, target: f32) -> Result<(), JsValue> {
        gain.gain()
            .set_target_at_time(target, self.ctx.current_time(), GAIN_RAMP_SECONDS as f32)?;
        Ok(())
    }
}
