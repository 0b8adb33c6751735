use std::sync::Arc;

use crate::constants::CHALLENGE_TOLERANCE;
use crate::content::{ChallengeTarget, LoreDelta, PlanetLore, PoiReport};
use crate::params::{ParamDelta, VisualParams};

/// Single source of truth for lore, parameters and UI flags.
///
/// Parameters are held as an `Arc` snapshot. Every change swaps in a new
/// revision so readers holding the previous one never observe a half-applied
/// update.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub lore: PlanetLore,
    params: Arc<VisualParams>,
    revision: u64,
    pub is_loading: bool,
    pub loading_message: String,
    pub photo_mode: bool,
    pub is_probe_landing: bool,
    pub selected_poi: Option<PoiReport>,
    pub challenge: ChallengeTarget,
    pub audio_enabled: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new(VisualParams::default())
    }
}

impl SimulationState {
    pub fn new(params: VisualParams) -> Self {
        Self {
            lore: PlanetLore::default(),
            params: Arc::new(params),
            revision: 0,
            is_loading: false,
            loading_message: String::new(),
            photo_mode: false,
            is_probe_landing: false,
            selected_poi: None,
            challenge: ChallengeTarget::default(),
            audio_enabled: false,
        }
    }

    /// Current parameter snapshot.
    pub fn params(&self) -> &Arc<VisualParams> {
        &self.params
    }

    /// Bumped once per parameter change that altered something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a partial update. Returns `true` when the parameters changed.
    pub fn apply_params(&mut self, delta: &ParamDelta) -> bool {
        if delta.is_empty() {
            return false;
        }
        let next = self.params.apply(delta);
        if next == *self.params {
            return false;
        }
        self.params = Arc::new(next);
        self.revision += 1;
        self.evaluate_challenge();
        true
    }

    /// Replace the lore wholesale, as after generating a new world.
    pub fn set_lore(&mut self, lore: PlanetLore) {
        self.lore = lore;
    }

    pub fn apply_lore(&mut self, delta: &LoreDelta) {
        self.lore = self.lore.apply(delta);
    }

    pub fn toggle_probe(&mut self) {
        self.is_probe_landing = !self.is_probe_landing;
    }

    pub fn toggle_photo(&mut self) {
        self.photo_mode = !self.photo_mode;
    }

    pub fn toggle_audio(&mut self) {
        self.audio_enabled = !self.audio_enabled;
    }

    /// Surface clicks are ignored while loading or in photo mode.
    pub fn accepts_surface_clicks(&self) -> bool {
        !self.is_loading && !self.photo_mode
    }

    pub fn select_poi(&mut self, report: PoiReport) {
        self.selected_poi = Some(report);
    }

    pub fn close_poi(&mut self) {
        self.selected_poi = None;
    }

    pub fn begin_loading(&mut self, message: impl Into<String>) {
        self.is_loading = true;
        self.loading_message = message.into();
    }

    /// Update the progress message of a running load.
    pub fn set_loading_message(&mut self, message: impl Into<String>) {
        self.loading_message = message.into();
    }

    pub fn finish_loading(&mut self) {
        self.is_loading = false;
    }

    /// Install a new challenge and knock the planet into the state it must be
    /// repaired from.
    pub fn start_challenge(&mut self, challenge: ChallengeTarget) {
        self.challenge = challenge;
        self.apply_params(&ParamDelta {
            cloud_density: Some(0.1),
            water_murkiness: Some(0.9),
            snow_level: Some(0.0),
            ..Default::default()
        });
        self.evaluate_challenge();
    }

    pub fn end_challenge(&mut self) {
        self.challenge.active = false;
    }

    /// Mark an active challenge solved once the tracked value is within
    /// tolerance. Only the cloud-density target decides success; a
    /// habitability target alone never completes a challenge. Returns the
    /// success flag.
    pub fn evaluate_challenge(&mut self) -> bool {
        if !self.challenge.active || self.challenge.success {
            return self.challenge.success;
        }
        if let Some(target) = self.challenge.target_stats.cloud_density {
            if (self.params.cloud_density - target).abs() <= CHALLENGE_TOLERANCE {
                log::info!("challenge complete: {}", self.challenge.description);
                self.challenge.success = true;
            }
        }
        self.challenge.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::TargetStats;

    fn challenge(cloud: Option<f32>) -> ChallengeTarget {
        ChallengeTarget {
            active: true,
            description: "Clear the smog".into(),
            target_stats: TargetStats {
                habitability_score: Some(80.0),
                cloud_density: cloud,
            },
            success: false,
        }
    }

    #[test]
    fn test_apply_params_swaps_snapshot() {
        let mut state = SimulationState::default();
        let before = Arc::clone(state.params());
        assert!(state.apply_params(&ParamDelta {
            cloud_density: Some(0.25),
            ..Default::default()
        }));
        assert_eq!(before.cloud_density, 0.6);
        assert_eq!(state.params().cloud_density, 0.25);
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_noop_delta_keeps_revision() {
        let mut state = SimulationState::default();
        assert!(!state.apply_params(&ParamDelta::default()));
        assert!(!state.apply_params(&ParamDelta {
            cloud_density: Some(0.6),
            ..Default::default()
        }));
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_start_challenge_resets_planet() {
        let mut state = SimulationState::default();
        state.start_challenge(challenge(Some(0.6)));
        let p = state.params();
        assert_eq!(p.cloud_density, 0.1);
        assert_eq!(p.water_murkiness, 0.9);
        assert_eq!(p.snow_level, 0.0);
        assert!(!state.challenge.success);
    }

    #[test]
    fn test_challenge_succeeds_within_tolerance() {
        let mut state = SimulationState::default();
        state.start_challenge(challenge(Some(0.6)));
        state.apply_params(&ParamDelta {
            cloud_density: Some(0.4),
            ..Default::default()
        });
        assert!(!state.challenge.success);
        state.apply_params(&ParamDelta {
            cloud_density: Some(0.5),
            ..Default::default()
        });
        assert!(state.challenge.success);
        // Stays solved after drifting away.
        state.apply_params(&ParamDelta {
            cloud_density: Some(0.0),
            ..Default::default()
        });
        assert!(state.evaluate_challenge());
    }

    #[test]
    fn test_habitability_only_never_succeeds() {
        let mut state = SimulationState::default();
        state.start_challenge(challenge(None));
        state.lore.habitability_score = 80.0;
        assert!(!state.evaluate_challenge());
    }

    #[test]
    fn test_toggles_and_poi() {
        let mut state = SimulationState::default();
        assert!(state.accepts_surface_clicks());
        state.toggle_photo();
        assert!(!state.accepts_surface_clicks());
        state.toggle_photo();
        state.begin_loading("Analyzing Sector...");
        assert!(!state.accepts_surface_clicks());
        state.finish_loading();
        state.select_poi(PoiReport::signal_lost(0.2, 0.3));
        assert!(state.selected_poi.is_some());
        state.close_poi();
        assert!(state.selected_poi.is_none());
        state.toggle_probe();
        assert!(state.is_probe_landing);
    }
}
