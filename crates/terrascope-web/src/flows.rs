//! Content-service round trips and how their replies land in the state store.
//!
//! A flow starts from a user action, sends one request, and on reply either
//! finishes or chains into a follow-up request. World generation is the only
//! two-leg flow: the surface texture is requested once the lore is known.
//! Every failure degrades to keeping the previous planet.

use terrascope_core::content::{
    parse_challenge, parse_disaster, parse_evolve, parse_poi, parse_texture, parse_world,
    ContentRequest, PoiReport,
};
use terrascope_core::{ContentError, ParamDelta, SimulationState};

/// Years skipped by one evolution step.
pub const EVOLVE_YEARS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentFlow {
    GenerateWorld,
    /// Second leg of world generation.
    SurfaceTexture,
    Evolve,
    Disaster,
    Challenge,
    Poi { u: f32, v: f32 },
}

impl ContentFlow {
    fn loading_message(self) -> Option<&'static str> {
        match self {
            ContentFlow::GenerateWorld => Some("Analyzing Sector..."),
            ContentFlow::SurfaceTexture => Some("Synthesizing Surface Texture..."),
            ContentFlow::Evolve => Some("Simulating 1000 Years..."),
            ContentFlow::Disaster => Some("WARNING: EVENT DETECTED"),
            ContentFlow::Challenge => Some("Calculating Terraforming Metrics..."),
            ContentFlow::Poi { .. } => None,
        }
    }

    fn request(self, state: &SimulationState) -> ContentRequest {
        match self {
            ContentFlow::GenerateWorld => ContentRequest::world(),
            ContentFlow::SurfaceTexture => ContentRequest::texture_for(&state.lore),
            ContentFlow::Evolve => ContentRequest::evolve(&state.lore, EVOLVE_YEARS),
            ContentFlow::Disaster => ContentRequest::disaster(&state.lore),
            ContentFlow::Challenge => ContentRequest::challenge(),
            ContentFlow::Poi { u, v } => ContentRequest::poi(&state.lore.description, u, v),
        }
    }
}

/// What the shell does after a reply has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    Done,
    Next(ContentFlow, ContentRequest),
}

/// Start a user-triggered flow. Returns the request to send, or `None` when
/// the action is refused: a loading flow is already running, or a surface
/// scan arrived while clicks are not accepted.
pub fn begin(state: &mut SimulationState, flow: ContentFlow) -> Option<ContentRequest> {
    match flow.loading_message() {
        Some(message) => {
            if state.is_loading {
                log::debug!("ignoring {flow:?}: another request is running");
                return None;
            }
            state.begin_loading(message);
        }
        None => {
            if !state.accepts_surface_clicks() {
                return None;
            }
        }
    }
    Some(flow.request(state))
}

/// Apply a reply (or transport failure) for `flow`.
pub fn finish(
    state: &mut SimulationState,
    flow: ContentFlow,
    reply: Result<String, ContentError>,
) -> FlowStep {
    match flow {
        ContentFlow::GenerateWorld => match reply.and_then(|body| parse_world(&body)) {
            Ok((lore, delta)) => {
                log::info!("generated world '{}'", lore.name);
                state.set_lore(lore);
                state.apply_params(&delta);
                let next = ContentFlow::SurfaceTexture;
                if let Some(message) = next.loading_message() {
                    state.set_loading_message(message);
                }
                return FlowStep::Next(next, next.request(state));
            }
            Err(e) => log::warn!("world generation failed: {e}"),
        },
        ContentFlow::SurfaceTexture => {
            // No image, or no answer at all, puts the default map back.
            let url = reply
                .and_then(|body| parse_texture(&body))
                .unwrap_or_else(|e| {
                    log::warn!("surface texture synthesis failed: {e}");
                    None
                });
            state.apply_params(&ParamDelta {
                texture_map_url: Some(url),
                cloud_map_url: Some(None),
                ..Default::default()
            });
            state.end_challenge();
        }
        ContentFlow::Evolve => match reply.and_then(|body| parse_evolve(&body, EVOLVE_YEARS)) {
            Ok((lore, params)) => {
                state.apply_lore(&lore);
                state.apply_params(&params);
            }
            Err(e) => log::warn!("evolution step failed: {e}"),
        },
        ContentFlow::Disaster => match reply.and_then(|body| parse_disaster(&body)) {
            Ok((lore, params)) => {
                state.apply_lore(&lore);
                state.apply_params(&params);
            }
            Err(e) => log::warn!("disaster event failed: {e}"),
        },
        ContentFlow::Challenge => match reply.and_then(|body| parse_challenge(&body)) {
            Ok(challenge) => state.start_challenge(challenge),
            Err(e) => log::warn!("challenge generation failed: {e}"),
        },
        ContentFlow::Poi { u, v } => {
            let report = match reply {
                Ok(body) => parse_poi(&body, u, v),
                Err(e) => {
                    log::warn!("location scan failed: {e}");
                    PoiReport::signal_lost(u, v)
                }
            };
            state.select_poi(report);
            return FlowStep::Done;
        }
    }
    state.finish_loading();
    FlowStep::Done
}
