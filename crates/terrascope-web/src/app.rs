use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use terrascope_audio::AudioSystem;
use terrascope_core::constants::SURFACE_RADIUS;
use terrascope_core::content::ContentRequest;
use terrascope_core::{ContentError, SceneConfig, SimulationState};
use terrascope_render::{
    pick_uv, starfield, CityNoiseTexture, GpuTexture, MaterialEngine, OrbitCamera,
    PlanetRenderer, SatelliteRing, SlotMap, SwapOutcome, TextureCache, TextureId, TextureSlot,
};
use wasm_bindgen::prelude::*;

use crate::content::{ContentClient, ContentInbox};
use crate::flows::{self, ContentFlow, FlowStep};
use crate::gpu::GpuContext;
use crate::input::{self, InputState};
use crate::loader::{self, TextureInbox};
use crate::ui::debug::DebugPanel;
use crate::ui::{self, PanelOutput, PanelView, UiAction, UiState};

type RafClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Wheel units to zoom steps. One pixel-mode notch moves about a tenth closer.
const ZOOM_SENSITIVITY: f32 = 0.03;

/// Main application struct. Owns all subsystems.
pub struct Application {
    gpu: GpuContext,
    ui_state: UiState,
    debug_panel: DebugPanel,
    input: Rc<RefCell<InputState>>,
    css_size: (f32, f32),
    state: SimulationState,
    textures: TextureCache<GpuTexture>,
    texture_inbox: TextureInbox,
    engine: MaterialEngine,
    synced_revision: u64,
    synced_textures: SlotMap<TextureId>,
    renderer: PlanetRenderer,
    camera: OrbitCamera,
    satellites: SatelliteRing,
    audio: AudioSystem,
    content: Option<ContentClient>,
    content_inbox: ContentInbox,
    start_time: f64,
    last_frame_time: f64,
}

impl Application {
    pub fn new(
        gpu: GpuContext,
        dpi_scale: f32,
        css_size: (f32, f32),
        input: Rc<RefCell<InputState>>,
        config: SceneConfig,
    ) -> Self {
        let ui_state = UiState::new(&gpu.device, gpu.surface_format, dpi_scale);
        let debug_panel = DebugPanel::new(gpu.adapter_label.clone());
        let mut rng = StdRng::from_entropy();
        let (device, queue) = (&gpu.device, &gpu.queue);

        // Flat stand-ins until the default images arrive
        let placeholders = SlotMap {
            day: GpuTexture::solid(device, queue, "day-placeholder", [26, 70, 140, 255], true),
            specular: GpuTexture::solid(device, queue, "specular-placeholder", [0; 4], false),
            normal: GpuTexture::solid(
                device,
                queue,
                "normal-placeholder",
                [128, 128, 255, 255],
                false,
            ),
            cloud: GpuTexture::solid(device, queue, "cloud-placeholder", [0; 4], false),
        };
        let urls = SlotMap {
            day: config.textures.day.clone(),
            specular: config.textures.specular.clone(),
            normal: config.textures.normal.clone(),
            cloud: config.textures.cloud.clone(),
        };
        let mut textures = TextureCache::new(urls, placeholders);
        let texture_inbox: TextureInbox = Rc::new(RefCell::new(Vec::new()));
        let max_texture = device.limits().max_texture_dimension_2d;
        for slot in TextureSlot::ALL {
            if let Some(ticket) = textures.request_default(slot) {
                loader::spawn_load(ticket, max_texture, texture_inbox.clone());
            }
        }

        let noise = CityNoiseTexture::generate(&mut rng);
        let noise_id = textures.register(GpuTexture::from_rgba(
            device,
            queue,
            "city-noise",
            noise.width(),
            noise.height(),
            noise.pixels(),
            false,
        ));

        let state = SimulationState::default();
        let engine = MaterialEngine::new(state.params(), textures.current_ids(), noise_id);
        let satellites =
            SatelliteRing::new(&mut rng, config.satellites.count, config.satellites.radius);
        let stars = starfield(&mut rng);

        let (width, height) = (gpu.surface_config.width, gpu.surface_config.height);
        let renderer = PlanetRenderer::new(
            device,
            queue,
            gpu.surface_format,
            width,
            height,
            &engine,
            &textures,
            &satellites,
            &stars,
        );
        let mut camera = OrbitCamera::new(config.camera.clone());
        camera.set_viewport(width, height);

        let content_inbox: ContentInbox = Rc::new(RefCell::new(Vec::new()));
        let content = config.content_endpoint.clone().map(|endpoint| {
            log::info!("Content service: {endpoint}");
            ContentClient::new(endpoint, content_inbox.clone())
        });

        Self {
            synced_revision: state.revision(),
            synced_textures: textures.current_ids(),
            gpu,
            ui_state,
            debug_panel,
            input,
            css_size,
            state,
            textures,
            texture_inbox,
            engine,
            renderer,
            camera,
            satellites,
            audio: AudioSystem::new(config.audio_volume),
            content,
            content_inbox,
            start_time: 0.0,
            last_frame_time: 0.0,
        }
    }

    /// Start the requestAnimationFrame loop.
    /// Creates the rAF closure ONCE so nothing leaks per frame.
    pub fn start_loop(app: Rc<RefCell<Self>>) {
        let closure: RafClosure = Rc::new(RefCell::new(None));
        let closure_clone = closure.clone();

        let window = web_sys::window().expect("no global window");

        *closure.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let mut app_ref = app.borrow_mut();

            let delta = if app_ref.last_frame_time > 0.0 {
                timestamp - app_ref.last_frame_time
            } else {
                0.0
            };
            app_ref.last_frame_time = timestamp;

            // Skip the frame after the tab was backgrounded (>100ms gap)
            if delta <= 100.0 {
                app_ref.debug_panel.update(delta);
                app_ref.render_frame(timestamp, delta);
            }

            let window = web_sys::window().expect("no global window");
            window
                .request_animation_frame(
                    closure_clone
                        .borrow()
                        .as_ref()
                        .expect("rAF closure missing")
                        .as_ref()
                        .unchecked_ref(),
                )
                .expect("rAF registration failed");
        }) as Box<dyn FnMut(f64)>));

        // Kick off first frame
        window
            .request_animation_frame(
                closure
                    .borrow()
                    .as_ref()
                    .expect("rAF closure missing")
                    .as_ref()
                    .unchecked_ref(),
            )
            .expect("rAF registration failed");
    }

    /// Render a single frame.
    fn render_frame(&mut self, timestamp: f64, delta_ms: f64) {
        if self.start_time == 0.0 {
            self.start_time = timestamp;
        }
        let elapsed = ((timestamp - self.start_time) / 1000.0) as f32;
        let dt = (delta_ms / 1000.0) as f32;

        // Get surface texture, handle Lost by reconfiguring
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => {
                self.gpu
                    .surface
                    .configure(&self.gpu.device, &self.gpu.surface_config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return;
            }
            Err(e) => {
                log::error!("Surface error: {e:?}");
                return;
            }
        };
        let view = output.texture.create_view(&Default::default());

        self.drain_textures();
        self.drain_content();

        // UI pass
        let screen = self
            .ui_state
            .screen_descriptor(self.gpu.surface_config.width, self.gpu.surface_config.height);
        let events = self.input.borrow_mut().take_egui_events();
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(
                    screen.size_in_pixels[0] as f32 / screen.pixels_per_point,
                    screen.size_in_pixels[1] as f32 / screen.pixels_per_point,
                ),
            )),
            time: Some(timestamp / 1000.0),
            events,
            ..Default::default()
        };
        let mut panel = PanelOutput::default();
        let full_output = {
            let panel_view = PanelView {
                state: &self.state,
                content_enabled: self.content.is_some(),
                volume: self.audio.volume(),
                debug: &self.debug_panel,
            };
            self.ui_state
                .ctx
                .run(raw_input, |ctx| ui::show(ctx, &panel_view, &mut panel))
        };
        let over_ui =
            self.ui_state.ctx.is_pointer_over_area() || self.ui_state.ctx.wants_pointer_input();
        let clipped_primitives = self
            .ui_state
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        self.apply_panel(panel);
        self.handle_pointer(over_ui);
        self.update_scene(elapsed, dt);

        // GPU work
        let Application {
            gpu,
            ui_state,
            renderer,
            state,
            ..
        } = self;
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // 1. Planet scene
        renderer.render(&mut encoder, &view, state.params().show_satellites);

        // 2. Upload egui textures and update buffers
        for (id, delta) in &full_output.textures_delta.set {
            ui_state
                .renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        ui_state.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &clipped_primitives,
            &screen,
        );

        // 3. egui render pass with LoadOp::Load, after the scene.
        //    forget_lifetime() moves the encoder borrow check to run time.
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui-pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            ui_state
                .renderer
                .render(&mut pass, &clipped_primitives, &screen);
        }

        // 4. Free textures after rendering
        for id in &full_output.textures_delta.free {
            ui_state.renderer.free_texture(id);
        }

        // 5. Submit and present
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Upload finished texture loads and hand them to the cache, which drops
    /// any that were superseded while in flight.
    fn drain_textures(&mut self) {
        let loads: Vec<_> = self.texture_inbox.borrow_mut().drain(..).collect();
        for (ticket, result) in loads {
            let slot = ticket.slot;
            let result = result.and_then(|image| {
                GpuTexture::upload(
                    &self.gpu.device,
                    &self.gpu.queue,
                    slot.label(),
                    &image,
                    slot == TextureSlot::Day,
                )
            });
            self.textures.complete(ticket, result);
        }
    }

    fn drain_content(&mut self) {
        let replies: Vec<_> = self.content_inbox.borrow_mut().drain(..).collect();
        for (flow, reply) in replies {
            let step = flows::finish(&mut self.state, flow, reply);
            self.follow(step);
        }
    }

    fn start(&mut self, flow: ContentFlow) {
        if let Some(request) = flows::begin(&mut self.state, flow) {
            self.send(flow, request);
        }
    }

    fn send(&mut self, flow: ContentFlow, request: ContentRequest) {
        match &self.content {
            Some(client) => client.send(flow, request),
            None => {
                let reply = Err(ContentError::RequestFailed(
                    "no content service configured".into(),
                ));
                let step = flows::finish(&mut self.state, flow, reply);
                self.follow(step);
            }
        }
    }

    fn follow(&mut self, step: FlowStep) {
        if let FlowStep::Next(flow, request) = step {
            self.send(flow, request);
        }
    }

    fn apply_panel(&mut self, panel: PanelOutput) {
        if !panel.delta.is_empty() {
            self.state.apply_params(&panel.delta);
        }
        for action in panel.actions {
            match action {
                UiAction::Start(flow) => self.start(flow),
                UiAction::ToggleProbe => self.state.toggle_probe(),
                UiAction::TogglePhoto => self.state.toggle_photo(),
                UiAction::ToggleAudio => self.state.toggle_audio(),
                UiAction::ClosePoi => self.state.close_poi(),
                UiAction::SetVolume(volume) => self.audio.set_volume(volume),
            }
        }
    }

    /// Orbit, zoom and surface scans. Pointer activity over a panel belongs to egui.
    fn handle_pointer(&mut self, over_ui: bool) {
        let shared = self.input.clone();
        let mut input = shared.borrow_mut();
        if !over_ui {
            if input.left_button_down {
                self.camera.orbit(input.mouse_dx, input.mouse_dy);
            }
            if input.scroll_delta != 0.0 {
                self.camera.zoom(input.scroll_delta * ZOOM_SENSITIVITY);
            }
            for &(x, y) in &input.presses {
                self.scan_surface(x, y);
            }
        }
        input.clear_deltas();
    }

    fn scan_surface(&mut self, x: f32, y: f32) {
        let (ndc_x, ndc_y) = input::to_ndc(x, y, self.css_size.0, self.css_size.1);
        let ray = self.camera.ray(ndc_x, ndc_y);
        let inverse = self.engine.transforms().surface_model().inverse();
        if let Some((u, v)) = pick_uv(ray, inverse, SURFACE_RADIUS) {
            log::debug!("surface pick u={u:.3} v={v:.3}");
            self.start(ContentFlow::Poi { u, v });
        }
    }

    /// Push the current parameter revision through textures, materials,
    /// camera, satellites and audio, then stage per-frame uniforms.
    fn update_scene(&mut self, elapsed: f32, dt: f32) {
        let revision = self.state.revision();
        if revision != self.synced_revision {
            let params = self.state.params().clone();
            for (slot, url) in [
                (TextureSlot::Day, params.texture_map_url.as_deref()),
                (TextureSlot::Cloud, params.cloud_map_url.as_deref()),
            ] {
                if let SwapOutcome::Pending(ticket) = self.textures.request(slot, url) {
                    let max_texture = self.gpu.device.limits().max_texture_dimension_2d;
                    loader::spawn_load(ticket, max_texture, self.texture_inbox.clone());
                }
            }
        }

        let ids = self.textures.current_ids();
        if revision != self.synced_revision || ids != self.synced_textures {
            let report = self.engine.sync(self.state.params(), ids);
            if !report.reconstructed.is_empty() {
                log::debug!("materials rebuilt: {:?}", report.reconstructed);
            }
            self.synced_revision = revision;
            self.synced_textures = ids;
        }

        self.engine.advance_frame(elapsed, dt);
        self.camera.advance(dt, self.state.is_probe_landing);
        self.satellites.advance(dt);

        let gpu = &self.gpu;
        self.renderer
            .sync_materials(&gpu.device, &gpu.queue, &self.engine, &self.textures);
        self.renderer.update_frame(
            &gpu.queue,
            &self.camera.to_uniforms(),
            self.engine.transforms(),
            &self.satellites,
        );

        if self.state.audio_enabled != self.audio.is_enabled() {
            self.audio.set_enabled(self.state.audio_enabled);
        }
        self.audio.update(self.state.params());

        self.debug_panel.set_camera_distance(self.camera.distance());
        self.debug_panel.set_engine_info(
            self.engine.construction_count(),
            self.engine.uniform_writes(),
            self.renderer.material_rebuilds(),
        );
        let pending = TextureSlot::ALL
            .iter()
            .filter(|&&slot| self.textures.is_pending(slot))
            .count();
        self.debug_panel.set_pending_textures(pending);
    }
}
