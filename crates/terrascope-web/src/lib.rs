pub mod flows;
pub mod input;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod content;
#[cfg(target_arch = "wasm32")]
mod gpu;
#[cfg(target_arch = "wasm32")]
mod loader;

#[cfg(target_arch = "wasm32")]
mod entry {
    use std::cell::RefCell;
    use std::rc::Rc;

    use terrascope_core::{SceneConfig, TerrascopeError};
    use wasm_bindgen::prelude::*;

    use crate::{app, gpu, input};

    /// WASM entry point. Sets the panic hook and initializes logging.
    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("logger init failed");
        log::info!("Terrascope starting...");

        wasm_bindgen_futures::spawn_local(async {
            if let Err(e) = run().await {
                show_error_to_user(&format!("{e}"));
            }
        });
    }

    /// Async initialization: canvas, physical size, GPU, then the application.
    async fn run() -> Result<(), TerrascopeError> {
        let window = web_sys::window().expect("no global window");
        let document = window.document().expect("no document");

        let canvas = document
            .get_element_by_id("terrascope-canvas")
            .ok_or_else(|| TerrascopeError::CanvasNotFound("terrascope-canvas".into()))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| TerrascopeError::CanvasNotFound("element is not a canvas".into()))?;

        let config = SceneConfig::builtin()?;

        // Backing store in physical pixels
        let dpi_scale = window.device_pixel_ratio() as f32;
        let css_width = canvas.client_width() as f32;
        let css_height = canvas.client_height() as f32;
        let physical_width = (css_width * dpi_scale) as u32;
        let physical_height = (css_height * dpi_scale) as u32;
        canvas.set_width(physical_width);
        canvas.set_height(physical_height);

        log::info!(
            "Canvas: {}x{} CSS, {}x{} physical (DPI: {:.2})",
            css_width,
            css_height,
            physical_width,
            physical_height,
            dpi_scale
        );

        // Register input listeners on canvas ONCE
        let input_state = Rc::new(RefCell::new(input::InputState::new()));
        input::register_input_listeners(&canvas, input_state.clone());

        let gpu_ctx = gpu::init_gpu(canvas, physical_width, physical_height).await?;
        let application = app::Application::new(
            gpu_ctx,
            dpi_scale,
            (css_width, css_height),
            input_state,
            config,
        );
        app::Application::start_loop(Rc::new(RefCell::new(application)));

        Ok(())
    }

    /// Errors go to an alert as well as the console.
    fn show_error_to_user(msg: &str) {
        log::error!("{msg}");
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&format!("Terrascope Error: {msg}"));
        }
    }
}
