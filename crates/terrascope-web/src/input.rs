#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Accumulated input state read each frame by the application.
///
/// Positions are canvas-relative CSS pixels, which equal egui points because
/// the egui context runs at the device pixel ratio.
pub struct InputState {
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll_delta: f32,
    pub left_button_down: bool,
    pub pointer: Option<(f32, f32)>,
    /// Primary-button presses since the last frame.
    pub presses: Vec<(f32, f32)>,
    egui_events: Vec<egui::Event>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            mouse_dx: 0.0,
            mouse_dy: 0.0,
            scroll_delta: 0.0,
            left_button_down: false,
            pointer: None,
            presses: Vec::new(),
            egui_events: Vec::new(),
        }
    }

    pub fn on_move(&mut self, x: f32, y: f32, dx: f32, dy: f32) {
        self.mouse_dx += dx;
        self.mouse_dy += dy;
        self.pointer = Some((x, y));
        self.egui_events.push(egui::Event::PointerMoved(egui::pos2(x, y)));
    }

    pub fn on_button(&mut self, x: f32, y: f32, button: i16, pressed: bool) {
        let egui_button = match button {
            0 => egui::PointerButton::Primary,
            1 => egui::PointerButton::Middle,
            2 => egui::PointerButton::Secondary,
            _ => return,
        };
        if button == 0 {
            self.left_button_down = pressed;
            if pressed {
                self.presses.push((x, y));
            }
        }
        self.pointer = Some((x, y));
        self.egui_events.push(egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui_button,
            pressed,
            modifiers: egui::Modifiers::default(),
        });
    }

    /// `delta_y` is the raw DOM value (positive scrolls down); `line_mode`
    /// is `deltaMode == 1`.
    pub fn on_wheel(&mut self, delta_y: f32, line_mode: bool) {
        let delta = -delta_y;
        self.scroll_delta += if line_mode { delta * 20.0 } else { delta / 3.0 };
        let points = if line_mode { delta * 16.0 } else { delta };
        self.egui_events.push(egui::Event::MouseWheel {
            unit: egui::MouseWheelUnit::Point,
            delta: egui::vec2(0.0, points),
            modifiers: egui::Modifiers::default(),
        });
    }

    pub fn on_leave(&mut self) {
        self.left_button_down = false;
        self.pointer = None;
        self.egui_events.push(egui::Event::PointerGone);
    }

    /// Hand queued events to egui.
    pub fn take_egui_events(&mut self) -> Vec<egui::Event> {
        std::mem::take(&mut self.egui_events)
    }

    /// Clear per-frame deltas (called after the camera consumes them).
    pub fn clear_deltas(&mut self) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll_delta = 0.0;
        self.presses.clear();
    }
}

/// Canvas position in CSS pixels to normalized device coordinates.
pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    let w = width.max(1.0);
    let h = height.max(1.0);
    (2.0 * x / w - 1.0, 1.0 - 2.0 * y / h)
}

/// Register mouse/wheel event listeners on the canvas ONCE at init.
/// Closures are leaked via `.forget()` since they live for the app lifetime.
#[cfg(target_arch = "wasm32")]
pub fn register_input_listeners(
    canvas: &web_sys::HtmlCanvasElement,
    state: Rc<RefCell<InputState>>,
) {
    let target: &web_sys::EventTarget = canvas.as_ref();

    // mousemove
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
                state.borrow_mut().on_move(
                    e.offset_x() as f32,
                    e.offset_y() as f32,
                    e.movement_x() as f32,
                    e.movement_y() as f32,
                );
            });
        target
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
            .expect("failed to add mousemove listener");
        closure.forget();
    }

    // mousedown / mouseup
    for (name, pressed) in [("mousedown", true), ("mouseup", false)] {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
                state.borrow_mut().on_button(
                    e.offset_x() as f32,
                    e.offset_y() as f32,
                    e.button(),
                    pressed,
                );
            });
        target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .expect("failed to add mouse button listener");
        closure.forget();
    }

    // mouseleave
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_: web_sys::MouseEvent| {
                state.borrow_mut().on_leave();
            });
        target
            .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
            .expect("failed to add mouseleave listener");
        closure.forget();
    }

    // wheel (zoom); non-passive so preventDefault works
    {
        let state = state.clone();
        let closure =
            Closure::<dyn FnMut(web_sys::WheelEvent)>::new(move |e: web_sys::WheelEvent| {
                e.prevent_default();
                state
                    .borrow_mut()
                    .on_wheel(e.delta_y() as f32, e.delta_mode() == 1);
            });
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .expect("failed to add wheel listener");
        closure.forget();
    }

    // contextmenu
    {
        let closure =
            Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
                e.prevent_default();
            });
        target
            .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref())
            .expect("failed to add contextmenu listener");
        closure.forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::new();
        input.on_button(10.0, 20.0, 0, true);
        assert!(input.left_button_down);
        assert_eq!(input.presses, vec![(10.0, 20.0)]);
        input.on_button(10.0, 20.0, 0, false);
        assert!(!input.left_button_down);
        assert_eq!(input.take_egui_events().len(), 2);
        assert!(input.take_egui_events().is_empty());

        input.clear_deltas();
        assert!(input.presses.is_empty());
    }

    #[test]
    fn test_secondary_button_is_not_a_press() {
        let mut input = InputState::new();
        input.on_button(1.0, 1.0, 2, true);
        assert!(!input.left_button_down);
        assert!(input.presses.is_empty());
        input.on_button(1.0, 1.0, 4, true);
        assert_eq!(input.take_egui_events().len(), 1);
    }

    #[test]
    fn test_motion_accumulates() {
        let mut input = InputState::new();
        input.on_move(5.0, 5.0, 3.0, -1.0);
        input.on_move(6.0, 4.0, 2.0, -2.0);
        assert_eq!((input.mouse_dx, input.mouse_dy), (5.0, -3.0));
        assert_eq!(input.pointer, Some((6.0, 4.0)));
        input.clear_deltas();
        assert_eq!((input.mouse_dx, input.mouse_dy), (0.0, 0.0));
    }

    #[test]
    fn test_wheel_normalization() {
        let mut input = InputState::new();
        input.on_wheel(300.0, false);
        assert_eq!(input.scroll_delta, -100.0);
        input.clear_deltas();
        input.on_wheel(-3.0, true);
        assert_eq!(input.scroll_delta, 60.0);
    }

    #[test]
    fn test_ndc() {
        assert_eq!(to_ndc(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(to_ndc(0.0, 0.0, 800.0, 600.0), (-1.0, 1.0));
        assert_eq!(to_ndc(800.0, 600.0, 800.0, 600.0), (1.0, -1.0));
    }
}
