//! Texture fetches. Each load runs as its own future and drops its result in
//! an inbox the frame loop drains; GPU upload happens on the frame side.

use std::cell::RefCell;
use std::rc::Rc;

use terrascope_render::{decode, DecodedImage, LoadTicket, TextureError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub type TextureInbox = Rc<RefCell<Vec<(LoadTicket, Result<DecodedImage, TextureError>)>>>;

/// `max_dimension` is the device's 2D texture limit; larger images are
/// scaled down while decoding.
pub fn spawn_load(ticket: LoadTicket, max_dimension: u32, inbox: TextureInbox) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = match fetch_bytes(&ticket.url).await {
            Ok(bytes) => decode(&bytes, max_dimension),
            Err(e) => Err(e),
        };
        inbox.borrow_mut().push((ticket, result));
    });
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, TextureError> {
    let window = web_sys::window().ok_or_else(|| TextureError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(fetch_error)?;
    if !response.ok() {
        return Err(TextureError::Fetch(format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn fetch_error(e: JsValue) -> TextureError {
    TextureError::Fetch(format!("{e:?}"))
}
