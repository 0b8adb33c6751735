//! Transport for the content service: POST the request JSON to the
//! configured endpoint, hand the response text back through an inbox.

use std::cell::RefCell;
use std::rc::Rc;

use terrascope_core::content::ContentRequest;
use terrascope_core::ContentError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::flows::ContentFlow;

pub type ContentInbox = Rc<RefCell<Vec<(ContentFlow, Result<String, ContentError>)>>>;

pub struct ContentClient {
    endpoint: String,
    inbox: ContentInbox,
}

impl ContentClient {
    pub fn new(endpoint: String, inbox: ContentInbox) -> Self {
        Self { endpoint, inbox }
    }

    pub fn send(&self, flow: ContentFlow, request: ContentRequest) {
        let endpoint = self.endpoint.clone();
        let inbox = self.inbox.clone();
        log::debug!("content request {:?}", request.kind);
        wasm_bindgen_futures::spawn_local(async move {
            let reply = post_json(&endpoint, &request).await;
            inbox.borrow_mut().push((flow, reply));
        });
    }
}

async fn post_json(endpoint: &str, request: &ContentRequest) -> Result<String, ContentError> {
    let body = serde_json::to_string(request)
        .map_err(|e| ContentError::RequestFailed(format!("encoding request: {e}")))?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&body));
    let req = web_sys::Request::new_with_str_and_init(endpoint, &init).map_err(request_error)?;
    req.headers()
        .set("Content-Type", "application/json")
        .map_err(request_error)?;

    let window =
        web_sys::window().ok_or_else(|| ContentError::RequestFailed("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(request_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(request_error)?;
    if !response.ok() {
        return Err(ContentError::RequestFailed(format!(
            "HTTP {}",
            response.status()
        )));
    }
    let text = JsFuture::from(response.text().map_err(request_error)?)
        .await
        .map_err(request_error)?;
    text.as_string()
        .ok_or_else(|| ContentError::RequestFailed("response body is not text".into()))
}

fn request_error(e: JsValue) -> ContentError {
    ContentError::RequestFailed(format!("{e:?}"))
}
