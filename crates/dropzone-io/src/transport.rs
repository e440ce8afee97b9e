//! `XMLHttpRequest` upload transport.
//!
//! [`start_upload`] opens and sends one request per attempt. Progress
//! and readiness changes are forwarded as [`TransportEvent`]s; the
//! request's `loadend` signals that its listeners may be dropped.
//!
//! Listeners are owned by the returned [`XhrUpload`], not by the
//! request: the caller must keep it alive until `loadend` fires, and
//! must not drop it from inside one of its own listeners.

use std::rc::Rc;

use dropzone_core::transport::{DEFAULT_TIMEOUT_MS, FILE_FIELD, IDENTIFICATION_HEADER};
use dropzone_core::{RequestBody, TransportEvent, UploadParams};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::intake::BrowserFile;

/// Errors that can occur while starting an upload.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The params carry no usable URL.
    #[error("upload params have no url")]
    MissingUrl,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for TransportError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Cheap handle to an in-flight request, used to abort it.
#[derive(Debug, Clone)]
pub struct XhrHandle(web_sys::XmlHttpRequest);

impl XhrHandle {
    /// Abort the request.
    ///
    /// The browser fires `readystatechange` synchronously from inside
    /// this call.
    pub fn abort(&self) {
        let _ = self.0.abort();
    }
}

/// A started upload: its abort handle plus the listeners that must
/// outlive the request.
pub struct XhrUpload {
    handle: XhrHandle,
    _on_progress: Closure<dyn FnMut(web_sys::ProgressEvent)>,
    _on_ready_state: Closure<dyn FnMut()>,
    _on_load_end: Closure<dyn FnMut()>,
}

impl XhrUpload {
    /// Handle for aborting the request.
    #[must_use]
    pub fn handle(&self) -> XhrHandle {
        self.handle.clone()
    }
}

/// Open and send the upload request for `file`.
///
/// The body is a multipart form with the caller's fields followed by
/// the file under [`FILE_FIELD`], unless `params.body` replaces it.
/// The identification header is sent before the caller's headers, so a
/// caller header of the same name follows it.
///
/// # Errors
///
/// Returns [`TransportError::MissingUrl`] without touching the network
/// when `params` has no URL, and [`TransportError::JsError`] if any
/// browser call fails.
pub fn start_upload(
    file: &BrowserFile,
    params: &UploadParams,
    on_event: Rc<dyn Fn(TransportEvent)>,
    on_load_end: impl FnMut() + 'static,
) -> Result<XhrUpload, TransportError> {
    let url = params.destination().ok_or(TransportError::MissingUrl)?;
    let xhr = web_sys::XmlHttpRequest::new()?;
    xhr.open_with_async(params.method.as_str(), url, true)?;
    xhr.set_timeout(params.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

    let (name, value) = IDENTIFICATION_HEADER;
    xhr.set_request_header(name, value)?;
    for (name, value) in &params.headers {
        xhr.set_request_header(name, value)?;
    }

    let on_progress = {
        let on_event = Rc::clone(&on_event);
        Closure::<dyn FnMut(web_sys::ProgressEvent)>::new(move |event: web_sys::ProgressEvent| {
            let total = if event.length_computable() {
                event.total()
            } else {
                0.0
            };
            on_event(TransportEvent::Progress {
                loaded: event.loaded(),
                total,
            });
        })
    };
    xhr.upload()?
        .set_onprogress(Some(on_progress.as_ref().unchecked_ref()));

    let on_ready_state = {
        let xhr = xhr.clone();
        Closure::<dyn FnMut()>::new(move || {
            on_event(TransportEvent::ReadyState {
                ready_state: xhr.ready_state(),
                http_status: xhr.status().unwrap_or(0),
            });
        })
    };
    xhr.set_onreadystatechange(Some(on_ready_state.as_ref().unchecked_ref()));

    let on_load_end = Closure::<dyn FnMut()>::new(on_load_end);
    xhr.set_onloadend(Some(on_load_end.as_ref().unchecked_ref()));

    match &params.body {
        Some(RequestBody::Text(text)) => xhr.send_with_opt_str(Some(text.as_str()))?,
        Some(RequestBody::Bytes(bytes)) => {
            let buffer: js_sys::Object = js_sys::Uint8Array::from(bytes.as_slice()).into();
            xhr.send_with_opt_buffer_source(Some(&buffer))?;
        }
        None => {
            let form = web_sys::FormData::new()?;
            for (name, value) in &params.fields {
                form.append_with_str(name, value)?;
            }
            form.append_with_blob_and_filename(FILE_FIELD, file.raw(), &file.raw().name())?;
            xhr.send_with_opt_form_data(Some(&form))?;
        }
    }

    Ok(XhrUpload {
        handle: XhrHandle(xhr),
        _on_progress: on_progress,
        _on_ready_state: on_ready_state,
        _on_load_end: on_load_end,
    })
}
