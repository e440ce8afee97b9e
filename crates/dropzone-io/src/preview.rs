//! Local previews for image, audio, and video files.
//!
//! A preview is produced by pointing a detached probe element at an
//! object URL of the file and waiting for it to load enough to report
//! its dimensions or duration. Image and video URLs stay alive for the
//! tile to display and must be released via [`release_preview`]; audio
//! URLs are revoked as soon as the duration is known.

use std::cell::RefCell;
use std::rc::Rc;

use dropzone_core::{FileHandle, MediaKind, PreviewInfo};
use futures::channel::oneshot;
use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::intake::BrowserFile;
use crate::log;

/// Errors that can occur while generating a preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// No `document` to create the probe element in.
    #[error("no global document")]
    NoDocument,

    /// The probe element fired `error`.
    #[error("the browser could not decode the file")]
    Load,

    /// Nothing loaded within the timeout.
    #[error("timed out after {0} ms")]
    Timeout(u32),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for PreviewError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Generate a preview for `file`, giving up after `timeout_ms`.
///
/// Returns `None` for files that are not image, audio, or video, and
/// for files the browser cannot load in time. Never fails: problems are
/// logged and the file simply has no preview.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn generate_preview(file: &BrowserFile, timeout_ms: u32) -> Option<PreviewInfo> {
    let kind = MediaKind::of(&file.mime_type())?;
    match probe(file, kind, timeout_ms).await {
        Ok(preview) => Some(preview),
        Err(e) => {
            log::warn(&format!("no preview for {}", file.raw().name()), &e);
            None
        }
    }
}

/// Revoke a preview URL. A no-op for URLs already revoked.
pub fn release_preview(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

#[allow(clippy::future_not_send)]
async fn probe(
    file: &BrowserFile,
    kind: MediaKind,
    timeout_ms: u32,
) -> Result<PreviewInfo, PreviewError> {
    let url = web_sys::Url::create_object_url_with_blob(file.raw())?;
    match load(&url, kind, timeout_ms).await {
        Ok(mut preview) => {
            if kind.retains_url() {
                preview.url = Some(url);
            } else {
                release_preview(&url);
            }
            Ok(preview)
        }
        Err(e) => {
            release_preview(&url);
            Err(e)
        }
    }
}

#[allow(clippy::future_not_send)]
async fn load(url: &str, kind: MediaKind, timeout_ms: u32) -> Result<PreviewInfo, PreviewError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(PreviewError::NoDocument)?;
    let (tag, ready_event) = match kind {
        MediaKind::Image => ("img", "load"),
        MediaKind::Audio => ("audio", "loadedmetadata"),
        MediaKind::Video => ("video", "loadedmetadata"),
    };
    let element = document.create_element(tag)?;

    // Whichever of ready/error fires first settles the probe.
    let (sender, receiver) = oneshot::channel::<bool>();
    let sender = Rc::new(RefCell::new(Some(sender)));
    let settle = |loaded: bool| {
        let sender = Rc::clone(&sender);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(loaded);
            }
        })
    };
    let on_ready = settle(true);
    let on_error = settle(false);
    element.add_event_listener_with_callback(ready_event, on_ready.as_ref().unchecked_ref())?;
    element.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
    if kind != MediaKind::Image {
        element.set_attribute("preload", "metadata")?;
    }
    element.set_attribute("src", url)?;

    let outcome = select(receiver, TimeoutFuture::new(timeout_ms)).await;

    // Detach before the closures drop so a late event cannot call them.
    let _ = element.remove_event_listener_with_callback(ready_event, on_ready.as_ref().unchecked_ref());
    let _ = element.remove_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
    let _ = element.remove_attribute("src");

    match outcome {
        Either::Left((Ok(true), _)) => Ok(measure(&element, kind)),
        Either::Left(_) => Err(PreviewError::Load),
        Either::Right(_) => Err(PreviewError::Timeout(timeout_ms)),
    }
}

/// Read dimensions and duration off a loaded probe element.
fn measure(element: &web_sys::Element, kind: MediaKind) -> PreviewInfo {
    let mut preview = PreviewInfo {
        kind,
        url: None,
        width: None,
        height: None,
        duration: None,
    };
    if let Some(image) = element.dyn_ref::<web_sys::HtmlImageElement>() {
        preview.width = Some(image.natural_width());
        preview.height = Some(image.natural_height());
    }
    if let Some(video) = element.dyn_ref::<web_sys::HtmlVideoElement>() {
        preview.width = Some(video.video_width());
        preview.height = Some(video.video_height());
    }
    if let Some(media) = element.dyn_ref::<web_sys::HtmlMediaElement>() {
        let duration = media.duration();
        preview.duration = duration.is_finite().then_some(duration);
    }
    preview
}
