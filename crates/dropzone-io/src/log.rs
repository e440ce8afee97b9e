//! Browser console logging.
//!
//! Every line carries a `dropzone:` prefix so it can be filtered in the
//! devtools console. The core crate never logs; failures there surface
//! as statuses.

use std::fmt::Display;

use wasm_bindgen::JsValue;

fn line(context: &str, detail: &dyn Display) -> JsValue {
    JsValue::from_str(&format!("dropzone: {context}: {detail}"))
}

/// Log an informational message.
pub fn info(message: &str) {
    web_sys::console::info_1(&JsValue::from_str(&format!("dropzone: {message}")));
}

/// Log a recoverable problem with its cause.
pub fn warn(context: &str, detail: &dyn Display) {
    web_sys::console::warn_1(&line(context, detail));
}

/// Log a failure with its cause.
pub fn error(context: &str, detail: &dyn Display) {
    web_sys::console::error_1(&line(context, detail));
}
