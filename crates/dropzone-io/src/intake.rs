//! Browser file intake.
//!
//! Drop and picker events carry files in different places: a drop has a
//! `dataTransfer` with a file list and an item list, a picker change has
//! a `files` list on its `<input>`. [`files_from_event`] probes the event
//! structurally rather than by event type, so any event shape that
//! carries files works.

use dropzone_core::intake::normalize;
use dropzone_core::{FileHandle, InputItem};
use wasm_bindgen::{JsCast, JsValue};

/// A browser `File` seen through [`FileHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserFile(pub web_sys::File);

impl BrowserFile {
    /// The raw `File` object.
    #[must_use]
    pub const fn raw(&self) -> &web_sys::File {
        &self.0
    }
}

impl FileHandle for BrowserFile {
    fn name(&self) -> Option<String> {
        Some(self.0.name())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    fn mime_type(&self) -> String {
        self.0.type_()
    }

    fn last_modified(&self) -> Option<f64> {
        Some(self.0.last_modified())
    }
}

/// Extract the files carried by a drop or picker change event.
///
/// Returns an empty list for events that carry no files.
#[must_use]
pub fn files_from_event(event: &web_sys::Event) -> Vec<BrowserFile> {
    let items = data_transfer(event).map_or_else(
        || picker_items(event),
        |transfer| {
            let listed = file_list_items(transfer.files());
            if listed.is_empty() {
                drag_items(&transfer)
            } else {
                listed
            }
        },
    );
    normalize(items)
}

/// MIME types of the files hovering during a drag.
///
/// File contents and names are hidden until the drop; item types are
/// the only thing available for the drag-over reject check.
#[must_use]
pub fn hovering_types(event: &web_sys::Event) -> Vec<String> {
    let Some(transfer) = data_transfer(event) else {
        return Vec::new();
    };
    let list = transfer.items();
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter(|item| item.kind() == "file")
        .map(|item| item.type_())
        .collect()
}

fn data_transfer(event: &web_sys::Event) -> Option<web_sys::DataTransfer> {
    js_sys::Reflect::get(event, &JsValue::from_str("dataTransfer"))
        .ok()
        .and_then(|value| value.dyn_into::<web_sys::DataTransfer>().ok())
}

fn picker_items(event: &web_sys::Event) -> Vec<InputItem<BrowserFile>> {
    let files = event
        .target()
        .and_then(|target| js_sys::Reflect::get(&target, &JsValue::from_str("files")).ok())
        .and_then(|value| value.dyn_into::<web_sys::FileList>().ok());
    file_list_items(files)
}

fn file_list_items(files: Option<web_sys::FileList>) -> Vec<InputItem<BrowserFile>> {
    let Some(files) = files else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|index| files.get(index))
        .map(|file| InputItem::FileListEntry(BrowserFile(file)))
        .collect()
}

fn drag_items(transfer: &web_sys::DataTransfer) -> Vec<InputItem<BrowserFile>> {
    let list = transfer.items();
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter(|item| item.kind() == "file")
        .map(|item| InputItem::DragItem(item.get_as_file().ok().flatten().map(BrowserFile)))
        .collect()
}
