//! Tracked file records.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::preview::PreviewInfo;
use crate::status::Status;

/// Read-only view of a platform file object.
///
/// Implemented by the I/O layer for its raw handle type; the controller
/// only reads these properties once, at intake.
pub trait FileHandle {
    /// File name, if the source exposes one.
    fn name(&self) -> Option<String>;
    /// Size in bytes.
    fn size(&self) -> u64;
    /// MIME type; empty when unknown.
    fn mime_type(&self) -> String;
    /// Last modification time in milliseconds since the Unix epoch.
    fn last_modified(&self) -> Option<f64>;
}

/// Opaque identifier of a tracked file, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Allocate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Caller-visible metadata of a tracked file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Identifier, duplicated from the record for snapshot consumers.
    pub id: FileId,
    /// Display name captured at intake.
    pub name: Option<String>,
    /// Size in bytes captured at intake.
    pub size: u64,
    /// MIME type captured at intake.
    pub mime_type: String,
    /// Last modification time (ms since epoch) captured at intake.
    pub last_modified: Option<f64>,
    /// Intake time (ms since epoch).
    pub uploaded_at: f64,
    /// Current lifecycle status.
    pub status: Status,
    /// Upload progress, 0-100.
    pub percent: f64,
    /// Locally generated preview, when the media type has one.
    pub preview: Option<PreviewInfo>,
    /// Payload returned by the `validate` hook on failure.
    pub validation_error: Option<Value>,
    /// Metadata merged back from the change hook and upload params.
    pub extra: Map<String, Value>,
}

impl FileMeta {
    /// Merge caller-supplied metadata.
    ///
    /// A `status` key is dropped: status is only ever written by the
    /// controller.
    pub fn merge_extra(&mut self, mut extra: Map<String, Value>) {
        extra.remove("status");
        self.extra.extend(extra);
    }

    /// Name to show in the UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "?",
        }
    }
}

/// A raw file wrapped with its lifecycle state.
///
/// `F` is the platform file handle, `H` the in-flight transport handle.
#[derive(Debug)]
pub struct TrackedFile<F, H> {
    pub(crate) handle: F,
    pub(crate) meta: FileMeta,
    pub(crate) transport: Option<H>,
    pub(crate) attempt: u32,
}

impl<F: FileHandle, H> TrackedFile<F, H> {
    /// Wrap a raw handle, capturing its immutable properties.
    pub(crate) fn new(handle: F, status: Status) -> Self {
        let id = FileId::new();
        let meta = FileMeta {
            id,
            name: handle.name(),
            size: handle.size(),
            mime_type: handle.mime_type(),
            last_modified: handle.last_modified(),
            uploaded_at: now_millis(),
            status,
            percent: 0.0,
            preview: None,
            validation_error: None,
            extra: Map::new(),
        };
        Self {
            handle,
            meta,
            transport: None,
            attempt: 0,
        }
    }
}

impl<F, H> TrackedFile<F, H> {
    /// The file's identifier.
    #[must_use]
    pub const fn id(&self) -> FileId {
        self.meta.id
    }

    /// The raw platform file.
    #[must_use]
    pub const fn handle(&self) -> &F {
        &self.handle
    }

    /// Current metadata.
    #[must_use]
    pub const fn meta(&self) -> &FileMeta {
        &self.meta
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.meta.status
    }

    /// Whether a transport handle is held (only while the upload is in flight).
    #[must_use]
    pub const fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Upload attempt generation; bumped every time an upload starts.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[allow(clippy::cast_precision_loss)]
fn now_millis() -> f64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_millis() as f64)
}
