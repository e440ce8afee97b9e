//! dropzone-core: File lifecycle state machine and upload pipeline (sans-IO).
//!
//! Tracks each dropped or picked file through:
//! intake -> acceptance -> size check -> preview -> validation ->
//! upload params -> upload -> terminal state.
//!
//! This crate has **no I/O dependencies** -- it never touches the DOM,
//! object URLs or the network. The [`Controller`] mutates its
//! [`FileCollection`] and returns [`Effect`]s describing the I/O the
//! caller must perform. All browser interaction lives in `dropzone-io`.

pub mod accept;
pub mod collection;
pub mod config;
pub mod controller;
pub mod file;
pub mod format;
pub mod intake;
pub mod params;
pub mod preview;
pub mod resolve;
pub mod selection;
pub mod status;
pub mod transport;

pub use accept::{BOGUS_MIME_TYPE, DragState, accepts, is_admissible};
pub use collection::FileCollection;
pub use config::{ConfigError, DropzoneConfig, DropzoneExtra, MaxFilesPolicy};
pub use controller::{Controller, Effect, Hooks};
pub use file::{FileHandle, FileId, FileMeta, TrackedFile};
pub use intake::InputItem;
pub use params::{HttpMethod, RequestBody, UploadParams};
pub use preview::{MediaKind, PreviewInfo};
pub use resolve::{ActionContext, ActionPolicy, Actions, Resolvable};
pub use selection::Selection;
pub use status::Status;
pub use transport::TransportEvent;
