//! Dioxus UI components for dropzone.
//!
//! Provides the drop area with its file picker, one preview tile per
//! tracked file, and the per-file progress bar with its action buttons.

mod dropzone;
mod preview_tile;
mod progress_bar;

pub use dropzone::{Dropzone, ErrorListener, StatusListener, Submission, Validator};
pub use preview_tile::PreviewTile;
pub use progress_bar::ProgressBar;
