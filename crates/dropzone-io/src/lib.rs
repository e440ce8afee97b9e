//! dropzone-io: Browser I/O and Dioxus component library.
//!
//! Reads files out of drop and picker events, generates local previews
//! through object URLs, uploads over `XMLHttpRequest`, and runs the
//! `dropzone-core` controller against those facilities. The
//! [`Dropzone`] component wraps it all in a drop area.
//!
//! Everything here requires a browser environment
//! (`wasm32-unknown-unknown` target).

pub mod components;
pub mod driver;
pub mod intake;
pub mod log;
pub mod preview;
pub mod transport;

pub use components::{Dropzone, PreviewTile, ProgressBar, Submission};
pub use driver::{Driver, ParamsError, ParamsFuture, ParamsResolver};
pub use intake::BrowserFile;
pub use transport::{TransportError, XhrHandle};
