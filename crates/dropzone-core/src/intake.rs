//! Intake normalization.
//!
//! Browser inputs come in two shapes: drag payloads expose either a
//! rich item list or a plain file list, file pickers expose a file
//! list. The I/O layer probes the shape and wraps each entry in an
//! [`InputItem`]; [`normalize`] turns them into plain handles so the
//! rest of the pipeline never branches on the source again.

/// One entry of a browser input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem<F> {
    /// A drag item; `None` when it does not carry a file (e.g. dragged
    /// text).
    DragItem(Option<F>),
    /// An entry of a plain file list.
    FileListEntry(F),
}

impl<F> InputItem<F> {
    /// The underlying file, if any.
    pub fn into_file(self) -> Option<F> {
        match self {
            Self::DragItem(file) => file,
            Self::FileListEntry(file) => Some(file),
        }
    }
}

/// Resolve input items to files, preserving source order and skipping
/// items that carry no file.
pub fn normalize<F>(items: impl IntoIterator<Item = InputItem<F>>) -> Vec<F> {
    items.into_iter().filter_map(InputItem::into_file).collect()
}
