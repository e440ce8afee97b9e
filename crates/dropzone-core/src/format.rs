//! Human-readable labels for file tiles.

use serde_json::Value;

use crate::file::FileMeta;
use crate::status::Status;

const SIZE_UNITS: [&str; 9] = ["bytes", "kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with binary (1024) steps.
///
/// One decimal is shown for scaled values below 10 (`"1.5kB"`), none
/// otherwise (`"12MB"`, `"999bytes"`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut index = 0;
    while size >= 1024.0 && index < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        index += 1;
    }
    let precision = usize::from(size < 10.0 && index > 0);
    format!("{size:.precision$}{}", SIZE_UNITS[index])
}

/// Format a duration as `mm:ss`, or `hh:mm:ss` from one hour up.
///
/// Fractional seconds are truncated; negative or non-finite input
/// formats as zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours == 0 {
        format!("{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

/// Tile title: name, size, duration when known, and a failure suffix.
#[must_use]
pub fn preview_title(meta: &FileMeta) -> String {
    let mut title = format!("{}, {}", meta.display_name(), format_bytes(meta.size));
    if let Some(duration) = meta.preview.as_ref().and_then(|p| p.duration) {
        if duration > 0.0 {
            title.push_str(", ");
            title.push_str(&format_duration(duration));
        }
    }
    match meta.status {
        Status::ErrorUploadParams | Status::ExceptionUpload | Status::ErrorUpload => {
            title.push_str(" (upload failed)");
        }
        Status::Aborted => title.push_str(" (cancelled)"),
        _ => {}
    }
    title
}

/// Message for a file stuck in [`Status::ErrorFileSize`].
#[must_use]
pub const fn size_error_label(size: u64, min_size_bytes: u64) -> &'static str {
    if size < min_size_bytes {
        "File too small"
    } else {
        "File too big"
    }
}

/// Short explanation shown on the tile of a failed or rejected file.
///
/// Validation payloads are shown as-is when they are strings.
#[must_use]
pub fn error_label(meta: &FileMeta, min_size_bytes: u64) -> Option<String> {
    let label = match meta.status {
        Status::ErrorFileSize => size_error_label(meta.size, min_size_bytes),
        Status::RejectedFileType => "File type not accepted",
        Status::RejectedMaxFiles => "Too many files",
        Status::ErrorValidation => {
            return Some(match &meta.validation_error {
                Some(Value::String(message)) if !message.is_empty() => message.clone(),
                _ => "Invalid file".to_owned(),
            });
        }
        Status::ErrorUploadParams | Status::ErrorUpload | Status::ExceptionUpload => {
            "Upload failed"
        }
        _ => return None,
    };
    Some(label.to_owned())
}
