//! Transport event mapping.
//!
//! The browser transport reports raw readiness transitions, HTTP status
//! codes and byte counts. This module turns them into lifecycle
//! statuses and progress percentages without touching the network.

use crate::status::Status;

/// Header attached to every upload request.
pub const IDENTIFICATION_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Multipart field name carrying the file.
pub const FILE_FIELD: &str = "file";

/// Default transport timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 100_000;

/// `XMLHttpRequest.readyState` once response headers are available.
pub const HEADERS_RECEIVED: u16 = 2;

/// `XMLHttpRequest.readyState` once the request has finished.
pub const DONE: u16 = 4;

/// Event reported by an in-flight transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Upload progress tick.
    Progress {
        /// Bytes sent so far.
        loaded: f64,
        /// Total bytes, `0` when unknown.
        total: f64,
    },
    /// Readiness transition.
    ReadyState {
        /// The transport's readiness milestone.
        ready_state: u16,
        /// HTTP status, `0` when no response was readable (network
        /// failure, timeout or abort).
        http_status: u16,
    },
}

/// Percentage of an upload, `100` when the total is unknown or zero.
#[must_use]
pub fn progress_percent(loaded: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() {
        (loaded * 100.0 / total).clamp(0.0, 100.0)
    } else {
        100.0
    }
}

/// Map a readiness transition to the next lifecycle status.
///
/// Only the headers-received and done milestones matter. Returns `None`
/// when the transition does not change the status:
///
/// - no readable status after a caller abort is not an exception;
/// - a second error status does not re-report `ErrorUpload`.
#[must_use]
pub const fn map_ready_state(ready_state: u16, http_status: u16, current: Status) -> Option<Status> {
    if ready_state != HEADERS_RECEIVED && ready_state != DONE {
        return None;
    }
    match http_status {
        0 => {
            if matches!(current, Status::Aborted) {
                None
            } else {
                Some(Status::ExceptionUpload)
            }
        }
        1..=399 => {
            if ready_state == HEADERS_RECEIVED {
                Some(Status::HeadersReceived)
            } else {
                Some(Status::Done)
            }
        }
        _ => {
            if matches!(current, Status::ErrorUpload) {
                None
            } else {
                Some(Status::ErrorUpload)
            }
        }
    }
}
