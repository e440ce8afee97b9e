//! Lifecycle statuses and the edges between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked file.
///
/// Serializes to the snake_case names callers match on
/// (`"rejected_file_type"`, `"headers_received"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The file did not match the accept pattern.
    RejectedFileType,
    /// Admitting the file would exceed `max_files`.
    RejectedMaxFiles,
    /// Admitted; size check, preview and validation are running.
    Preparing,
    /// Size outside `[min_size_bytes, max_size_bytes]`.
    ErrorFileSize,
    /// The `validate` hook returned a truthy payload.
    ErrorValidation,
    /// Upload params resolved but `auto_upload` is off.
    Ready,
    /// Restarted from [`Ready`](Self::Ready); params are being re-resolved.
    Started,
    /// Waiting on the upload-params resolver.
    GettingUploadParams,
    /// Upload params had no destination address.
    ErrorUploadParams,
    /// Transport in flight.
    Uploading,
    /// The transport finished with no readable HTTP status.
    ExceptionUpload,
    /// Cancelled by the caller while uploading.
    Aborted,
    /// Restarted from a failure or abort; params are being re-resolved.
    Restarted,
    /// Removed by the caller.
    Removed,
    /// The server answered with a status >= 400.
    ErrorUpload,
    /// Response headers arrived with a success status.
    HeadersReceived,
    /// Uploaded, or settled without uploading.
    Done,
}

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::RejectedFileType,
        Self::RejectedMaxFiles,
        Self::Preparing,
        Self::ErrorFileSize,
        Self::ErrorValidation,
        Self::Ready,
        Self::Started,
        Self::GettingUploadParams,
        Self::ErrorUploadParams,
        Self::Uploading,
        Self::ExceptionUpload,
        Self::Aborted,
        Self::Restarted,
        Self::Removed,
        Self::ErrorUpload,
        Self::HeadersReceived,
        Self::Done,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RejectedFileType => "rejected_file_type",
            Self::RejectedMaxFiles => "rejected_max_files",
            Self::Preparing => "preparing",
            Self::ErrorFileSize => "error_file_size",
            Self::ErrorValidation => "error_validation",
            Self::Ready => "ready",
            Self::Started => "started",
            Self::GettingUploadParams => "getting_upload_params",
            Self::ErrorUploadParams => "error_upload_params",
            Self::Uploading => "uploading",
            Self::ExceptionUpload => "exception_upload",
            Self::Aborted => "aborted",
            Self::Restarted => "restarted",
            Self::Removed => "removed",
            Self::ErrorUpload => "error_upload",
            Self::HeadersReceived => "headers_received",
            Self::Done => "done",
        }
    }

    /// Statuses reported to the optional error hook.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::ErrorFileSize
                | Self::ErrorValidation
                | Self::ErrorUploadParams
                | Self::ErrorUpload
                | Self::ExceptionUpload
                | Self::RejectedFileType
                | Self::RejectedMaxFiles
        )
    }

    /// No automatic transition leaves these statuses. Restart and remove
    /// remain available as explicit caller actions where allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done
                | Self::Removed
                | Self::ErrorFileSize
                | Self::ErrorValidation
                | Self::ErrorUploadParams
                | Self::RejectedFileType
                | Self::RejectedMaxFiles
        )
    }

    /// Whether a file in this status occupies a `max_files` slot.
    #[must_use]
    pub const fn is_admitted(self) -> bool {
        !matches!(
            self,
            Self::RejectedFileType | Self::RejectedMaxFiles | Self::Removed
        )
    }

    /// Whether the file has entered the upload branch at least once, so
    /// a progress indicator is meaningful.
    #[must_use]
    pub const fn is_upload_phase(self) -> bool {
        matches!(
            self,
            Self::Uploading
                | Self::HeadersReceived
                | Self::Done
                | Self::Aborted
                | Self::ErrorUpload
                | Self::ExceptionUpload
        )
    }

    /// Cancel only applies to an in-flight transport.
    #[must_use]
    pub const fn allows_cancel(self) -> bool {
        matches!(self, Self::Uploading)
    }

    /// Remove is hidden while the pipeline is actively working the file.
    #[must_use]
    pub const fn allows_remove(self) -> bool {
        !matches!(
            self,
            Self::Preparing | Self::GettingUploadParams | Self::Uploading | Self::Removed
        )
    }

    /// Statuses from which the caller may re-enter the upload branch.
    #[must_use]
    pub const fn allows_restart(self) -> bool {
        matches!(
            self,
            Self::ErrorUploadParams
                | Self::ExceptionUpload
                | Self::ErrorUpload
                | Self::Aborted
                | Self::Ready
        )
    }

    /// Whether `from -> to` is an edge of the lifecycle.
    ///
    /// `from == None` is intake: a file that has not been assigned a
    /// status yet.
    #[must_use]
    pub const fn transition_allowed(from: Option<Self>, to: Self) -> bool {
        let Some(from) = from else {
            return matches!(
                to,
                Self::Preparing | Self::RejectedFileType | Self::RejectedMaxFiles
            );
        };
        if matches!(to, Self::Removed) {
            return !matches!(from, Self::Removed);
        }
        match from {
            Self::Preparing => matches!(
                to,
                Self::ErrorFileSize | Self::ErrorValidation | Self::GettingUploadParams
            ),
            Self::GettingUploadParams => matches!(
                to,
                Self::Done
                    | Self::Ready
                    | Self::ErrorUploadParams
                    | Self::Uploading
                    | Self::ExceptionUpload
            ),
            Self::Started | Self::Restarted => matches!(
                to,
                Self::Done | Self::ErrorUploadParams | Self::Uploading | Self::ExceptionUpload
            ),
            Self::Uploading => matches!(
                to,
                Self::HeadersReceived
                    | Self::Done
                    | Self::ErrorUpload
                    | Self::ExceptionUpload
                    | Self::Aborted
            ),
            Self::HeadersReceived => {
                matches!(to, Self::Done | Self::ErrorUpload | Self::ExceptionUpload)
            }
            Self::Ready => matches!(to, Self::Started),
            Self::Aborted | Self::ErrorUploadParams | Self::ErrorUpload | Self::ExceptionUpload => {
                matches!(to, Self::Restarted)
            }
            Self::RejectedFileType
            | Self::RejectedMaxFiles
            | Self::ErrorFileSize
            | Self::ErrorValidation
            | Self::Done
            | Self::Removed => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_as_str() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn deserializes_wire_name() {
        let status: Status = serde_json::from_str("\"headers_received\"").unwrap();
        assert_eq!(status, Status::HeadersReceived);
    }

    #[test]
    fn intake_edges() {
        assert!(Status::transition_allowed(None, Status::Preparing));
        assert!(Status::transition_allowed(None, Status::RejectedFileType));
        assert!(Status::transition_allowed(None, Status::RejectedMaxFiles));
        assert!(!Status::transition_allowed(None, Status::Uploading));
        assert!(!Status::transition_allowed(None, Status::Done));
    }

    #[test]
    fn remove_is_reachable_from_everything_but_removed() {
        for status in Status::ALL {
            assert_eq!(
                Status::transition_allowed(Some(status), Status::Removed),
                status != Status::Removed,
                "{status} -> removed",
            );
        }
    }

    #[test]
    fn terminal_rejections_have_no_outgoing_edges_except_remove() {
        for from in [
            Status::RejectedFileType,
            Status::RejectedMaxFiles,
            Status::ErrorFileSize,
            Status::ErrorValidation,
            Status::Done,
        ] {
            for to in Status::ALL {
                if to != Status::Removed {
                    assert!(!Status::transition_allowed(Some(from), to), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn restart_edges_match_restartable_statuses() {
        for status in Status::ALL {
            let restarts = Status::transition_allowed(Some(status), Status::Restarted)
                || Status::transition_allowed(Some(status), Status::Started);
            assert_eq!(restarts, status.allows_restart(), "{status}");
        }
    }

    #[test]
    fn error_statuses() {
        assert!(Status::ErrorUpload.is_error());
        assert!(Status::RejectedMaxFiles.is_error());
        assert!(!Status::Aborted.is_error());
        assert!(!Status::Done.is_error());
    }

    #[test]
    fn admitted_excludes_rejections_and_removed() {
        assert!(!Status::RejectedFileType.is_admitted());
        assert!(!Status::RejectedMaxFiles.is_admitted());
        assert!(!Status::Removed.is_admitted());
        assert!(Status::ErrorFileSize.is_admitted());
        assert!(Status::Done.is_admitted());
    }

    #[test]
    fn action_availability() {
        assert!(Status::Uploading.allows_cancel());
        assert!(!Status::HeadersReceived.allows_cancel());
        assert!(!Status::Uploading.allows_remove());
        assert!(!Status::Preparing.allows_remove());
        assert!(Status::Done.allows_remove());
        assert!(Status::Ready.allows_restart());
        assert!(!Status::Done.allows_restart());
    }
}
