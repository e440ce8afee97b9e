//! Drop area configuration.

use serde::{Deserialize, Serialize};

use crate::transport::DEFAULT_TIMEOUT_MS;

/// Default bound on waiting for preview metadata, in milliseconds.
pub const DEFAULT_PREVIEW_TIMEOUT_MS: u32 = 10_000;

/// What happens to a batch that does not fit under `max_files`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFilesPolicy {
    /// Admit files in order until the limit is reached; the overflow is
    /// rejected.
    #[default]
    RejectOverflow,
    /// If the accepted part of the batch does not fit, reject all of it.
    RejectBatch,
}

/// Configuration for a drop area.
///
/// Every field has a default, so partial JSON objects deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropzoneConfig {
    /// Accept pattern in `<input accept>` syntax; `"*"` accepts all.
    pub accept: String,

    /// Smallest admissible file size in bytes (inclusive).
    pub min_size_bytes: u64,

    /// Largest admissible file size in bytes (inclusive).
    pub max_size_bytes: u64,

    /// Cap on files holding a slot at once.
    pub max_files: usize,

    /// Whether one batch may carry more than one file.
    pub multiple: bool,

    /// Upload as soon as params resolve, or wait in `Ready` for an
    /// explicit restart.
    pub auto_upload: bool,

    /// Transport timeout in milliseconds, unless the upload params
    /// override it.
    pub timeout_ms: u32,

    /// Bound on waiting for a preview's metadata, in milliseconds.
    pub preview_timeout_ms: u32,

    /// Batch strictness when a batch would exceed `max_files`.
    pub max_files_policy: MaxFilesPolicy,
}

impl Default for DropzoneConfig {
    fn default() -> Self {
        Self {
            accept: String::from("*"),
            min_size_bytes: 0,
            max_size_bytes: u64::MAX,
            max_files: usize::MAX,
            multiple: true,
            auto_upload: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            preview_timeout_ms: DEFAULT_PREVIEW_TIMEOUT_MS,
            max_files_policy: MaxFilesPolicy::default(),
        }
    }
}

impl DropzoneConfig {
    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SizeBounds`] if `min_size_bytes` exceeds
    /// `max_size_bytes`, [`ConfigError::ZeroMaxFiles`] if `max_files`
    /// is zero, and [`ConfigError::ZeroTimeout`] if either timeout is
    /// zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size_bytes > self.max_size_bytes {
            return Err(ConfigError::SizeBounds {
                min: self.min_size_bytes,
                max: self.max_size_bytes,
            });
        }
        if self.max_files == 0 {
            return Err(ConfigError::ZeroMaxFiles);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("timeout_ms"));
        }
        if self.preview_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("preview_timeout_ms"));
        }
        Ok(())
    }

    /// Whether `size` lies within the inclusive size bounds.
    #[must_use]
    pub const fn size_in_bounds(&self, size: u64) -> bool {
        size >= self.min_size_bytes && size <= self.max_size_bytes
    }

    /// Resolver context describing this configuration and a drag state.
    #[must_use]
    pub fn extra(&self, drag: &crate::accept::DragState) -> DropzoneExtra {
        DropzoneExtra {
            active: drag.active,
            reject: drag.reject,
            accept: self.accept.clone(),
            multiple: self.multiple,
            min_size_bytes: self.min_size_bytes,
            max_size_bytes: self.max_size_bytes,
            max_files: self.max_files,
        }
    }
}

/// Drop area state handed to action resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropzoneExtra {
    /// A drag is hovering the drop area.
    pub active: bool,
    /// A hovering item would be rejected.
    pub reject: bool,
    /// Accept pattern.
    pub accept: String,
    /// Whether batches may carry several files.
    pub multiple: bool,
    /// Smallest admissible size.
    pub min_size_bytes: u64,
    /// Largest admissible size.
    pub max_size_bytes: u64,
    /// File cap.
    pub max_files: usize,
}

/// Invalid [`DropzoneConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `min_size_bytes > max_size_bytes`.
    #[error("min_size_bytes ({min}) exceeds max_size_bytes ({max})")]
    SizeBounds {
        /// Configured lower bound.
        min: u64,
        /// Configured upper bound.
        max: u64,
    },

    /// `max_files` of zero admits nothing.
    #[error("max_files must be at least 1")]
    ZeroMaxFiles,

    /// A timeout of zero would expire immediately.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::accept::DragState;

    #[test]
    fn defaults_are_unbounded() {
        let config = DropzoneConfig::default();
        assert_eq!(config.accept, "*");
        assert_eq!(config.min_size_bytes, 0);
        assert_eq!(config.max_size_bytes, u64::MAX);
        assert_eq!(config.max_files, usize::MAX);
        assert!(config.multiple);
        assert!(config.auto_upload);
        assert_eq!(config.timeout_ms, 100_000);
        assert_eq!(config.preview_timeout_ms, 10_000);
        assert_eq!(config.max_files_policy, MaxFilesPolicy::RejectOverflow);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DropzoneConfig =
            serde_json::from_str(r#"{ "accept": "image/*", "max_files_policy": "reject_batch" }"#)
                .unwrap();
        assert_eq!(config.accept, "image/*");
        assert_eq!(config.max_files_policy, MaxFilesPolicy::RejectBatch);
        assert_eq!(config.max_files, usize::MAX);
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let config = DropzoneConfig {
            min_size_bytes: 10,
            max_size_bytes: 20,
            ..DropzoneConfig::default()
        };
        assert!(!config.size_in_bounds(9));
        assert!(config.size_in_bounds(10));
        assert!(config.size_in_bounds(20));
        assert!(!config.size_in_bounds(21));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let config = DropzoneConfig {
            min_size_bytes: 5,
            max_size_bytes: 4,
            ..DropzoneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SizeBounds { min: 5, max: 4 })
        );
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = DropzoneConfig {
            max_files: 0,
            ..DropzoneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxFiles));

        let config = DropzoneConfig {
            timeout_ms: 0,
            ..DropzoneConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "timeout_ms must be greater than zero"
        );
    }

    #[test]
    fn extra_reflects_config_and_drag() {
        let config = DropzoneConfig {
            accept: ".pdf".into(),
            max_files: 3,
            ..DropzoneConfig::default()
        };
        let drag = DragState {
            active: true,
            reject: true,
        };
        let extra = config.extra(&drag);
        assert!(extra.active);
        assert!(extra.reject);
        assert_eq!(extra.accept, ".pdf");
        assert_eq!(extra.max_files, 3);
    }
}
