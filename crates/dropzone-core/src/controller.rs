//! File lifecycle controller.
//!
//! The [`Controller`] owns the [`FileCollection`] and is its only
//! writer. Callers feed it intake batches, completions of the I/O it
//! asked for, and user actions; every method mutates the affected file
//! and returns the [`Effect`]s the I/O layer must run next:
//!
//! ```text
//! add_files ──> Preparing ──> GeneratePreview
//! preview_finished ──> GettingUploadParams ──> ResolveParams
//! params_resolved ──> StartUpload
//! upload_started ──> Uploading
//! transport_event ──> HeadersReceived / Done / ErrorUpload / ExceptionUpload
//! ```
//!
//! Completions are keyed by [`FileId`] and checked against the file's
//! current status (and upload attempt), so a completion that arrives
//! after the file was removed, cancelled or restarted is a no-op.
//!
//! Effects are returned rather than executed so that I/O which calls
//! back synchronously (aborting an `XMLHttpRequest` fires its
//! `readystatechange` handler immediately) never re-enters a controller
//! that is still mid-update.

use serde_json::{Map, Value};

use crate::accept::is_admissible;
use crate::collection::FileCollection;
use crate::config::{DropzoneConfig, MaxFilesPolicy};
use crate::file::{FileHandle, FileId, FileMeta, TrackedFile};
use crate::params::UploadParams;
use crate::preview::PreviewInfo;
use crate::resolve::{ActionContext, ActionPolicy, Actions};
use crate::selection::Selection;
use crate::status::Status;
use crate::transport::{self, TransportEvent};

/// Change notification: `(file, new status, all files)`, returning
/// metadata to merge into the file.
pub type StatusHook<F, H> =
    Box<dyn FnMut(&TrackedFile<F, H>, Status, &FileCollection<F, H>) -> Option<Map<String, Value>>>;

/// Custom validation: a truthy return value fails the file.
pub type ValidateHook<F, H> = Box<dyn Fn(&TrackedFile<F, H>) -> Option<Value>>;

/// Dedicated error notification, fired for every error status.
pub type ErrorHook<F, H> = Box<dyn FnMut(&TrackedFile<F, H>, Status)>;

/// Caller callbacks invoked synchronously by the controller.
///
/// Hooks receive shared references only; they must not call back into
/// whatever owns the controller.
pub struct Hooks<F, H> {
    on_change_status: StatusHook<F, H>,
    validate: Option<ValidateHook<F, H>>,
    on_error: Option<ErrorHook<F, H>>,
}

impl<F, H> Hooks<F, H> {
    /// Hooks with the mandatory change notification.
    pub fn new(
        on_change_status: impl FnMut(&TrackedFile<F, H>, Status, &FileCollection<F, H>) -> Option<Map<String, Value>>
        + 'static,
    ) -> Self {
        Self {
            on_change_status: Box::new(on_change_status),
            validate: None,
            on_error: None,
        }
    }

    /// Hooks with a change notification that sees file snapshots: the
    /// changed file and every tracked file, in display order.
    pub fn from_meta(
        mut on_change_status: impl FnMut(&FileMeta, Status, &[FileMeta]) -> Option<Map<String, Value>>
        + 'static,
    ) -> Self {
        Self::new(move |file, status, files| {
            on_change_status(file.meta(), status, &files.snapshot())
        })
    }

    /// Add a validation hook, run after the preview is generated.
    #[must_use]
    pub fn with_validate(
        mut self,
        validate: impl Fn(&TrackedFile<F, H>) -> Option<Value> + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Add an error hook.
    #[must_use]
    pub fn with_on_error(mut self, on_error: impl FnMut(&TrackedFile<F, H>, Status) + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

/// I/O requested by the controller.
#[derive(Debug)]
pub enum Effect<H> {
    /// Generate a preview, then call [`Controller::preview_finished`].
    GeneratePreview(FileId),
    /// Resolve upload params, then call [`Controller::params_resolved`].
    ResolveParams(FileId),
    /// Start the transport, then call [`Controller::upload_started`] or
    /// [`Controller::upload_failed`] with the same `attempt`.
    StartUpload {
        /// File to upload.
        id: FileId,
        /// Attempt generation to echo back with every transport event.
        attempt: u32,
        /// Resolved params; `timeout_ms` is always set.
        params: UploadParams,
    },
    /// Abort an in-flight transport.
    AbortUpload(H),
    /// Revoke a preview object URL.
    ReleasePreview(String),
}

/// The file lifecycle state machine.
pub struct Controller<F, H> {
    config: DropzoneConfig,
    hooks: Hooks<F, H>,
    files: FileCollection<F, H>,
    selection: Selection,
    resolves_params: bool,
}

impl<F: FileHandle, H> Controller<F, H> {
    /// A controller with no files.
    pub fn new(config: DropzoneConfig, hooks: Hooks<F, H>) -> Self {
        Self {
            config,
            hooks,
            files: FileCollection::default(),
            selection: Selection::default(),
            resolves_params: true,
        }
    }

    /// Declare whether a params resolver exists. Without one, every file
    /// settles in `Done` after validation and restart is unavailable.
    #[must_use]
    pub const fn with_params_resolver(mut self, resolves_params: bool) -> Self {
        self.resolves_params = resolves_params;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DropzoneConfig {
        &self.config
    }

    /// Tracked files.
    #[must_use]
    pub const fn files(&self) -> &FileCollection<F, H> {
        &self.files
    }

    /// Whether a params resolver was declared.
    #[must_use]
    pub const fn resolves_params(&self) -> bool {
        self.resolves_params
    }

    // ───────────────────────── Intake ──────────────────────────

    /// Admit a batch of raw files.
    ///
    /// Each file is checked against the accept pattern, then against the
    /// `max_files` capacity per [`MaxFilesPolicy`]. Admitted files enter
    /// `Preparing` and are size-checked; those within bounds get a
    /// [`Effect::GeneratePreview`]. When `multiple` is off, every
    /// acceptable file after the first acceptable one is rejected as
    /// `RejectedMaxFiles`.
    pub fn add_files(&mut self, handles: impl IntoIterator<Item = F>) -> Vec<Effect<H>> {
        let mut decisions: Vec<(TrackedFile<F, H>, Status)> = Vec::new();
        let mut accepted = 0;
        for (index, handle) in handles.into_iter().enumerate() {
            let admissible = is_admissible(
                handle.name().as_deref(),
                &handle.mime_type(),
                &self.config.accept,
            );
            let status = if !admissible {
                Status::RejectedFileType
            } else if accepted > 0 && !self.config.multiple {
                Status::RejectedMaxFiles
            } else {
                accepted += 1;
                Status::Preparing
            };
            decisions.push((TrackedFile::new(handle, status), status));
        }

        let capacity = self
            .config
            .max_files
            .saturating_sub(self.files.admitted_count());
        let mut admit_budget = match self.config.max_files_policy {
            MaxFilesPolicy::RejectOverflow => capacity,
            MaxFilesPolicy::RejectBatch if accepted > capacity => 0,
            MaxFilesPolicy::RejectBatch => accepted,
        };

        let mut effects = Vec::new();
        for (mut file, mut status) in decisions {
            if status == Status::Preparing {
                if admit_budget == 0 {
                    status = Status::RejectedMaxFiles;
                } else {
                    admit_budget -= 1;
                }
            }
            file.meta.status = status;
            let id = file.id();
            self.files.insert(file);
            self.notify(id);

            if status != Status::Preparing {
                continue;
            }
            let size = self.files.get(id).map_or(0, |file| file.meta.size);
            if self.config.size_in_bounds(size) {
                effects.push(Effect::GeneratePreview(id));
            } else {
                self.set_status(id, Status::ErrorFileSize);
            }
        }
        effects
    }

    // ───────────────────────── Completions ──────────────────────────

    /// Record a finished preview and run validation.
    ///
    /// If the file is gone or no longer preparing, a retained preview URL
    /// is handed back for release instead of being stored.
    pub fn preview_finished(&mut self, id: FileId, preview: Option<PreviewInfo>) -> Vec<Effect<H>> {
        let Some(file) = self.files.get_mut(id) else {
            return release(preview);
        };
        if file.meta.status != Status::Preparing {
            return release(preview);
        }
        file.meta.preview = preview;

        if let Some(validate) = &self.hooks.validate {
            let error = self
                .files
                .get(id)
                .and_then(|file| validate(file))
                .filter(is_truthy);
            if let Some(error) = error {
                if let Some(file) = self.files.get_mut(id) {
                    file.meta.validation_error = Some(error);
                }
                self.set_status(id, Status::ErrorValidation);
                return Vec::new();
            }
        }

        self.set_status(id, Status::GettingUploadParams);
        vec![Effect::ResolveParams(id)]
    }

    /// Continue with the resolver's answer; `None` means "do not upload".
    ///
    /// After a restart the upload always starts; otherwise `auto_upload`
    /// decides between uploading and parking the file in `Ready`.
    pub fn params_resolved(&mut self, id: FileId, params: Option<UploadParams>) -> Vec<Effect<H>> {
        let Some(status) = self.status_of(id) else {
            return Vec::new();
        };
        let restarting = match status {
            Status::GettingUploadParams => false,
            Status::Started | Status::Restarted => true,
            _ => return Vec::new(),
        };

        let Some(params) = params else {
            self.set_status(id, Status::Done);
            return Vec::new();
        };
        if !restarting && !self.config.auto_upload {
            self.set_status(id, Status::Ready);
            return Vec::new();
        }
        self.begin_upload(id, params)
    }

    fn begin_upload(&mut self, id: FileId, mut params: UploadParams) -> Vec<Effect<H>> {
        if params.destination().is_none() {
            self.set_status(id, Status::ErrorUploadParams);
            return Vec::new();
        }
        let default_timeout = self.config.timeout_ms;
        let Some(file) = self.files.get_mut(id) else {
            return Vec::new();
        };
        file.meta.merge_extra(std::mem::take(&mut params.meta));
        file.meta.percent = 0.0;
        file.attempt += 1;
        params.timeout_ms.get_or_insert(default_timeout);
        vec![Effect::StartUpload {
            id,
            attempt: file.attempt,
            params,
        }]
    }

    /// The transport for `attempt` is in flight.
    ///
    /// If the file moved on in the meantime (removed, or a newer attempt
    /// started), the handle is returned for abortion.
    pub fn upload_started(&mut self, id: FileId, attempt: u32, handle: H) -> Vec<Effect<H>> {
        let Some(file) = self.files.get_mut(id) else {
            return vec![Effect::AbortUpload(handle)];
        };
        let starting = matches!(
            file.meta.status,
            Status::GettingUploadParams | Status::Started | Status::Restarted
        );
        if !starting || file.attempt != attempt {
            return vec![Effect::AbortUpload(handle)];
        }
        file.transport = Some(handle);
        self.set_status(id, Status::Uploading);
        Vec::new()
    }

    /// The transport for `attempt` could not be started.
    pub fn upload_failed(&mut self, id: FileId, attempt: u32) {
        let Some(file) = self.files.get(id) else {
            return;
        };
        let starting = matches!(
            file.meta.status,
            Status::GettingUploadParams | Status::Started | Status::Restarted
        );
        if starting && file.attempt == attempt {
            self.set_status(id, Status::ExceptionUpload);
        }
    }

    /// Apply a transport event for `attempt`.
    ///
    /// Progress only moves forward while uploading. Readiness transitions
    /// map through [`transport::map_ready_state`]. The transport handle is
    /// kept until the upload settles; settling before the request is done
    /// (an error status with the headers) aborts the request so the body
    /// stops streaming.
    pub fn transport_event(
        &mut self,
        id: FileId,
        attempt: u32,
        event: TransportEvent,
    ) -> Vec<Effect<H>> {
        let Some(file) = self.files.get_mut(id) else {
            return Vec::new();
        };
        let current = file.meta.status;
        if file.attempt != attempt
            || !matches!(current, Status::Uploading | Status::HeadersReceived)
        {
            return Vec::new();
        }

        match event {
            TransportEvent::Progress { loaded, total } => {
                if current == Status::Uploading {
                    let percent = transport::progress_percent(loaded, total);
                    file.meta.percent = file.meta.percent.max(percent);
                }
                Vec::new()
            }
            TransportEvent::ReadyState {
                ready_state,
                http_status,
            } => {
                let Some(next) = transport::map_ready_state(ready_state, http_status, current)
                else {
                    return Vec::new();
                };
                if next == current {
                    return Vec::new();
                }
                if matches!(next, Status::HeadersReceived | Status::Done) {
                    file.meta.percent = 100.0;
                }
                let handle = if next == Status::HeadersReceived {
                    None
                } else {
                    file.transport.take()
                };
                self.set_status(id, next);
                handle
                    .filter(|_| ready_state != transport::DONE)
                    .map(Effect::AbortUpload)
                    .into_iter()
                    .collect()
            }
        }
    }

    // ───────────────────────── Caller actions ──────────────────────────

    /// Abort an in-flight upload. A no-op unless the file is uploading.
    pub fn cancel(&mut self, id: FileId) -> Vec<Effect<H>> {
        let Some(file) = self.files.get_mut(id) else {
            return Vec::new();
        };
        if file.meta.status != Status::Uploading {
            return Vec::new();
        }
        let handle = file.transport.take();
        self.set_status(id, Status::Aborted);
        handle.map(Effect::AbortUpload).into_iter().collect()
    }

    /// Remove a file from any state.
    ///
    /// Aborts its transport, releases its preview URL, notifies
    /// `Removed`, then evicts it. A no-op for untracked ids, so the
    /// preview is released at most once.
    pub fn remove(&mut self, id: FileId) -> Vec<Effect<H>> {
        let Some(file) = self.files.get_mut(id) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(handle) = file.transport.take() {
            effects.push(Effect::AbortUpload(handle));
        }
        if let Some(url) = file.meta.preview.as_mut().and_then(|p| p.url.take()) {
            effects.push(Effect::ReleasePreview(url));
        }
        self.set_status(id, Status::Removed);
        self.files.remove(id);
        self.selection.deselect(id);
        effects
    }

    /// Re-enter the upload branch from `Ready`, `Aborted` or a failure.
    ///
    /// Resets progress and re-resolves upload params. A no-op when the
    /// status does not allow it or no resolver exists.
    pub fn restart(&mut self, id: FileId) -> Vec<Effect<H>> {
        if !self.resolves_params {
            return Vec::new();
        }
        let Some(file) = self.files.get_mut(id) else {
            return Vec::new();
        };
        let current = file.meta.status;
        if !current.allows_restart() {
            return Vec::new();
        }
        file.meta.percent = 0.0;
        let next = if current == Status::Ready {
            Status::Started
        } else {
            Status::Restarted
        };
        self.set_status(id, next);
        vec![Effect::ResolveParams(id)]
    }

    /// Restart every file parked in `Ready`.
    pub fn start_ready(&mut self) -> Vec<Effect<H>> {
        let ready: Vec<FileId> = self
            .files
            .with_status(Status::Ready)
            .map(TrackedFile::id)
            .collect();
        ready.into_iter().flat_map(|id| self.restart(id)).collect()
    }

    // ───────────────────────── Queries ──────────────────────────

    /// Current status of `id`, if tracked.
    #[must_use]
    pub fn status_of(&self, id: FileId) -> Option<Status> {
        self.files.get(id).map(TrackedFile::status)
    }

    /// Actions offered for `id` under `policy`.
    #[must_use]
    pub fn available_actions(&self, id: FileId, policy: &ActionPolicy, context: &ActionContext) -> Actions {
        let Some(status) = self.status_of(id) else {
            return Actions::default();
        };
        let mut actions = policy.actions(status, context);
        actions.restart &= self.resolves_params;
        actions
    }

    /// Files that finished uploading (or settled without one).
    pub fn successful(&self) -> impl Iterator<Item = &TrackedFile<F, H>> {
        self.files.with_status(Status::Done)
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: FileId) -> bool {
        self.selection.is_selected(id)
    }

    /// Toggle the selection of a tracked file; returns the new state.
    pub fn toggle_selection(&mut self, id: FileId) -> bool {
        if !self.files.contains(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    /// Select every tracked file.
    pub fn select_all(&mut self) {
        let ids: Vec<FileId> = self.files.iter().map(TrackedFile::id).collect();
        for id in ids {
            self.selection.select(id);
        }
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected files in display order.
    pub fn selected(&self) -> impl Iterator<Item = &TrackedFile<F, H>> {
        self.files
            .iter()
            .filter(|file| self.selection.is_selected(file.id()))
    }

    // ───────────────────────── Internals ──────────────────────────

    /// The single status entry point: assign, then notify.
    fn set_status(&mut self, id: FileId, status: Status) {
        let Some(file) = self.files.get_mut(id) else {
            return;
        };
        debug_assert!(
            Status::transition_allowed(Some(file.meta.status), status),
            "illegal transition {} -> {status}",
            file.meta.status,
        );
        file.meta.status = status;
        self.notify(id);
    }

    /// Run the change hook (and error hook) for the file's current
    /// status and merge back returned metadata.
    fn notify(&mut self, id: FileId) {
        let Some(file) = self.files.get(id) else {
            return;
        };
        let status = file.meta.status;
        let merged = (self.hooks.on_change_status)(file, status, &self.files);
        if status.is_error() {
            if let Some(on_error) = self.hooks.on_error.as_mut() {
                on_error(file, status);
            }
        }
        if let Some(extra) = merged {
            if let Some(file) = self.files.get_mut(id) {
                file.meta.merge_extra(extra);
            }
        }
    }
}

/// Release effect for a preview that will not be stored.
fn release<H>(preview: Option<PreviewInfo>) -> Vec<Effect<H>> {
    preview
        .and_then(|p| p.url)
        .map(Effect::ReleasePreview)
        .into_iter()
        .collect()
}

/// Truthiness of a validation payload: `null`, `false`, `0` and `""`
/// pass validation.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
