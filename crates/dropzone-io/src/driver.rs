//! Effect runner connecting the lifecycle controller to the browser.
//!
//! [`Driver`] owns the [`Controller`] behind an `Rc<RefCell<_>>`. Every
//! entry point (user action, preview completion, resolved params,
//! transport event) borrows the controller, applies one update, releases
//! the borrow, and only then runs the returned effects. Effects that
//! call back synchronously therefore always find the controller free.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use dropzone_core::{
    Controller, DropzoneConfig, Effect, FileId, FileMeta, Hooks, TransportEvent, UploadParams,
};
use futures::future::LocalBoxFuture;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

use crate::intake::BrowserFile;
use crate::log;
use crate::preview::{generate_preview, release_preview};
use crate::transport::{XhrHandle, XhrUpload, start_upload};

/// The controller as driven in the browser.
pub type UploadController = Controller<BrowserFile, XhrHandle>;

/// Future returned by a [`ParamsResolver`].
pub type ParamsFuture = LocalBoxFuture<'static, Result<Option<UploadParams>, ParamsError>>;

/// Caller function deciding where (and whether) a file is uploaded.
///
/// Resolving to `Ok(None)` settles the file without uploading it.
pub type ParamsResolver = Rc<dyn Fn(FileMeta) -> ParamsFuture>;

/// Errors a [`ParamsResolver`] may report.
///
/// A failed resolution is logged and treated as "no upload".
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// The resolver gave up.
    #[error("{0}")]
    Failed(String),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for ParamsError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

struct Inner {
    controller: RefCell<UploadController>,
    resolver: Option<ParamsResolver>,
    /// Listeners of in-flight requests, keyed by file and attempt.
    uploads: RefCell<HashMap<(FileId, u32), XhrUpload>>,
    on_update: Box<dyn Fn()>,
}

/// Shared handle running a controller against the browser.
#[derive(Clone)]
pub struct Driver {
    inner: Rc<Inner>,
}

impl Driver {
    /// Build a driver. `on_update` runs after every controller update,
    /// typically to schedule a re-render.
    pub fn new(
        config: DropzoneConfig,
        hooks: Hooks<BrowserFile, XhrHandle>,
        resolver: Option<ParamsResolver>,
        on_update: impl Fn() + 'static,
    ) -> Self {
        let controller = Controller::new(config, hooks).with_params_resolver(resolver.is_some());
        Self {
            inner: Rc::new(Inner {
                controller: RefCell::new(controller),
                resolver,
                uploads: RefCell::new(HashMap::new()),
                on_update: Box::new(on_update),
            }),
        }
    }

    /// Read the controller.
    ///
    /// Must not be called from inside a controller hook.
    pub fn read<R>(&self, f: impl FnOnce(&UploadController) -> R) -> R {
        f(&self.inner.controller.borrow())
    }

    /// Apply one controller update, then run its effects.
    pub fn update(&self, f: impl FnOnce(&mut UploadController) -> Vec<Effect<XhrHandle>>) {
        let effects = f(&mut self.inner.controller.borrow_mut());
        self.run(effects);
        (self.inner.on_update)();
    }

    /// Admit a batch of dropped or picked files.
    pub fn add_files(&self, files: Vec<BrowserFile>) {
        if files.is_empty() {
            return;
        }
        self.update(|controller| controller.add_files(files));
    }

    /// Abort the upload of `id`.
    pub fn cancel(&self, id: FileId) {
        self.update(|controller| controller.cancel(id));
    }

    /// Remove `id`.
    pub fn remove(&self, id: FileId) {
        self.update(|controller| controller.remove(id));
    }

    /// Restart `id`.
    pub fn restart(&self, id: FileId) {
        self.update(|controller| controller.restart(id));
    }

    /// Start every file waiting in `Ready`.
    pub fn start_ready(&self) {
        self.update(UploadController::start_ready);
    }

    /// Flip the selection of `id`.
    pub fn toggle_selection(&self, id: FileId) {
        self.update(|controller| {
            controller.toggle_selection(id);
            Vec::new()
        });
    }

    /// Select every file.
    pub fn select_all(&self) {
        self.update(|controller| {
            controller.select_all();
            Vec::new()
        });
    }

    /// Clear the selection.
    pub fn clear_selection(&self) {
        self.update(|controller| {
            controller.clear_selection();
            Vec::new()
        });
    }

    /// Remove every selected file.
    pub fn remove_selected(&self) {
        let ids: Vec<FileId> = self.read(|c| c.selected().map(|f| f.id()).collect());
        self.remove_each(ids);
    }

    /// Remove every tracked file, aborting uploads in flight.
    pub fn remove_all(&self) {
        let ids: Vec<FileId> = self.read(|c| c.files().iter().map(|f| f.id()).collect());
        self.remove_each(ids);
    }

    fn remove_each(&self, ids: Vec<FileId>) {
        if ids.is_empty() {
            return;
        }
        self.update(|controller| ids.into_iter().flat_map(|id| controller.remove(id)).collect());
    }

    fn run(&self, effects: Vec<Effect<XhrHandle>>) {
        for effect in effects {
            match effect {
                Effect::GeneratePreview(id) => self.spawn_preview(id),
                Effect::ResolveParams(id) => self.spawn_resolve(id),
                Effect::StartUpload {
                    id,
                    attempt,
                    params,
                } => self.start(id, attempt, &params),
                Effect::AbortUpload(handle) => handle.abort(),
                Effect::ReleasePreview(url) => release_preview(&url),
            }
        }
    }

    fn spawn_preview(&self, id: FileId) {
        let Some((file, timeout_ms)) = self.read(|c| {
            c.files()
                .get(id)
                .map(|f| (f.handle().clone(), c.config().preview_timeout_ms))
        }) else {
            return;
        };
        let driver = self.clone();
        spawn_local(async move {
            let preview = generate_preview(&file, timeout_ms).await;
            driver.update(|controller| controller.preview_finished(id, preview));
        });
    }

    fn spawn_resolve(&self, id: FileId) {
        let Some(meta) = self.read(|c| c.files().get(id).map(|f| f.meta().clone())) else {
            return;
        };
        let Some(resolver) = self.inner.resolver.clone() else {
            self.update(|controller| controller.params_resolved(id, None));
            return;
        };
        let driver = self.clone();
        spawn_local(async move {
            let params = match resolver(meta).await {
                Ok(params) => params,
                Err(e) => {
                    log::error("resolving upload params failed", &e);
                    None
                }
            };
            driver.update(|controller| controller.params_resolved(id, params));
        });
    }

    fn start(&self, id: FileId, attempt: u32, params: &UploadParams) {
        let Some(file) = self.read(|c| c.files().get(id).map(|f| f.handle().clone())) else {
            return;
        };

        let on_event: Rc<dyn Fn(TransportEvent)> = {
            let driver = self.clone();
            Rc::new(move |event| {
                driver.update(|controller| controller.transport_event(id, attempt, event));
            })
        };
        // Listeners cannot be dropped from inside their own callback.
        let on_load_end = {
            let driver = self.clone();
            move || {
                let driver = driver.clone();
                spawn_local(async move {
                    driver.inner.uploads.borrow_mut().remove(&(id, attempt));
                });
            }
        };

        match start_upload(&file, params, on_event, on_load_end) {
            Ok(upload) => {
                let handle = upload.handle();
                self.inner
                    .uploads
                    .borrow_mut()
                    .insert((id, attempt), upload);
                self.update(|controller| controller.upload_started(id, attempt, handle));
            }
            Err(e) => {
                log::error(&format!("upload of {} did not start", file.raw().name()), &e);
                self.update(|controller| {
                    controller.upload_failed(id, attempt);
                    Vec::new()
                });
            }
        }
    }
}
