//! Drop area with file picker, preview tiles, and batch actions.

use std::rc::Rc;

use dioxus::core::schedule_update;
use dioxus::prelude::*;
use dioxus::web::WebEventExt;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use dropzone_core::{
    ActionContext, ActionPolicy, Actions, DragState, DropzoneConfig, FileMeta, Hooks, Status,
};
use gloo_timers::future::TimeoutFuture;
use serde_json::{Map, Value};
use wasm_bindgen::JsCast;

use super::PreviewTile;
use crate::driver::{Driver, ParamsResolver};
use crate::intake::{self, BrowserFile};
use crate::log;
use crate::transport::XhrHandle;

/// Delay before a drag leave resets the drop area. Moving between child
/// elements fires leave/over pairs; the debounce hides the flicker.
const DRAG_LEAVE_DEBOUNCE_MS: u32 = 150;

/// Status change listener: the changed file, its new status, and every
/// tracked file. Returned metadata is merged into the changed file.
pub type StatusListener =
    Rc<dyn Fn(&FileMeta, Status, &[FileMeta]) -> Option<Map<String, Value>>>;

/// Custom validation; a truthy return value fails the file.
pub type Validator = Rc<dyn Fn(&FileMeta) -> Option<Value>>;

/// Listener for error and rejection statuses.
pub type ErrorListener = Rc<dyn Fn(&FileMeta, Status)>;

/// Files handed to the submit handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Files that finished uploading.
    pub successful: Vec<FileMeta>,
    /// Every tracked file, in display order.
    pub all: Vec<FileMeta>,
}

/// Props for the [`Dropzone`] component.
///
/// The configuration and callbacks are read once, when the component
/// mounts.
#[derive(Props, Clone)]
pub struct DropzoneProps {
    /// Acceptance, size, count, and upload settings.
    #[props(default)]
    config: DropzoneConfig,
    /// Decides where each file is uploaded. Without one, files settle
    /// in `Done` after validation and cannot be restarted.
    get_upload_params: Option<ParamsResolver>,
    /// Called on every status change.
    on_change_status: StatusListener,
    /// Called after the preview is generated.
    validate: Option<Validator>,
    /// Called on every error or rejection status.
    on_error: Option<ErrorListener>,
    /// Which per-file actions to offer.
    #[props(default)]
    actions: ActionPolicy,
    /// Shows a submit button when set.
    on_submit: Option<EventHandler<Submission>>,
    /// Prompt shown while no file is tracked.
    #[props(default = "Drop files here to upload".to_owned())]
    input_label: String,
    /// Submit button caption.
    #[props(default = "Submit".to_owned())]
    submit_label: String,
}

fn same<T: ?Sized>(a: Option<&Rc<T>>, b: Option<&Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for DropzoneProps {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.actions == other.actions
            && self.on_submit == other.on_submit
            && self.input_label == other.input_label
            && self.submit_label == other.submit_label
            && same(
                self.get_upload_params.as_ref(),
                other.get_upload_params.as_ref(),
            )
            && Rc::ptr_eq(&self.on_change_status, &other.on_change_status)
            && same(self.validate.as_ref(), other.validate.as_ref())
            && same(self.on_error.as_ref(), other.on_error.as_ref())
    }
}

/// Adapt the component callbacks to controller hooks.
fn hooks(props: &DropzoneProps) -> Hooks<BrowserFile, XhrHandle> {
    let on_change = Rc::clone(&props.on_change_status);
    let mut hooks: Hooks<BrowserFile, XhrHandle> =
        Hooks::from_meta(move |meta, status, files| on_change(meta, status, files));
    if let Some(validate) = props.validate.clone() {
        hooks = hooks.with_validate(move |file| validate(file.meta()));
    }
    if let Some(on_error) = props.on_error.clone() {
        hooks = hooks.with_on_error(move |file, status| on_error(file.meta(), status));
    }
    hooks
}

/// A drop area accepting files by drag-and-drop or file picker.
///
/// Each file gets a tile with its preview, progress, and the actions
/// its status allows. Hovering items that would be rejected flag the
/// area before the drop.
#[allow(clippy::too_many_lines)]
#[component]
pub fn Dropzone(props: DropzoneProps) -> Element {
    let driver = use_hook(|| {
        if let Err(e) = props.config.validate() {
            log::warn("invalid dropzone config", &e);
        }
        let refresh = schedule_update();
        Driver::new(
            props.config.clone(),
            hooks(&props),
            props.get_upload_params.clone(),
            move || refresh(),
        )
    });
    {
        let driver = driver.clone();
        use_drop(move || driver.remove_all());
    }

    let mut drag = use_signal(DragState::idle);
    let mut leave_generation = use_signal(|| 0_u64);

    let on_drag_over = {
        let accept = props.config.accept.clone();
        move |evt: DragEvent| {
            evt.prevent_default();
            evt.stop_propagation();
            leave_generation += 1;
            let types = evt
                .try_as_web_event()
                .map(|web| intake::hovering_types(&web))
                .unwrap_or_default();
            drag.set(DragState::hovering(
                types.iter().map(|mime| (None, mime.as_str())),
                &accept,
            ));
        }
    };

    let on_drag_leave = move |evt: DragEvent| {
        evt.prevent_default();
        evt.stop_propagation();
        leave_generation += 1;
        let generation = *leave_generation.peek();
        spawn(async move {
            TimeoutFuture::new(DRAG_LEAVE_DEBOUNCE_MS).await;
            if *leave_generation.peek() == generation {
                drag.set(DragState::idle());
            }
        });
    };

    let on_drop = {
        let driver = driver.clone();
        move |evt: DragEvent| {
            evt.prevent_default();
            evt.stop_propagation();
            leave_generation += 1;
            drag.set(DragState::idle());
            let files = evt
                .try_as_web_event()
                .map(|web| intake::files_from_event(&web))
                .unwrap_or_default();
            driver.add_files(files);
        }
    };

    let on_pick = {
        let driver = driver.clone();
        move |evt: FormEvent| {
            let Some(web) = evt.try_as_web_event() else {
                return;
            };
            let files = intake::files_from_event(&web);
            // Clear the input so picking the same file again fires `change`.
            if let Some(input) = web
                .target()
                .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
            {
                input.set_value("");
            }
            driver.add_files(files);
        }
    };

    let config = &props.config;
    let drag_state = drag();
    let context_extra = config.extra(&drag_state);
    let tiles: Vec<(FileMeta, Actions, bool)> = driver.read(|controller| {
        let context = ActionContext {
            files: controller.files().snapshot(),
            extra: context_extra,
        };
        controller
            .files()
            .iter()
            .map(|file| {
                (
                    file.meta().clone(),
                    controller.available_actions(file.id(), &props.actions, &context),
                    controller.is_selected(file.id()),
                )
            })
            .collect()
    });
    let admitted = tiles.iter().filter(|(m, ..)| m.status.is_admitted()).count();
    let can_add = admitted < config.max_files;
    let any_ready = tiles.iter().any(|(m, ..)| m.status == Status::Ready);
    let any_selected = tiles.iter().any(|(_, _, selected)| *selected);
    let busy = tiles
        .iter()
        .any(|(m, ..)| !m.status.is_terminal() && !m.status.allows_restart());

    let area_class = match (drag_state.active, drag_state.reject) {
        (true, true) => "dz-root dz-active dz-reject",
        (true, false) => "dz-root dz-active",
        _ => "dz-root",
    };

    let picker = rsx! {
        input {
            r#type: "file",
            class: "dz-hidden",
            accept: "{config.accept}",
            multiple: config.multiple,
            onchange: on_pick,
        }
    };

    rsx! {
        section {
            class: "{area_class}",
            ondragenter: on_drag_over.clone(),
            ondragover: on_drag_over,
            ondragleave: on_drag_leave,
            ondrop: on_drop,

            if tiles.is_empty() {
                label { class: "dz-input",
                    {picker}
                    Icon { width: 40, height: 40, icon: LdUpload }
                    h2 { "{props.input_label}" }
                }
            } else {
                div { class: "dz-toolbar",
                    button {
                        r#type: "button",
                        onclick: {
                            let driver = driver.clone();
                            move |_| driver.select_all()
                        },
                        "Select all"
                    }
                    if any_selected {
                        button {
                            r#type: "button",
                            onclick: {
                                let driver = driver.clone();
                                move |_| driver.clear_selection()
                            },
                            "Clear selection"
                        }
                        button {
                            r#type: "button",
                            onclick: {
                                let driver = driver.clone();
                                move |_| driver.remove_selected()
                            },
                            "Remove selected"
                        }
                    }
                    if any_ready {
                        button {
                            r#type: "button",
                            onclick: {
                                let driver = driver.clone();
                                move |_| driver.start_ready()
                            },
                            "Start uploads"
                        }
                    }
                    if can_add {
                        label { class: "dz-add",
                            {picker}
                            "Add files"
                        }
                    }
                }

                div { class: "dz-tiles",
                    for (meta, actions, selected) in tiles {
                        PreviewTile {
                            key: "{meta.id}",
                            actions,
                            selected,
                            min_size_bytes: config.min_size_bytes,
                            on_cancel: {
                                let (driver, id) = (driver.clone(), meta.id);
                                move |()| driver.cancel(id)
                            },
                            on_remove: {
                                let (driver, id) = (driver.clone(), meta.id);
                                move |()| driver.remove(id)
                            },
                            on_restart: {
                                let (driver, id) = (driver.clone(), meta.id);
                                move |()| driver.restart(id)
                            },
                            on_toggle_select: {
                                let (driver, id) = (driver.clone(), meta.id);
                                move |()| driver.toggle_selection(id)
                            },
                            meta: meta.clone(),
                        }
                    }
                }

                if drag_state.active {
                    div { class: "dz-overlay",
                        Icon { width: 32, height: 32, icon: LdUpload }
                        p { "Drop files to upload" }
                    }
                }

                if let Some(on_submit) = props.on_submit {
                    div { class: "dz-submit",
                        button {
                            r#type: "button",
                            disabled: busy,
                            onclick: {
                                let driver = driver.clone();
                                move |_| {
                                    let submission = driver.read(|controller| Submission {
                                        successful: controller
                                            .successful()
                                            .map(|file| file.meta().clone())
                                            .collect(),
                                        all: controller.files().snapshot(),
                                    });
                                    on_submit.call(submission);
                                }
                            },
                            "{props.submit_label}"
                        }
                    }
                }
            }
        }
    }
}
