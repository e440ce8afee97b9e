//! Upload progress and per-file action buttons.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdRotateCw, LdTrash2, LdX};
use dropzone_core::{Actions, Status};

/// Props for the [`ProgressBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ProgressBarProps {
    /// Current status of the file.
    status: Status,
    /// Upload progress, 0-100.
    percent: f64,
    /// Actions on offer for this file.
    actions: Actions,
    /// Abort the upload.
    on_cancel: EventHandler<()>,
    /// Remove the file.
    on_remove: EventHandler<()>,
    /// Retry the upload.
    on_restart: EventHandler<()>,
}

/// A progress bar, shown once the file has entered the upload branch,
/// followed by whichever of cancel / remove / restart are available.
#[component]
pub fn ProgressBar(props: ProgressBarProps) -> Element {
    let value = if matches!(props.status, Status::HeadersReceived | Status::Done) {
        100.0
    } else {
        props.percent
    };

    rsx! {
        div { class: "dz-progress",
            if props.status.is_upload_phase() {
                progress { max: "100", value: "{value}" }
            }
            if props.actions.cancel {
                button {
                    class: "dz-action",
                    r#type: "button",
                    title: "Cancel upload",
                    aria_label: "Cancel upload",
                    onclick: move |_| props.on_cancel.call(()),
                    Icon { width: 14, height: 14, icon: LdX }
                }
            }
            if props.actions.remove {
                button {
                    class: "dz-action",
                    r#type: "button",
                    title: "Remove",
                    aria_label: "Remove file",
                    onclick: move |_| props.on_remove.call(()),
                    Icon { width: 14, height: 14, icon: LdTrash2 }
                }
            }
            if props.actions.restart {
                button {
                    class: "dz-action",
                    r#type: "button",
                    title: "Retry upload",
                    aria_label: "Retry upload",
                    onclick: move |_| props.on_restart.call(()),
                    Icon { width: 14, height: 14, icon: LdRotateCw }
                }
            }
        }
    }
}
