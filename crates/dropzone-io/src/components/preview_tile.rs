//! One tile per tracked file.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdFile;
use dropzone_core::format::{error_label, preview_title};
use dropzone_core::{Actions, FileMeta, MediaKind};

use super::ProgressBar;

/// Props for the [`PreviewTile`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PreviewTileProps {
    /// Snapshot of the file.
    meta: FileMeta,
    /// Actions on offer for this file.
    actions: Actions,
    /// Whether the file is selected.
    selected: bool,
    /// Lower size bound, to tell "too small" from "too big".
    min_size_bytes: u64,
    /// Abort the upload.
    on_cancel: EventHandler<()>,
    /// Remove the file.
    on_remove: EventHandler<()>,
    /// Retry the upload.
    on_restart: EventHandler<()>,
    /// Flip the selection.
    on_toggle_select: EventHandler<()>,
}

/// Shows the file's preview (image, video, or a generic file card),
/// its selection checkbox, and its progress bar. Failed and rejected
/// files show why instead of a preview.
#[component]
pub fn PreviewTile(props: PreviewTileProps) -> Element {
    let meta = &props.meta;
    let title = preview_title(meta);
    let error = error_label(meta, props.min_size_bytes);
    let kind = meta.preview.as_ref().map(|preview| preview.kind);
    let url = meta.preview.as_ref().and_then(|preview| preview.url.clone());
    let tile_class = if error.is_some() {
        "dz-tile dz-tile-error"
    } else {
        "dz-tile"
    };

    rsx! {
        section { class: "{tile_class}", title: "{title}",
            div { class: "dz-tile-bar",
                input {
                    r#type: "checkbox",
                    name: "selectItem",
                    aria_label: "Select {meta.display_name()}",
                    checked: props.selected,
                    onclick: move |_| props.on_toggle_select.call(()),
                }
            }

            {match (kind, url, error) {
                (_, _, Some(message)) => rsx! {
                    div { class: "dz-card",
                        Icon { width: 48, height: 48, icon: LdFile }
                        span { class: "dz-card-title", "{meta.display_name()}" }
                        span { class: "dz-card-error", "{message}" }
                    }
                },
                (Some(MediaKind::Image), Some(url), None) => rsx! {
                    img {
                        class: "dz-media",
                        src: "{url}",
                        alt: "{title}",
                        width: meta.preview.as_ref().and_then(|p| p.width).map(|w| w.to_string()),
                        height: meta.preview.as_ref().and_then(|p| p.height).map(|h| h.to_string()),
                    }
                },
                (Some(MediaKind::Video), Some(url), None) => rsx! {
                    video { class: "dz-media", src: "{url}", controls: true,
                        source { src: "{url}", r#type: "{meta.mime_type}" }
                    }
                },
                _ => rsx! {
                    div { class: "dz-card",
                        Icon { width: 48, height: 48, icon: LdFile }
                        span { class: "dz-card-title", "{title}" }
                    }
                },
            }}

            ProgressBar {
                status: meta.status,
                percent: meta.percent,
                actions: props.actions,
                on_cancel: props.on_cancel,
                on_remove: props.on_remove,
                on_restart: props.on_restart,
            }
        }
    }
}
