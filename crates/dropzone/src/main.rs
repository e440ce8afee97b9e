use std::rc::Rc;

use dioxus::prelude::*;
use dropzone_core::format::format_bytes;
use dropzone_core::{DropzoneConfig, FileMeta, Status, UploadParams};
use dropzone_io::components::{StatusListener, Validator};
use dropzone_io::{Dropzone, ParamsFuture, ParamsResolver, Submission, log};
use serde_json::Value;

/// Echo endpoint: accepts any multipart POST and answers 200.
const UPLOAD_URL: &str = "https://httpbin.org/post";

fn main() {
    dioxus::launch(app);
}

/// Upload every file to the echo endpoint, tagging it with its name.
fn upload_params(meta: FileMeta) -> ParamsFuture {
    let params = UploadParams::new(UPLOAD_URL)
        .with_field("name", meta.display_name())
        .with_meta("uploadedTo", UPLOAD_URL);
    Box::pin(std::future::ready(Ok(Some(params))))
}

fn log_status(
    meta: &FileMeta,
    status: Status,
    files: &[FileMeta],
) -> Option<serde_json::Map<String, Value>> {
    let done = files.iter().filter(|file| file.status == Status::Done).count();
    log::info(&format!(
        "{} ({}): {status} [{done}/{} done]",
        meta.display_name(),
        meta.id,
        files.len()
    ));
    None
}

fn reject_empty(meta: &FileMeta) -> Option<Value> {
    (meta.size == 0).then(|| Value::from("Empty file"))
}

/// Root application component: one drop area plus a summary of the
/// last submission.
fn app() -> Element {
    let config = use_hook(|| DropzoneConfig {
        accept: "image/*,audio/*,video/*,.pdf".to_owned(),
        max_size_bytes: 10 * 1024 * 1024,
        max_files: 10,
        ..DropzoneConfig::default()
    });
    let resolver = use_hook(|| -> ParamsResolver { Rc::new(upload_params) });
    let on_change_status = use_hook(|| -> StatusListener { Rc::new(log_status) });
    let validate = use_hook(|| -> Validator { Rc::new(reject_empty) });
    let mut submitted = use_signal(|| Option::<Submission>::None);

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/dropzone.css") }

        main { class: "app",
            h1 { "dropzone" }
            p { "Drop images, audio, video, or PDFs (up to 10 files, 10MB each)." }

            Dropzone {
                config,
                get_upload_params: resolver,
                on_change_status,
                validate,
                on_submit: move |submission| submitted.set(Some(submission)),
            }

            if let Some(submission) = submitted() {
                section { class: "summary",
                    h2 { "Submitted {submission.successful.len()} of {submission.all.len()} files" }
                    ul {
                        for meta in submission.successful.iter() {
                            li { key: "{meta.id}", "{meta.display_name()} ({format_bytes(meta.size)})" }
                        }
                    }
                }
            }
        }
    }
}
