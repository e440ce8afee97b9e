//! End-to-end lifecycle scenarios driven through a fake I/O layer.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use dropzone_core::{
    Controller, DropzoneConfig, Effect, FileHandle, FileId, Hooks, MaxFilesPolicy, MediaKind,
    PreviewInfo, Status, TransportEvent, UploadParams,
};

#[derive(Debug, Clone)]
struct TestFile {
    name: &'static str,
    size: u64,
    mime_type: &'static str,
}

const fn file(name: &'static str, size: u64, mime_type: &'static str) -> TestFile {
    TestFile {
        name,
        size,
        mime_type,
    }
}

impl FileHandle for TestFile {
    fn name(&self) -> Option<String> {
        Some(self.name.to_owned())
    }
    fn size(&self) -> u64 {
        self.size
    }
    fn mime_type(&self) -> String {
        self.mime_type.to_owned()
    }
    fn last_modified(&self) -> Option<f64> {
        None
    }
}

/// Every notification, plus any edge the lifecycle does not allow.
#[derive(Default)]
struct Journal {
    events: Vec<(FileId, Status)>,
    last: HashMap<FileId, Status>,
    illegal: Vec<(Option<Status>, Status)>,
    percents: HashMap<FileId, Vec<f64>>,
}

impl Journal {
    fn statuses(&self, id: FileId) -> Vec<Status> {
        self.events
            .iter()
            .filter(|(other, _)| *other == id)
            .map(|(_, status)| *status)
            .collect()
    }
}

/// Synchronous stand-in for the browser driver.
struct Harness {
    ctl: Controller<TestFile, u32>,
    journal: Rc<RefCell<Journal>>,
    params: Option<UploadParams>,
    next_handle: u32,
    in_flight: HashMap<FileId, u32>,
    aborted: Vec<u32>,
    released: Vec<String>,
}

impl Harness {
    fn new(config: DropzoneConfig) -> Self {
        let journal: Rc<RefCell<Journal>> = Rc::default();
        let sink = Rc::clone(&journal);
        let hooks = Hooks::new(move |file, status, _| {
            let mut journal = sink.borrow_mut();
            let previous = journal.last.insert(file.id(), status);
            if !Status::transition_allowed(previous, status) {
                journal.illegal.push((previous, status));
            }
            journal.events.push((file.id(), status));
            journal
                .percents
                .entry(file.id())
                .or_default()
                .push(file.meta().percent);
            None
        });
        Self {
            ctl: Controller::new(config, hooks),
            journal,
            params: Some(UploadParams::new("https://example.test/upload")),
            next_handle: 0,
            in_flight: HashMap::new(),
            aborted: Vec::new(),
            released: Vec::new(),
        }
    }

    /// Run effects until the queue drains. Previews succeed, params come
    /// from `self.params`, uploads start and stay in flight.
    fn run(&mut self, effects: Vec<Effect<u32>>) {
        let mut queue: VecDeque<Effect<u32>> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let more = match effect {
                Effect::GeneratePreview(id) => {
                    let preview = PreviewInfo {
                        kind: MediaKind::Image,
                        url: Some(format!("blob:{id}")),
                        width: Some(1),
                        height: Some(1),
                        duration: None,
                    };
                    self.ctl.preview_finished(id, Some(preview))
                }
                Effect::ResolveParams(id) => self.ctl.params_resolved(id, self.params.clone()),
                Effect::StartUpload { id, attempt, .. } => {
                    self.next_handle += 1;
                    self.in_flight.insert(id, attempt);
                    self.ctl.upload_started(id, attempt, self.next_handle)
                }
                Effect::AbortUpload(handle) => {
                    self.aborted.push(handle);
                    Vec::new()
                }
                Effect::ReleasePreview(url) => {
                    self.released.push(url);
                    Vec::new()
                }
            };
            queue.extend(more);
        }
    }

    fn add(&mut self, files: Vec<TestFile>) -> Vec<FileId> {
        let before: Vec<FileId> = self.ctl.files().iter().map(|f| f.id()).collect();
        let effects = self.ctl.add_files(files);
        self.run(effects);
        self.ctl
            .files()
            .iter()
            .map(|f| f.id())
            .filter(|id| !before.contains(id))
            .collect()
    }

    fn respond(&mut self, id: FileId, ready_state: u16, http_status: u16) {
        let attempt = self.in_flight[&id];
        let effects = self.ctl.transport_event(
            id,
            attempt,
            TransportEvent::ReadyState {
                ready_state,
                http_status,
            },
        );
        self.run(effects);
    }

    fn progress(&mut self, id: FileId, loaded: f64, total: f64) {
        let attempt = self.in_flight[&id];
        let effects = self
            .ctl
            .transport_event(id, attempt, TransportEvent::Progress { loaded, total });
        self.run(effects);
    }

    fn status(&self, id: FileId) -> Option<Status> {
        self.ctl.status_of(id)
    }

    fn assert_legal(&self) {
        let journal = self.journal.borrow();
        assert!(journal.illegal.is_empty(), "illegal edges: {:?}", journal.illegal);
    }
}

#[test]
fn undersized_file_fails_size_check() {
    let config = DropzoneConfig {
        min_size_bytes: 1024,
        ..DropzoneConfig::default()
    };
    let mut h = Harness::new(config);
    let ids = h.add(vec![file("tiny.png", 10, "image/png")]);
    assert_eq!(
        h.journal.borrow().statuses(ids[0]),
        [Status::Preparing, Status::ErrorFileSize]
    );
    assert!(h.released.is_empty());
    h.assert_legal();
}

#[test]
fn mismatched_type_is_rejected_without_preview() {
    let config = DropzoneConfig {
        accept: "image/*".into(),
        ..DropzoneConfig::default()
    };
    let mut h = Harness::new(config);
    let ids = h.add(vec![file("notes.txt", 10, "text/plain")]);
    assert_eq!(h.journal.borrow().statuses(ids[0]), [Status::RejectedFileType]);
    assert!(h.ctl.files().get(ids[0]).unwrap().meta().preview.is_none());
    h.assert_legal();
}

#[test]
fn max_files_one_admits_first_under_either_policy() {
    for policy in [MaxFilesPolicy::RejectOverflow, MaxFilesPolicy::RejectBatch] {
        let config = DropzoneConfig {
            max_files: 1,
            max_files_policy: policy,
            ..DropzoneConfig::default()
        };
        let mut h = Harness::new(config);
        let ids = h.add(vec![file("a.png", 10, "image/png")]);
        let more = h.add(vec![file("b.png", 10, "image/png")]);
        assert_eq!(h.status(ids[0]), Some(Status::Uploading), "{policy:?}");
        assert_eq!(h.status(more[0]), Some(Status::RejectedMaxFiles), "{policy:?}");
        h.assert_legal();
    }
}

#[test]
fn one_batch_over_capacity_depends_on_policy() {
    let batch = || {
        vec![
            file("a.png", 10, "image/png"),
            file("b.png", 10, "image/png"),
        ]
    };

    let mut h = Harness::new(DropzoneConfig {
        max_files: 1,
        ..DropzoneConfig::default()
    });
    let ids = h.add(batch());
    assert_eq!(h.status(ids[0]), Some(Status::Uploading));
    assert_eq!(h.status(ids[1]), Some(Status::RejectedMaxFiles));

    let mut h = Harness::new(DropzoneConfig {
        max_files: 1,
        max_files_policy: MaxFilesPolicy::RejectBatch,
        ..DropzoneConfig::default()
    });
    let ids = h.add(batch());
    assert_eq!(h.status(ids[0]), Some(Status::RejectedMaxFiles));
    assert_eq!(h.status(ids[1]), Some(Status::RejectedMaxFiles));
}

#[test]
fn manual_upload_parks_in_ready_until_restart() {
    let config = DropzoneConfig {
        auto_upload: false,
        ..DropzoneConfig::default()
    };
    let mut h = Harness::new(config);
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    assert_eq!(h.status(ids[0]), Some(Status::Ready));

    let effects = h.ctl.restart(ids[0]);
    h.run(effects);
    assert_eq!(h.status(ids[0]), Some(Status::Uploading));
    h.respond(ids[0], 4, 201);
    assert_eq!(h.status(ids[0]), Some(Status::Done));
    assert_eq!(
        h.journal.borrow().statuses(ids[0]),
        [
            Status::Preparing,
            Status::GettingUploadParams,
            Status::Ready,
            Status::Started,
            Status::Uploading,
            Status::Done,
        ]
    );
    h.assert_legal();
}

#[test]
fn server_error_then_restart_resets_progress() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    h.progress(ids[0], 60.0, 100.0);
    h.respond(ids[0], 2, 500);
    h.respond(ids[0], 4, 500);
    assert_eq!(h.status(ids[0]), Some(Status::ErrorUpload));
    let errors = h
        .journal
        .borrow()
        .statuses(ids[0])
        .into_iter()
        .filter(|s| *s == Status::ErrorUpload)
        .count();
    assert_eq!(errors, 1);

    let effects = h.ctl.restart(ids[0]);
    let meta = h.ctl.files().get(ids[0]).unwrap().meta().clone();
    assert_eq!(meta.status, Status::Restarted);
    assert!(meta.percent.abs() < f64::EPSILON);

    h.run(effects);
    assert_eq!(h.status(ids[0]), Some(Status::Uploading));
    assert_eq!(h.ctl.files().get(ids[0]).unwrap().attempt(), 2);
    h.assert_legal();
}

#[test]
fn late_events_from_a_previous_attempt_are_ignored() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    h.respond(ids[0], 4, 0);
    assert_eq!(h.status(ids[0]), Some(Status::ExceptionUpload));
    let effects = h.ctl.restart(ids[0]);
    h.run(effects);

    let effects = h.ctl.transport_event(
        ids[0],
        1,
        TransportEvent::ReadyState {
            ready_state: 4,
            http_status: 500,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(h.status(ids[0]), Some(Status::Uploading));
}

#[test]
fn rejected_request_is_aborted_before_restart() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    h.respond(ids[0], 2, 500);
    assert_eq!(h.status(ids[0]), Some(Status::ErrorUpload));
    assert_eq!(h.aborted, [1]);

    let effects = h.ctl.restart(ids[0]);
    h.run(effects);
    assert_eq!(h.status(ids[0]), Some(Status::Uploading));
    assert_eq!(h.aborted, [1]);
    h.assert_legal();
}

#[test]
fn cancel_twice_aborts_once() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    let effects = h.ctl.cancel(ids[0]);
    h.run(effects);
    let effects = h.ctl.cancel(ids[0]);
    h.run(effects);
    // The abort's synchronous readystatechange.
    h.respond(ids[0], 4, 0);

    assert_eq!(h.aborted, [1]);
    assert_eq!(h.status(ids[0]), Some(Status::Aborted));
    assert_eq!(h.journal.borrow().statuses(ids[0]).last(), Some(&Status::Aborted));
    h.assert_legal();
}

#[test]
fn remove_twice_releases_preview_once() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    h.respond(ids[0], 4, 200);

    let effects = h.ctl.remove(ids[0]);
    h.run(effects);
    let effects = h.ctl.remove(ids[0]);
    h.run(effects);

    assert_eq!(h.released, [format!("blob:{}", ids[0])]);
    assert!(h.ctl.files().is_empty());
    let journal = h.journal.borrow();
    let removed = journal
        .statuses(ids[0])
        .into_iter()
        .filter(|s| *s == Status::Removed)
        .count();
    assert_eq!(removed, 1);
    drop(journal);
    h.assert_legal();
}

#[test]
fn removed_files_free_their_slot() {
    let config = DropzoneConfig {
        max_files: 1,
        ..DropzoneConfig::default()
    };
    let mut h = Harness::new(config);
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    h.respond(ids[0], 4, 200);
    let effects = h.ctl.remove(ids[0]);
    h.run(effects);

    let more = h.add(vec![file("b.png", 10, "image/png")]);
    assert_eq!(h.status(more[0]), Some(Status::Uploading));
}

#[test]
fn percent_never_decreases_while_uploading() {
    let mut h = Harness::new(DropzoneConfig::default());
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    let mut seen = Vec::new();
    for loaded in [10.0, 50.0, 30.0, 80.0, 0.0] {
        h.progress(ids[0], loaded, 100.0);
        seen.push(h.ctl.files().get(ids[0]).unwrap().meta().percent);
    }
    h.respond(ids[0], 2, 200);
    seen.push(h.ctl.files().get(ids[0]).unwrap().meta().percent);
    h.respond(ids[0], 4, 200);
    seen.push(h.ctl.files().get(ids[0]).unwrap().meta().percent);

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert!((seen.last().unwrap() - 100.0).abs() < f64::EPSILON);

    let journal = h.journal.borrow();
    let reported = &journal.percents[&ids[0]];
    assert!(reported.windows(2).all(|w| w[0] <= w[1]), "{reported:?}");
}

#[test]
fn no_upload_params_settles_done() {
    let mut h = Harness::new(DropzoneConfig::default());
    h.params = None;
    let ids = h.add(vec![file("a.png", 10, "image/png")]);
    assert_eq!(h.status(ids[0]), Some(Status::Done));
    assert_eq!(h.ctl.successful().count(), 1);
    assert!(h.in_flight.is_empty());
}

#[test]
fn mixed_batch_never_takes_an_illegal_edge() {
    let config = DropzoneConfig {
        accept: "image/*,.pdf".into(),
        max_size_bytes: 1000,
        max_files: 3,
        ..DropzoneConfig::default()
    };
    let mut h = Harness::new(config);
    let ids = h.add(vec![
        file("a.png", 10, "image/png"),
        file("b.txt", 10, "text/plain"),
        file("c.pdf", 5000, "application/pdf"),
        file("d.jpg", 10, "image/jpeg"),
        file("e.gif", 10, "image/gif"),
    ]);
    let statuses: Vec<_> = ids.iter().map(|id| h.status(*id).unwrap()).collect();
    assert_eq!(
        statuses,
        [
            Status::Uploading,
            Status::RejectedFileType,
            Status::ErrorFileSize,
            Status::Uploading,
            Status::RejectedMaxFiles,
        ]
    );

    h.respond(ids[0], 4, 200);
    let effects = h.ctl.cancel(ids[3]);
    h.run(effects);
    for id in &ids {
        let effects = h.ctl.remove(*id);
        h.run(effects);
    }
    assert!(h.ctl.files().is_empty());
    h.assert_legal();
}
