//
//  bosh-cli
//  director/reporter.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/03.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Progress Reporters
//!
//! Observation sinks for the protocol layer. Neither reporter influences
//! control flow: they only see what is happening.
//!
//! - [`TaskReporter`] narrates task lifecycles and relays task output chunks.
//! - [`FileReporter`] decorates upload streams and download sinks so a caller
//!   can observe byte transfer without altering the bytes.
//!
//! Both come with no-op implementations for callers that do not care.

use std::io::Write;

use tokio::io::AsyncRead;

use super::task_client::TaskState;

/// A readable upload source handed to [`FileReporter::track_upload`].
pub type UploadStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// A writable download sink handed to [`FileReporter::track_download`].
pub type DownloadWriter<'a> = Box<dyn Write + Send + 'a>;

/// Receives task lifecycle events while a task is being waited on.
pub trait TaskReporter: Send + Sync {
    /// Called once before the first poll of a task.
    fn task_started(&self, id: u64);

    /// Called once on every exit path of a wait, with the last observed state.
    ///
    /// `state` is `None` when the task state could not be fetched at all.
    fn task_finished(&self, id: u64, state: Option<&TaskState>);

    /// Called with each non-empty chunk of new task output.
    fn task_output_chunk(&self, id: u64, chunk: &[u8]);
}

/// Observes byte transfer of uploads and downloads.
pub trait FileReporter: Send + Sync {
    /// Wraps an upload source of `size` bytes. The returned stream must yield
    /// exactly the bytes of `stream`.
    fn track_upload(&self, size: u64, stream: UploadStream) -> UploadStream;

    /// Wraps a download sink expecting `size` bytes (0 when unknown). Bytes
    /// written to the returned sink must reach `sink` unchanged.
    fn track_download<'a>(&self, size: u64, sink: DownloadWriter<'a>) -> DownloadWriter<'a>;
}

/// A [`TaskReporter`] that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTaskReporter;

impl TaskReporter for NoopTaskReporter {
    fn task_started(&self, _id: u64) {}

    fn task_finished(&self, _id: u64, _state: Option<&TaskState>) {}

    fn task_output_chunk(&self, _id: u64, _chunk: &[u8]) {}
}

/// A [`FileReporter`] that passes streams through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFileReporter;

impl FileReporter for NoopFileReporter {
    fn track_upload(&self, _size: u64, stream: UploadStream) -> UploadStream {
        stream
    }

    fn track_download<'a>(&self, _size: u64, sink: DownloadWriter<'a>) -> DownloadWriter<'a> {
        sink
    }
}
