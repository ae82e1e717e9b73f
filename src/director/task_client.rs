//
//  bosh-cli
//  director/task_client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/05.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Task Client
//!
//! Most Director operations run asynchronously. The Director answers the
//! submitting request with a short task descriptor (`{"id": 7, "state":
//! "queued"}`) and the work is then tracked through `/tasks/{id}`.
//!
//! [`TaskClient`] turns that into a synchronous call:
//!
//! ```text
//! submit ──> task id ──> loop {
//!                          GET /tasks/{id}                      (state)
//!                          GET /tasks/{id}/output?type=<type>   (Range: bytes=<offset>-)
//!                          running?  sleep and repeat
//!                          done?     success
//!                          other?    TaskFailed { id, state }
//!                        }
//! ```
//!
//! State is always fetched before output, so the last chunk of a task that
//! finished between the two requests is still delivered. A `416 Range Not
//! Satisfiable` on the output request means no new bytes and leaves the
//! [`OutputCursor`] where it was.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderValue, RANGE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{DirectorError, Result, ResultExt};
use super::executor::{DownloadSink, RequestExecutor};
use super::reporter::TaskReporter;
use super::request::{DirectorRequest, RequestBody, RequestCustomizer};

/// Pause between two polls of the same task.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle state of a Director task.
///
/// `queued`, `processing` and `cancelling` are the only running states and
/// `done` is the only successful one. A state string this client does not know
/// is kept verbatim and treated as a failed terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Queued,
    Processing,
    Cancelling,
    Done,
    Error,
    Timeout,
    Cancelled,
    Unknown(String),
}

impl TaskState {
    /// The wire spelling of the state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Cancelling => "cancelling",
            Self::Done => "done",
            Self::Error => "error",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unknown(state) => state,
        }
    }

    /// True while the Director is still working on the task.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Queued | Self::Processing | Self::Cancelling)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }

    /// True only for `done`.
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl From<String> for TaskState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "cancelling" => Self::Cancelling,
            "done" => Self::Done,
            "error" => Self::Error,
            "timeout" => Self::Timeout,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown(state),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Unknown(state) => state,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The short task descriptor returned by task-creating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskShort {
    pub id: u64,
    pub state: TaskState,
}

/// Which task log is relayed while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// Structured progress events (what the CLI renders by default)
    #[default]
    Event,
    /// Cloud provider interface log
    Cpi,
    /// Full Director debug log
    Debug,
    /// Task result
    Result,
    /// Unrendered event log
    Raw,
}

impl OutputType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Cpi => "cpi",
            Self::Debug => "debug",
            Self::Result => "result",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte offset into one task output stream that has already been relayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCursor {
    offset: u64,
}

impl OutputCursor {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Value of the `Range` header that asks for unseen bytes only.
    fn range(&self) -> String {
        format!("bytes={}-", self.offset)
    }

    fn advance(&mut self, bytes: u64) {
        self.offset += bytes;
    }
}

/// Submits task-creating requests and waits for the tasks to finish.
#[derive(Clone)]
pub struct TaskClient {
    executor: RequestExecutor,
    reporter: Arc<dyn TaskReporter>,
    poll_interval: Duration,
}

impl TaskClient {
    /// Creates a task client.
    ///
    /// `reporter` receives the events of waits started by the `*_result`
    /// methods; [`wait_for_completion`](Self::wait_for_completion) takes its
    /// own reporter.
    pub fn new(executor: RequestExecutor, reporter: Arc<dyn TaskReporter>) -> Self {
        Self {
            executor,
            reporter,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the pause between polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn reporter(&self) -> &Arc<dyn TaskReporter> {
        &self.reporter
    }

    /// Sends a `POST` that starts a task and returns the task id.
    pub async fn post(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<u64> {
        let task: TaskShort = self.executor.post(path, payload, customizer).await?;
        Ok(task.id)
    }

    /// Sends a `PUT` that starts a task and returns the task id.
    pub async fn put(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<u64> {
        let task: TaskShort = self.executor.put(path, payload, customizer).await?;
        Ok(task.id)
    }

    /// Sends a `DELETE` that starts a task and returns the task id.
    pub async fn delete(&self, path: &str, customizer: RequestCustomizer<'_>) -> Result<u64> {
        let task: TaskShort = self.executor.delete(path, customizer).await?;
        Ok(task.id)
    }

    /// Starts a task with `POST`, waits for it and returns its raw result.
    ///
    /// # Returns
    ///
    /// The unparsed bytes of the task's `result` output.
    pub async fn post_result(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<Bytes> {
        let id = self.post(path, payload, customizer).await?;
        self.wait_for_result(id).await
    }

    /// Starts a task with `PUT`, waits for it and returns its raw result.
    pub async fn put_result(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<Bytes> {
        let id = self.put(path, payload, customizer).await?;
        self.wait_for_result(id).await
    }

    /// Starts a task with `DELETE`, waits for it and returns its raw result.
    pub async fn delete_result(&self, path: &str, customizer: RequestCustomizer<'_>) -> Result<Bytes> {
        let id = self.delete(path, customizer).await?;
        self.wait_for_result(id).await
    }

    /// Starts a task with `GET`, waits for it and returns its id and raw result.
    pub async fn get_result(&self, path: &str) -> Result<(u64, Bytes)> {
        let task: TaskShort = self.executor.get(path, None).await?;
        let result = self.wait_for_result(task.id).await?;
        Ok((task.id, result))
    }

    /// Polls task `id` until it reaches a terminal state.
    ///
    /// New output of `output_type` is relayed to `reporter` as it appears.
    /// `reporter` always sees one `task_started` and, whatever the outcome,
    /// one `task_finished` carrying the last state observed.
    ///
    /// # Errors
    ///
    /// [`DirectorError::TaskFailed`] when the task ends in any state other than
    /// `done`; request failures wrapped with `Getting task state` or
    /// `Getting task output`.
    pub async fn wait_for_completion(
        &self,
        id: u64,
        output_type: OutputType,
        reporter: &dyn TaskReporter,
    ) -> Result<()> {
        reporter.task_started(id);

        let mut last_state = None;
        let outcome = self.poll(id, output_type, reporter, &mut last_state).await;

        reporter.task_finished(id, last_state.as_ref());
        outcome.map(|_| ())
    }

    /// Cancels task `id`. A wait in progress elsewhere is not interrupted; it
    /// observes the `cancelled` state on its next poll.
    pub async fn cancel(&self, id: u64) -> Result<()> {
        self.executor
            .raw_delete(&format!("/task/{id}"), None)
            .await
            .wrap_err_with(|| format!("Cancelling task '{id}'"))?;
        Ok(())
    }

    async fn wait_for_result(&self, id: u64) -> Result<Bytes> {
        self.wait_for_completion(id, OutputType::Event, self.reporter.as_ref())
            .await?;

        let response = self
            .executor
            .raw_get(&output_path(id, OutputType::Result), None, None)
            .await
            .wrap_err_with(|| format!("Getting task '{id}' result"))?;

        Ok(response.body)
    }

    /// The polling loop; returns the cursor at the moment the task finished.
    async fn poll(
        &self,
        id: u64,
        output_type: OutputType,
        reporter: &dyn TaskReporter,
        last_state: &mut Option<TaskState>,
    ) -> Result<OutputCursor> {
        let mut cursor = OutputCursor::default();

        loop {
            let task: TaskShort = self
                .executor
                .get(&format!("/tasks/{id}"), None)
                .await
                .wrap_err("Getting task state")?;
            *last_state = Some(task.state.clone());

            self.relay_output(id, output_type, &mut cursor, reporter)
                .await
                .wrap_err("Getting task output")?;

            debug!(
                task = id,
                state = %task.state,
                offset = cursor.offset(),
                "Polled director task"
            );

            if task.state.is_running() {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }

            if task.state.is_successful() {
                return Ok(cursor);
            }

            return Err(DirectorError::TaskFailed {
                id,
                state: task.state,
            });
        }
    }

    async fn relay_output(
        &self,
        id: u64,
        output_type: OutputType,
        cursor: &mut OutputCursor,
        reporter: &dyn TaskReporter,
    ) -> Result<()> {
        let range = cursor.range();
        let set_range = |request: &mut DirectorRequest| {
            if let Ok(value) = HeaderValue::from_str(&range) {
                request.headers_mut().insert(RANGE, value);
            }
        };

        let mut writer = TaskOutputWriter {
            id,
            reporter,
            written: 0,
        };

        let fetched = self
            .executor
            .raw_get(
                &output_path(id, output_type),
                Some(DownloadSink::untracked(&mut writer)),
                Some(&set_range),
            )
            .await;

        match fetched {
            Ok(_) => {
                cursor.advance(writer.written);
                Ok(())
            }
            Err(err) if err.status() == Some(StatusCode::RANGE_NOT_SATISFIABLE) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

fn output_path(id: u64, output_type: OutputType) -> String {
    format!("/tasks/{id}/output?type={output_type}")
}

/// Forwards every non-empty write to a [`TaskReporter`] and counts the bytes.
struct TaskOutputWriter<'a> {
    id: u64,
    reporter: &'a dyn TaskReporter,
    written: u64,
}

impl Write for TaskOutputWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !buf.is_empty() {
            self.reporter.task_output_chunk(self.id, buf);
            self.written += buf.len() as u64;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
