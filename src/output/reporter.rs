//
//  bosh-cli
//  output/reporter.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Console Reporters
//!
//! Terminal implementations of the Director client's progress callbacks.
//!
//! - [`ConsoleTaskReporter`] relays task output as it streams in. Event output
//!   (one JSON document per line) is rendered as readable stage lines; every
//!   other output type is printed verbatim.
//! - [`ConsoleFileReporter`] draws an `indicatif` progress bar on stderr for
//!   uploads and downloads.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{TimeZone, Utc};
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
use serde::Deserialize;

use crate::director::reporter::{DownloadWriter, FileReporter, TaskReporter, UploadStream};
use crate::director::TaskState;

use super::OutputFormat;

#[derive(Debug, Deserialize)]
struct TaskEvent {
    #[serde(default)]
    time: i64,
    #[serde(default)]
    stage: String,
    #[serde(default)]
    task: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    data: Option<EventData>,
    #[serde(default)]
    error: Option<EventError>,
}

#[derive(Debug, Deserialize)]
struct EventData {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventError {
    #[serde(default)]
    message: String,
}

#[derive(Default)]
struct RenderState {
    partial: Vec<u8>,
    started: HashMap<(String, String), i64>,
}

/// Where task output goes.
///
/// With `--json` stdout carries only the JSON document, so the task log moves
/// to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStream {
    Stdout,
    Stderr,
}

impl TaskStream {
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Stderr,
            OutputFormat::Table => Self::Stdout,
        }
    }
}

/// Prints task output to a terminal (or any writer).
pub struct ConsoleTaskReporter {
    out: Mutex<Box<dyn Write + Send>>,
    render_events: bool,
    state: Mutex<RenderState>,
}

impl ConsoleTaskReporter {
    /// Reporter writing to stdout.
    ///
    /// With `render_events` the output is parsed as event lines.
    pub fn stdout(render_events: bool) -> Self {
        Self::new(Box::new(io::stdout()), render_events)
    }

    /// Reporter writing to `stream`.
    pub fn to_stream(stream: TaskStream, render_events: bool) -> Self {
        match stream {
            TaskStream::Stdout => Self::stdout(render_events),
            TaskStream::Stderr => Self::new(Box::new(io::stderr()), render_events),
        }
    }

    pub fn new(out: Box<dyn Write + Send>, render_events: bool) -> Self {
        Self {
            out: Mutex::new(out),
            render_events,
            state: Mutex::new(RenderState::default()),
        }
    }

    fn out(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render_line(&self, id: u64, line: &str, state: &mut RenderState) -> String {
        let Ok(event) = serde_json::from_str::<TaskEvent>(line) else {
            return line.to_string();
        };

        let clock = clock(event.time);
        if let Some(error) = event.error {
            return format!("Task {id} | {clock} | Error: {}", error.message);
        }

        let key = (event.stage.clone(), event.task.clone());
        let label = if event.task.is_empty() {
            event.stage.clone()
        } else {
            format!("{}: {}", event.stage, event.task)
        };

        match event.state.as_str() {
            "started" => {
                state.started.insert(key, event.time);
                format!("Task {id} | {clock} | {label}")
            }
            "finished" | "failed" => {
                let elapsed = state
                    .started
                    .remove(&key)
                    .map(|started| format!(" ({})", duration(event.time - started)))
                    .unwrap_or_default();
                let mut rendered = format!("Task {id} | {clock} | {label}{elapsed}");
                if event.state == "failed" {
                    let reason = event
                        .data
                        .and_then(|data| data.error)
                        .unwrap_or_else(|| "unknown error".to_string());
                    rendered.push_str(&format!("\n            L Error: {reason}"));
                }
                rendered
            }
            _ => format!("Task {id} | {clock} | {label} ({})", event.state),
        }
    }
}

fn clock(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

impl TaskReporter for ConsoleTaskReporter {
    fn task_started(&self, id: u64) {
        let _ = writeln!(self.out(), "Task {id}\n");
    }

    fn task_finished(&self, id: u64, state: Option<&TaskState>) {
        let mut render = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let rest = std::mem::take(&mut render.partial);
        let mut out = self.out();

        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            let line = if self.render_events {
                self.render_line(id, &line, &mut render)
            } else {
                line.into_owned()
            };
            let _ = writeln!(out, "{line}");
        }

        let _ = match state {
            Some(state) => writeln!(out, "\nTask {id} {state}"),
            None => writeln!(out, "\nTask {id} state unknown"),
        };
        let _ = out.flush();
    }

    fn task_output_chunk(&self, id: u64, chunk: &[u8]) {
        if !self.render_events {
            let mut out = self.out();
            let _ = out.write_all(chunk);
            let _ = out.flush();
            return;
        }

        let mut render = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        render.partial.extend_from_slice(chunk);

        let Some(last_newline) = render.partial.iter().rposition(|b| *b == b'\n') else {
            return;
        };
        let complete: Vec<u8> = render.partial.drain(..=last_newline).collect();

        let mut out = self.out();
        for line in String::from_utf8_lossy(&complete).lines() {
            if line.trim().is_empty() {
                continue;
            }
            let rendered = self.render_line(id, line, &mut render);
            let _ = writeln!(out, "{rendered}");
        }
        let _ = out.flush();
    }
}

/// Draws transfer progress on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleFileReporter {
    hidden: bool,
}

impl ConsoleFileReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter that tracks nothing visibly, for `--json` and scripts.
    pub fn hidden() -> Self {
        Self { hidden: true }
    }

    fn bar(&self, size: u64) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }

        let bar = if size > 0 {
            ProgressBar::new(size)
        } else {
            ProgressBar::new_spinner()
        };
        let template = if size > 0 {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})"
        } else {
            "{spinner:.green} [{elapsed_precise}] {bytes}"
        };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.with_finish(ProgressFinish::AndLeave)
    }
}

impl FileReporter for ConsoleFileReporter {
    fn track_upload(&self, size: u64, stream: UploadStream) -> UploadStream {
        Box::new(self.bar(size).wrap_async_read(stream))
    }

    fn track_download<'a>(&self, size: u64, sink: DownloadWriter<'a>) -> DownloadWriter<'a> {
        Box::new(self.bar(size).wrap_write(sink))
    }
}
