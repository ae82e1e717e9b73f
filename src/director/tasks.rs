//
//  bosh-cli
//  director/tasks.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/06.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Task listing, lookup, output capture and cancellation.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::client::Director;
use super::error::{Result, ResultExt};
use super::reporter::TaskReporter;
use super::task_client::{OutputType, TaskState};

/// A task as listed by `GET /tasks` and `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Task {
    pub id: u64,
    /// Creation time, seconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
    pub state: TaskState,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub result: Option<String>,
}

impl Task {
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp, 0)
            .single()
            .unwrap_or_default()
    }

    /// True for tasks that ended in `error`, `timeout` or `cancelled`.
    pub fn is_error(&self) -> bool {
        matches!(
            self.state,
            TaskState::Error | TaskState::Timeout | TaskState::Cancelled
        )
    }
}

fn verbosity(include_all: bool) -> &'static str {
    if include_all {
        "2"
    } else {
        "1"
    }
}

impl Director {
    /// Tasks that are queued, processing or cancelling.
    ///
    /// `include_all` also lists the Director's internal tasks (scheduled
    /// snapshots, orphan clean-ups and the like).
    pub async fn current_tasks(&self, include_all: bool) -> Result<Vec<Task>> {
        let path = format!(
            "/tasks?state=processing,cancelling,queued&verbose={}",
            verbosity(include_all)
        );
        self.executor()
            .get(&path, None)
            .await
            .wrap_err("Finding current tasks")
    }

    /// The `limit` most recent tasks, in any state.
    pub async fn recent_tasks(&self, limit: usize, include_all: bool) -> Result<Vec<Task>> {
        let path = format!("/tasks?limit={limit}&verbose={}", verbosity(include_all));
        self.executor()
            .get(&path, None)
            .await
            .wrap_err("Finding recent tasks")
    }

    pub async fn find_task(&self, id: u64) -> Result<Task> {
        self.executor()
            .get(&format!("/tasks/{id}"), None)
            .await
            .wrap_err_with(|| format!("Finding task '{id}'"))
    }

    /// Relays the `output_type` log of task `id` to `reporter` until the task
    /// finishes.
    pub async fn task_output(
        &self,
        id: u64,
        output_type: OutputType,
        reporter: &dyn TaskReporter,
    ) -> Result<()> {
        self.task_client()
            .wait_for_completion(id, output_type, reporter)
            .await
            .wrap_err_with(|| format!("Capturing task '{id}' output"))
    }

    pub async fn cancel_task(&self, id: u64) -> Result<()> {
        self.task_client().cancel(id).await
    }
}
