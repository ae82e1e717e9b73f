//
//  bosh-cli
//  cli/tasks.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Task commands
//!
//! ## Examples
//!
//! ```bash
//! # Running tasks
//! bosh -e vbox tasks
//!
//! # The 30 most recent tasks, including internal ones
//! bosh -e vbox tasks --recent=30 --all
//!
//! # Follow the debug log of a task
//! bosh -e vbox task 165 --debug
//! ```

use anyhow::{bail, Result};
use clap::Args;

use crate::director::{OutputType, Task};
use crate::interactive::confirm_operation;
use crate::output::format_state;
use crate::util::{format_time, truncate};

use super::context::CommandContext;
use super::GlobalOptions;

/// List running or recent tasks
#[derive(Args, Debug)]
pub struct TasksCommand {
    /// Show the most recent tasks instead of the running ones
    #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "30", value_name = "NUMBER")]
    pub recent: Option<usize>,

    /// Include tasks started by the Director itself
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Show the output of a task, following it while it runs
#[derive(Args, Debug)]
pub struct TaskCommand {
    /// Task ID
    pub id: u64,

    /// Event log (default)
    #[arg(long, group = "output")]
    pub event: bool,

    /// CPI log
    #[arg(long, group = "output")]
    pub cpi: bool,

    /// Debug log
    #[arg(long, group = "output")]
    pub debug: bool,

    /// Task result
    #[arg(long, group = "output")]
    pub result: bool,

    /// Event log without rendering
    #[arg(long, group = "output")]
    pub raw: bool,
}

/// Cancel a queued or running task
#[derive(Args, Debug)]
pub struct CancelTaskCommand {
    /// Task ID
    pub id: u64,
}

impl TaskCommand {
    fn output_type(&self) -> OutputType {
        if self.cpi {
            OutputType::Cpi
        } else if self.debug {
            OutputType::Debug
        } else if self.result {
            OutputType::Result
        } else if self.raw {
            OutputType::Raw
        } else {
            OutputType::Event
        }
    }
}

fn print_tasks(ctx: &CommandContext<'_>, tasks: &[Task]) -> Result<()> {
    let color = ctx.output.color();
    ctx.output.write(tasks, |tasks, table| {
        table
            .headers(["ID", "State", "Created At", "User", "Deployment", "Description", "Result"])
            .rows(tasks.iter().map(|task| {
                [
                    task.id.to_string(),
                    format_state(task.state.as_str(), color),
                    format_time(task.timestamp),
                    task.user.clone(),
                    task.deployment.clone().unwrap_or_default(),
                    task.description.clone(),
                    truncate(task.result.as_deref().unwrap_or_default(), 60),
                ]
            }))
    })?;

    if !ctx.output.is_json() {
        println!("{} tasks", tasks.len());
    }
    Ok(())
}

impl TasksCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let director = ctx.director().await?;

        let outcome = match self.recent {
            Some(limit) => director.recent_tasks(limit, self.all).await,
            None => director.current_tasks(self.all).await,
        };
        let tasks = ctx.finish(outcome)?;

        print_tasks(&ctx, &tasks)
    }
}

impl TaskCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let output_type = self.output_type();
        let director = ctx.director_with_output(output_type).await?;

        let reporter = director.task_client().reporter().clone();
        let outcome = match director.find_task(self.id).await {
            Ok(task) => {
                director
                    .task_output(task.id, output_type, reporter.as_ref())
                    .await
            }
            Err(err) => Err(err),
        };
        ctx.finish(outcome)
    }
}

impl CancelTaskCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        if !confirm_operation(&format!("Cancel task '{}'?", self.id), global.non_interactive)? {
            bail!("Stopped");
        }

        let director = ctx.director().await?;
        let outcome = director.cancel_task(self.id).await;
        ctx.finish(outcome)?;

        ctx.output
            .write_success(&format!("Requested cancellation of task '{}'", self.id));
        Ok(())
    }
}
