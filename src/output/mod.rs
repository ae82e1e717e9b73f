//
//  bosh-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Everything the CLI prints: tables for people, JSON for scripts, and the
//! live reporters that stream task logs and transfer progress.
//!
//! - [`table`]: `comfy_table` tables and state coloring
//! - [`json`]: `--json` serialization
//! - [`reporter`]: Console task and file reporters

mod json;
mod reporter;
mod table;

pub use json::*;
pub use reporter::*;
pub use table::*;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Prints command results in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints `value` as JSON, or builds and prints a table from it.
    pub fn write<T, F>(&self, value: &T, table: F) -> anyhow::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T, TableBuilder) -> TableBuilder,
    {
        match self.format {
            OutputFormat::Json => write_json(value),
            OutputFormat::Table => {
                table(value, TableBuilder::new().color(self.color)).print();
                Ok(())
            }
        }
    }

    pub fn write_success(&self, message: &str) {
        if self.is_json() {
            return;
        }
        if self.color {
            println!("{} {message}", console::style("✓").green());
        } else {
            println!("✓ {message}");
        }
    }

    pub fn write_info(&self, message: &str) {
        if self.is_json() {
            return;
        }
        println!("{message}");
    }

    pub fn write_warning(&self, message: &str) {
        if self.color {
            eprintln!("{} {message}", console::style("!").yellow());
        } else {
            eprintln!("! {message}");
        }
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
