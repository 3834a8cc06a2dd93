//
//  jenkins-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Rendering of command results for `jk`, in one of two formats:
//!
//! - **Table format**: human-readable output for interactive terminal use
//! - **JSON format**: pretty-printed JSON for scripting (`--json`)
//!
//! ## Architecture
//!
//! - [`table`]: table building and cell formatting using `comfy_table`
//! - [`json`]: JSON serialization using `serde_json`
//!
//! ## Example
//!
//! ```rust,ignore
//! use jenkins_cli::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write_list(&jobs)?;
//! writer.write_success("Job disabled");
//! ```

mod json;
mod table;

pub use json::*;
pub use table::*;

use serde::Serialize;

/// Output formats supported by `jk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table with optional colors.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// `Json` when `json` is set, `Table` otherwise.
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Table
        }
    }
}

/// Types that can be rendered as table rows.
///
/// A single value is rendered as a two-column key/value table; a list is
/// rendered with [`TableOutput::headers`] and one [`TableOutput::row`] per
/// value.
pub trait TableOutput {
    /// Column names for list rendering.
    fn headers() -> Vec<&'static str>
    where
        Self: Sized;

    /// Cells of this value, in [`TableOutput::headers`] order.
    fn row(&self, color: bool) -> Vec<String>;

    /// Key/value pairs for detail rendering.
    ///
    /// Defaults to pairing the headers with the row cells.
    fn fields(&self, color: bool) -> Vec<(String, String)>
    where
        Self: Sized,
    {
        Self::headers()
            .into_iter()
            .map(str::to_string)
            .zip(self.row(color))
            .collect()
    }
}

/// Writes command output in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer; colors follow terminal detection.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Writes a single value as a key/value table or a JSON object.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(value),
            OutputFormat::Table => {
                TableBuilder::new()
                    .color(self.color)
                    .rows(
                        value
                            .fields(self.color)
                            .into_iter()
                            .map(|(key, value)| vec![key, value]),
                    )
                    .print();
                Ok(())
            }
        }
    }

    /// Writes a list as a table or a JSON array.
    ///
    /// An empty list prints `empty` in table mode and `[]` in JSON mode.
    pub fn write_list<T: Serialize + TableOutput>(
        &self,
        values: &[T],
        empty: &str,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&values),
            OutputFormat::Table => {
                if values.is_empty() {
                    println!("{}", empty);
                    return Ok(());
                }
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::headers())
                    .rows(values.iter().map(|v| v.row(self.color)))
                    .print();
                Ok(())
            }
        }
    }

    /// Writes raw text unchanged (console logs, XML), or as a JSON string.
    pub fn write_text(&self, text: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&text),
            OutputFormat::Table => {
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
                Ok(())
            }
        }
    }

    /// Reports a completed action.
    ///
    /// In JSON mode this prints `{"success": true, "message": ...}`.
    pub fn write_success(&self, message: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&serde_json::json!({
                "success": true,
                "message": message,
            })),
            OutputFormat::Table => {
                if self.color {
                    println!("{} {}", console::style("✓").green(), message);
                } else {
                    println!("✓ {}", message);
                }
                Ok(())
            }
        }
    }

    /// Reports an action that was not needed.
    pub fn write_skipped(&self, message: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(&serde_json::json!({
                "success": false,
                "message": message,
            })),
            OutputFormat::Table => {
                if self.color {
                    println!("{} {}", console::style("!").yellow(), message);
                } else {
                    println!("! {}", message);
                }
                Ok(())
            }
        }
    }
}
