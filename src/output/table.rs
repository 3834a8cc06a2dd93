//
//  jenkins-cli
//  output/table.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use std::time::Duration;

use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Fluent wrapper over a `comfy_table::Table`.
pub struct TableBuilder {
    table: Table,
    color: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            table: create_table(),
            color: console::colors_enabled(),
        }
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(|s| s.into()).collect();
        if self.color {
            let cells: Vec<Cell> = headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)).collect();
            self.table.set_header(cells);
        } else {
            self.table.set_header(headers);
        }
        self
    }

    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            let row: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            self.table.add_row(row);
        }
        self
    }

    pub fn print(self) {
        println!("{}", self.table);
    }

    pub fn build(self) -> Table {
        self.table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Describes a job's ball color (`blue`, `red_anime`, ...).
///
/// The `_anime` suffix marks a running build and is shown as `(building)`.
pub fn format_ball(ball: &str, color: bool) -> String {
    let (base, building) = match ball.strip_suffix("_anime") {
        Some(base) => (base, true),
        None => (ball, false),
    };
    let label = match base {
        "blue" | "green" => "success",
        "red" => "failed",
        "yellow" => "unstable",
        "aborted" => "aborted",
        "disabled" => "disabled",
        "notbuilt" | "grey" => "not built",
        "" => "-",
        other => other,
    };
    let text = if building {
        format!("{} (building)", label)
    } else {
        label.to_string()
    };
    if !color {
        return text;
    }
    match base {
        "blue" | "green" => style(text).green().to_string(),
        "red" => style(text).red().to_string(),
        "yellow" => style(text).yellow().to_string(),
        "aborted" | "disabled" | "notbuilt" | "grey" => style(text).dim().to_string(),
        _ => text,
    }
}

/// Describes a build result; a running build has no result yet.
pub fn format_result(result: Option<&str>, building: bool, color: bool) -> String {
    let text = match (result, building) {
        (_, true) => "BUILDING".to_string(),
        (Some(result), false) => result.to_string(),
        (None, false) => "-".to_string(),
    };
    if !color {
        return text;
    }
    match text.as_str() {
        "SUCCESS" => style(text).green().to_string(),
        "FAILURE" => style(text).red().to_string(),
        "UNSTABLE" => style(text).yellow().to_string(),
        "BUILDING" => style(text).cyan().to_string(),
        "ABORTED" | "NOT_BUILT" => style(text).dim().to_string(),
        _ => text,
    }
}

pub fn format_bool(value: bool, color: bool) -> String {
    if color {
        if value {
            style("Yes").green().to_string()
        } else {
            style("No").dim().to_string()
        }
    } else if value {
        "Yes".to_string()
    } else {
        "No".to_string()
    }
}

/// Formats milliseconds since the epoch as local time; `0` is shown as `-`.
pub fn format_millis(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        None => "Unknown".to_string(),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Shortens `s` to `max_len` characters, ending in `...` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ball() {
        assert_eq!(format_ball("blue", false), "success");
        assert_eq!(format_ball("red_anime", false), "failed (building)");
        assert_eq!(format_ball("notbuilt", false), "not built");
        assert_eq!(format_ball("", false), "-");
        assert_eq!(format_ball("purple", false), "purple");
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(Some("SUCCESS"), false, false), "SUCCESS");
        assert_eq!(format_result(None, true, false), "BUILDING");
        assert_eq!(format_result(None, false, false), "-");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(7260)), "2h 1m");
        assert_eq!(format_duration(Duration::from_secs(90000)), "1d 1h");
    }

    #[test]
    fn test_format_millis_zero() {
        assert_eq!(format_millis(0), "-");
        assert_ne!(format_millis(1_700_000_000_000), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }
}
