//
//  jenkins-cli
//  api/history.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/17.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Parser for the build history widget (`<job>/buildHistory/ajax`).
//!
//! The widget is an HTML table with one `<tr>` per build. Each row carries
//! the build link text (`#12`), a status icon whose `alt` text starts with
//! the result (`Success &gt; Console Output`), and a `time="<millis>"`
//! attribute.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `#<number>` inside the build link.
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s*#(\d+)\s*<").unwrap());

/// Status icon alt text, up to the first `&gt;` or `>`.
static STATUS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"alt="([^"&>]*?)\s*(?:&gt;[^"]*)?""#).unwrap());

/// Start time in milliseconds since the epoch.
static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"time="(\d+)""#).unwrap());

/// One row of a job's build history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct History {
    /// Build number.
    pub number: i64,
    /// Status text as shown by the icon, e.g. `Success` or `In progress`.
    pub status: String,
    /// Start time in milliseconds since the epoch, `0` if absent.
    pub timestamp: i64,
}

/// Extracts build rows from the history widget markup, newest first.
///
/// Rows without a build number (headers, the "pending" row) are skipped.
pub fn parse_build_history(html: &str) -> Vec<History> {
    html.split("<tr")
        .skip(1)
        .filter_map(|row| {
            let number = NUMBER_PATTERN.captures(row)?.get(1)?.as_str().parse().ok()?;
            let status = STATUS_PATTERN
                .captures(row)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let timestamp = TIME_PATTERN
                .captures(row)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            Some(History {
                number,
                status,
                timestamp,
            })
        })
        .collect()
}
