//
//  jenkins-cli
//  api/fingerprint.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/17.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Fingerprints
//!
//! Jenkins records an MD5 fingerprint for archived artifacts. The
//! fingerprint document at `/fingerprint/<hash>` names the build that
//! produced the file and every build that used it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::build::Build;
use super::client::Jenkins;
use super::common::{null_default, Result};
use super::resource::{fingerprint_path, job_full_name, Resource};

/// The build that produced a fingerprinted file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Original {
    /// Full job name, e.g. `team/app`.
    #[serde(default)]
    pub name: String,
    /// Build number.
    #[serde(default)]
    pub number: i64,
}

/// A contiguous range of build numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// First build number in the range.
    pub start: i64,
    /// Exclusive upper bound.
    pub end: i64,
}

/// Wrapper Jenkins puts around a range list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSet {
    /// Ranges in ascending order.
    #[serde(default, deserialize_with = "null_default")]
    pub ranges: Vec<Range>,
}

/// Builds of one job that used the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Full job name.
    #[serde(default)]
    pub name: String,
    /// Build numbers of that job that used the file.
    #[serde(default)]
    pub ranges: RangeSet,
}

/// Snapshot of a fingerprint document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerPrintResponse {
    /// File name at the time it was first fingerprinted.
    #[serde(default)]
    pub file_name: String,
    /// MD5 hash.
    #[serde(default)]
    pub hash: String,
    /// Producing build; `None` when produced outside Jenkins.
    #[serde(default)]
    pub original: Option<Original>,
    /// First seen, in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Builds that used the file.
    #[serde(default, deserialize_with = "null_default")]
    pub usage: Vec<Usage>,
}

/// Handle on a fingerprint.
#[derive(Debug, Clone)]
pub struct FingerPrint<'a> {
    client: &'a Jenkins,
    id: String,
    base: String,
    raw: Option<FingerPrintResponse>,
}

#[async_trait]
impl<'a> Resource for FingerPrint<'a> {
    type Raw = FingerPrintResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&FingerPrintResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: FingerPrintResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> FingerPrint<'a> {
    /// Creates an unpopulated handle for the hash `id`.
    pub fn new(client: &'a Jenkins, id: &str) -> Self {
        Self {
            client,
            id: id.to_string(),
            base: fingerprint_path(id),
            raw: None,
        }
    }

    /// The hash this handle was created for.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Polls and reports whether Jenkins knows this exact hash.
    pub async fn valid(&mut self) -> Result<bool> {
        let status = self.poll().await?;
        Ok(status == 200 && self.raw.as_ref().is_some_and(|r| r.hash == self.id))
    }

    /// Checks that the file `file_name` was produced by `build`.
    pub async fn validate_for_build(&mut self, file_name: &str, build: &Build<'_>) -> Result<bool> {
        if !self.valid().await? {
            return Ok(false);
        }
        let Some(raw) = &self.raw else {
            return Ok(false);
        };
        let produced_by = raw.original.as_ref().is_some_and(|o| {
            o.name == job_full_name(build.job_base()) && o.number == build.number()
        });
        Ok(produced_by && raw.file_name == file_name)
    }

    /// Polls and returns the fresh snapshot.
    pub async fn info(&mut self) -> Result<&FingerPrintResponse> {
        self.refresh().await?;
        self.snapshot()
    }
}

impl Jenkins {
    /// Whether Jenkins has a fingerprint for `id`.
    pub async fn validate_fingerprint(&self, id: &str) -> Result<bool> {
        FingerPrint::new(self, id).valid().await
    }

    /// Fingerprint document of the artifact with hash `id`.
    pub async fn get_artifact_data(&self, id: &str) -> Result<FingerPrintResponse> {
        let mut fingerprint = FingerPrint::new(self, id);
        fingerprint.info().await.cloned()
    }
}
