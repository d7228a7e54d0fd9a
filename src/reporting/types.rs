// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub id: String,
    pub text: String,
    pub priority: Priority,
}

/// Remediation summary derived from the finding list at the end of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// One entry per mapped finding, in finding order (repeats allowed)
    pub recommendations: Vec<Recommendation>,
    /// Recommendation id to reference links, one key per distinct id
    pub resources: BTreeMap<String, Vec<String>>,
    pub total_findings: usize,
}
