// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tunables for one audit run.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Ceiling on simultaneous in-flight page fetches
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    /// Retries per request on transient network failure
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on fetched pages; 0 disables the bound
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[validate(length(min = 1))]
    #[serde(default = "default_usernames")]
    pub usernames: Vec<String>,

    #[validate(length(min = 1))]
    #[serde(default = "default_passwords")]
    pub passwords: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_injection: bool,

    #[serde(default = "default_true")]
    pub enable_brute_force: bool,

    #[serde(default = "default_true")]
    pub enable_upload_probe: bool,

    /// Minimum weighted score for a login response to count as a success
    #[validate(range(min = 1, max = 6))]
    #[serde(default = "default_login_threshold")]
    pub login_success_threshold: u32,

    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            max_retries: default_retries(),
            request_timeout_secs: default_timeout(),
            max_pages: default_max_pages(),
            user_agent: None,
            usernames: default_usernames(),
            passwords: default_passwords(),
            enable_injection: true,
            enable_brute_force: true,
            enable_upload_probe: true,
            login_success_threshold: default_login_threshold(),
            accept_invalid_certs: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_timeout() -> u64 {
    15
}

fn default_max_pages() -> usize {
    200
}

fn default_login_threshold() -> u32 {
    3
}

fn default_usernames() -> Vec<String> {
    ["admin", "test", "user"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_passwords() -> Vec<String> {
    ["admin", "password", "123456", "test"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
