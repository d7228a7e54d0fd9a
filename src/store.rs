// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Persistence collaborator for scan progress.
//!
//! Writes are append-only and readable mid-run, so a status endpoint can
//! poll a session while the crawl is still going.

use crate::errors::StoreError;
use crate::types::{Finding, ScanStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Create (or reset) the record for a session. Failure is run-fatal.
    async fn begin_session(&self, session_id: &str, seed_url: &str) -> Result<(), StoreError>;

    async fn append_crawled_url(&self, session_id: &str, url: &str) -> Result<(), StoreError>;

    async fn append_finding(&self, session_id: &str, finding: &Finding) -> Result<(), StoreError>;

    async fn mark_status(&self, session_id: &str, status: ScanStatus) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub seed_url: String,
    pub status: ScanStatus,
    pub crawled_urls: Vec<String>,
    pub findings: Vec<Finding>,
    pub updated_at: String,
}

/// In-process store keyed by the opaque session id
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ScanRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current record, if the session exists
    pub fn snapshot(&self, session_id: &str) -> Option<ScanRecord> {
        self.records.read().get(session_id).cloned()
    }

    fn update<F>(&self, session_id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ScanRecord),
    {
        let mut records = self.records.write();
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| StoreError::UnknownSession {
                session_id: session_id.to_string(),
            })?;
        f(record);
        record.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn begin_session(&self, session_id: &str, seed_url: &str) -> Result<(), StoreError> {
        if session_id.trim().is_empty() {
            return Err(StoreError::SessionCreateFailed {
                session_id: session_id.to_string(),
                reason: "session id is empty".to_string(),
            });
        }

        self.records.write().insert(
            session_id.to_string(),
            ScanRecord {
                seed_url: seed_url.to_string(),
                status: ScanStatus::Running,
                crawled_urls: Vec::new(),
                findings: Vec::new(),
                updated_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        Ok(())
    }

    async fn append_crawled_url(&self, session_id: &str, url: &str) -> Result<(), StoreError> {
        self.update(session_id, |record| record.crawled_urls.push(url.to_string()))
    }

    async fn append_finding(&self, session_id: &str, finding: &Finding) -> Result<(), StoreError> {
        self.update(session_id, |record| record.findings.push(finding.clone()))
    }

    async fn mark_status(&self, session_id: &str, status: ScanStatus) -> Result<(), StoreError> {
        self.update(session_id, |record| record.status = status)
    }
}
