// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Finding Recorder
 * Signature-based deduplication of findings for one audit run
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::StoreError;
use crate::store::ScanStore;
use crate::types::{Finding, FindingOptions, FindingType};
use crate::url_utils::hostname;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RecorderState {
    signatures: HashSet<String>,
    findings: Vec<Finding>,
}

/// Accumulates unique findings and forwards each new one to the store.
pub struct FindingRecorder {
    session_id: String,
    store: Arc<dyn ScanStore>,
    state: Mutex<RecorderState>,
}

impl FindingRecorder {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn ScanStore>) -> Self {
        Self {
            session_id: session_id.into(),
            store,
            state: Mutex::new(RecorderState::default()),
        }
    }

    /// `type::hostname(url)::detail`, raw url when it does not parse
    pub fn signature(finding_type: &FindingType, url: &str, detail: &str) -> String {
        let domain = hostname(url).unwrap_or_else(|| url.to_string());
        format!("{}::{}::{}", finding_type, domain, detail)
    }

    /// Record a finding unless one with the same signature exists.
    ///
    /// Returns `Ok(true)` when the finding was new. A store failure is
    /// returned as-is; the finding stays in the in-memory list.
    pub async fn record(
        &self,
        finding_type: FindingType,
        url: &str,
        detail: impl Into<String>,
        options: FindingOptions,
    ) -> Result<bool, StoreError> {
        let detail = detail.into();
        let signature = Self::signature(&finding_type, url, &detail);

        let finding = {
            let mut state = self.state.lock();
            if !state.signatures.insert(signature) {
                debug!("[Recorder] Duplicate {} on {} ignored", finding_type, url);
                return Ok(false);
            }

            let finding = Finding {
                finding_type,
                url: url.to_string(),
                detail,
                confidence: options.confidence,
                severity: options.severity,
                discovered_at: chrono::Utc::now().to_rfc3339(),
            };
            state.findings.push(finding.clone());
            finding
        };

        info!(
            "[Recorder] {} ({}/{}) {}: {}",
            finding.finding_type, finding.severity, finding.confidence, finding.url, finding.detail
        );

        self.store.append_finding(&self.session_id, &finding).await?;
        Ok(true)
    }

    /// Findings in discovery order
    pub fn findings(&self) -> Vec<Finding> {
        self.state.lock().findings.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_of(&self, finding_type: &FindingType) -> usize {
        self.state
            .lock()
            .findings
            .iter()
            .filter(|f| &f.finding_type == finding_type)
            .count()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Confidence, Severity};

    async fn recorder() -> (FindingRecorder, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.begin_session("s1", "https://a.com").await.unwrap();
        (FindingRecorder::new("s1", store.clone()), store)
    }

    #[tokio::test]
    async fn test_duplicate_signature_is_stored_once() {
        let (recorder, store) = recorder().await;
        let options = FindingOptions::new(Confidence::High, Severity::Medium);

        assert!(recorder
            .record(FindingType::InsecureCookie, "https://a.com/x", "sid missing Secure", options)
            .await
            .unwrap());
        assert!(!recorder
            .record(FindingType::InsecureCookie, "https://a.com/y", "sid missing Secure", options)
            .await
            .unwrap());

        assert_eq!(recorder.len(), 1);
        assert_eq!(store.snapshot("s1").unwrap().findings.len(), 1);
    }

    #[tokio::test]
    async fn test_same_detail_on_different_domains_both_persist() {
        let (recorder, _) = recorder().await;
        let options = FindingOptions::default();

        recorder
            .record(FindingType::InsecureTransport, "https://a.com", "same detail", options)
            .await
            .unwrap();
        recorder
            .record(FindingType::InsecureTransport, "https://b.com", "same detail", options)
            .await
            .unwrap();

        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_signature_falls_back_to_raw_url() {
        assert_eq!(
            FindingRecorder::signature(&FindingType::CredentialsInUrl, "not a url", "d"),
            "credentials_in_url::not a url::d"
        );
        assert_eq!(
            FindingRecorder::signature(&FindingType::CredentialsInUrl, "https://A.com/p?q=1", "d"),
            "credentials_in_url::a.com::d"
        );
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let store = Arc::new(MemoryStore::new());
        let recorder = FindingRecorder::new("never-created", store);

        let result = recorder
            .record(FindingType::InsecureCookie, "https://a.com", "x", FindingOptions::default())
            .await;
        assert!(matches!(result, Err(StoreError::UnknownSession { .. })));
    }
}
