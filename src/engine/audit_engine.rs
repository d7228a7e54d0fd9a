// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Audit Engine
 * Entry point for one bounded crawl + probe run against a seed URL
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::{AuditConfig, ConfigValidator};
use crate::crawler::Crawler;
use crate::errors::{AuditError, AuditResult};
use crate::http_client::{Fetcher, HttpClient};
use crate::reporting::generate_summary_report;
use crate::scanners::FormProber;
use crate::session::{CancelHandle, ScanSession};
use crate::store::{MemoryStore, ScanStore};
use crate::types::{ScanOutcome, ScanStatus};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

pub struct AuditEngine {
    config: AuditConfig,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ScanStore>,
}

impl AuditEngine {
    /// Engine with the reqwest client and an in-memory store
    pub fn new(config: AuditConfig) -> AuditResult<Self> {
        validate_config(&config)?;
        let client = HttpClient::from_config(&config)
            .map_err(|e| AuditError::Configuration(format!("{:#}", e)))?;

        Ok(Self {
            config,
            fetcher: Arc::new(client),
            store: Arc::new(MemoryStore::new()),
        })
    }

    /// Engine over caller-supplied HTTP and persistence collaborators
    pub fn with_collaborators(
        config: AuditConfig,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn ScanStore>,
    ) -> AuditResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            fetcher,
            store,
        })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ScanStore> {
        &self.store
    }

    pub async fn run_audit(&self, seed_url: &str, session_id: &str) -> AuditResult<ScanOutcome> {
        self.run_audit_with_cancel(seed_url, session_id, CancelHandle::new())
            .await
    }

    /// Crawl and probe `seed_url`, correlating all writes with `session_id`.
    ///
    /// Returns the finished outcome, or the run-fatal error after the
    /// session has been marked `error`. Already persisted URLs and findings
    /// are kept either way.
    pub async fn run_audit_with_cancel(
        &self,
        seed_url: &str,
        session_id: &str,
        cancel: CancelHandle,
    ) -> AuditResult<ScanOutcome> {
        let seed = validate_seed(seed_url)?;
        let started_at = Utc::now().to_rfc3339();

        info!("[Audit] Session {} starting against {}", session_id, seed);
        self.store.begin_session(session_id, &seed).await?;

        let session = Arc::new(ScanSession::new(session_id, Arc::clone(&self.store), cancel));
        let prober = Arc::new(FormProber::new(Arc::clone(&self.fetcher), &self.config));
        let mut crawler = Crawler::new(
            Arc::clone(&self.fetcher),
            prober,
            self.config.max_concurrency,
            self.config.max_pages,
        );

        let stats = match crawler.crawl(&seed, Arc::clone(&session)).await {
            Ok(stats) => stats,
            Err(e) => {
                error!("[Audit] Session {} failed: {}", session_id, e);
                if let Err(mark_error) = self.store.mark_status(session_id, ScanStatus::Error).await {
                    warn!("[Audit] Could not mark session {} as failed: {}", session_id, mark_error);
                }
                return Err(e);
            }
        };

        let findings = session.recorder().findings();
        let report = generate_summary_report(&findings);
        self.store.mark_status(session_id, ScanStatus::Success).await?;

        info!(
            "[Audit] Session {} complete: {} pages, {} findings",
            session_id,
            stats.pages_fetched,
            findings.len()
        );

        Ok(ScanOutcome {
            session_id: session_id.to_string(),
            seed_url: seed,
            status: ScanStatus::Success,
            crawled_urls: session.crawled_urls(),
            findings,
            report,
            started_at,
            completed_at: Utc::now().to_rfc3339(),
        })
    }
}

fn validate_config(config: &AuditConfig) -> AuditResult<()> {
    ConfigValidator::validate_audit_config(config)
        .map_err(|e| AuditError::Configuration(format!("{:#}", e)))
}

/// Absolute http(s) URL with a host, fragment stripped
fn validate_seed(seed_url: &str) -> AuditResult<String> {
    let mut parsed = Url::parse(seed_url.trim())
        .map_err(|e| AuditError::InvalidSeed(format!("{}: {}", seed_url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AuditError::InvalidSeed(format!(
            "{}: only http and https are supported",
            seed_url
        )));
    }
    if parsed.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(AuditError::InvalidSeed(format!("{}: missing host", seed_url)));
    }

    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seed() {
        assert_eq!(
            validate_seed("http://example.com#top").unwrap(),
            "http://example.com/"
        );
        assert!(matches!(validate_seed("ftp://example.com"), Err(AuditError::InvalidSeed(_))));
        assert!(matches!(validate_seed("not a url"), Err(AuditError::InvalidSeed(_))));
    }
}
