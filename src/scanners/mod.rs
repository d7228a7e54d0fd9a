// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Form Probe Dispatch
 * Runs every applicable prober against one extracted form
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod auth_checks;
pub mod brute_force;
pub mod file_upload;
pub mod injection;
pub mod jwt;

use crate::config::AuditConfig;
use crate::detection::{cookie_name, cookie_value, looks_like_jwt};
use crate::forms::FormDescriptor;
use crate::http_client::{Fetcher, HttpMethod};
use crate::session::ScanSession;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use crate::url_utils::normalize;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub use auth_checks::AuthChecks;
pub use brute_force::{AttemptOutcome, BruteForceAttempt, BruteForceScanner};
pub use file_upload::FileUploadScanner;
pub use injection::InjectionScanner;
pub use jwt::JwtScanner;

/// Counters for one probed form
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStats {
    pub injection_submissions: usize,
    pub login_successes: usize,
    pub upload_submissions: usize,
}

/// Dispatches a form to the injection, brute-force, JWT and upload probers.
pub struct FormProber {
    injection: InjectionScanner,
    brute_force: BruteForceScanner,
    jwt: JwtScanner,
    upload: FileUploadScanner,
    enable_injection: bool,
    enable_brute_force: bool,
    enable_upload: bool,
}

impl FormProber {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &AuditConfig) -> Self {
        Self {
            injection: InjectionScanner::new(Arc::clone(&fetcher)),
            brute_force: BruteForceScanner::new(Arc::clone(&fetcher), config),
            jwt: JwtScanner::new(Arc::clone(&fetcher)),
            upload: FileUploadScanner::new(fetcher),
            enable_injection: config.enable_injection,
            enable_brute_force: config.enable_brute_force,
            enable_upload: config.enable_upload_probe,
        }
    }

    pub fn with_brute_force_scanner(mut self, scanner: BruteForceScanner) -> Self {
        self.brute_force = scanner;
        self
    }

    pub async fn probe_form(&self, form: &FormDescriptor, session: &ScanSession) -> Result<ProbeStats> {
        let recorder = session.recorder();
        let cancel = session.cancel_handle();
        let mut stats = ProbeStats::default();

        if form.method == HttpMethod::Post && !form.has_csrf_token {
            recorder
                .record(
                    FindingType::MissingCsrfToken,
                    &form.action_url,
                    format!("POST form on {} has no anti-CSRF token field", form.page_url),
                    FindingOptions::new(Confidence::Low, Severity::Medium),
                )
                .await?;
        }

        if self.enable_injection && !cancel.is_cancelled() {
            stats.injection_submissions = self
                .injection
                .submit_form_with_payloads(form, recorder, cancel)
                .await?;
        }

        if self.enable_brute_force && form.is_login_form && !cancel.is_cancelled() {
            let successes = self.brute_force.brute_force_login(form, recorder, cancel).await?;
            stats.login_successes = successes.len();

            for attempt in &successes {
                self.exploit_session_tokens(attempt, session).await?;
            }
        }

        if self.enable_upload && form.is_multipart() && !cancel.is_cancelled() {
            stats.upload_submissions = self.upload.probe_upload_form(form, recorder, cancel).await?;
        }

        Ok(stats)
    }

    /// Replay every JWT-looking cookie from a successful login as alg:none
    async fn exploit_session_tokens(&self, attempt: &BruteForceAttempt, session: &ScanSession) -> Result<()> {
        let target = attempt
            .location
            .as_deref()
            .and_then(|loc| normalize(loc, &attempt.target_url))
            .unwrap_or_else(|| attempt.target_url.clone());

        for raw in &attempt.set_cookies {
            let (Some(name), Some(value)) = (cookie_name(raw), cookie_value(raw)) else {
                continue;
            };
            if !looks_like_jwt(value) {
                continue;
            }
            if session.is_cancelled() {
                break;
            }

            debug!("[JWT] Session cookie '{}' from {} looks like a JWT", name, attempt.target_url);
            self.jwt
                .attempt_jwt_exploitation(value, &target, name, session.recorder())
                .await?;
        }

        Ok(())
    }
}
