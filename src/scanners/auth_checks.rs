// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Auth & Transport Checks
 * Per-page HTTPS enforcement, credentials in URLs, password reset routes
 * and session cookie flags
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::detection::{cookie_name, is_session_cookie_name};
use crate::errors::StoreError;
use crate::http_client::{FetchRequest, Fetcher};
use crate::recorder::FindingRecorder;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use crate::url_utils::is_localhost;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

const SENSITIVE_PARAM_FRAGMENTS: &[&str] = &["token", "session", "auth", "passwd", "password"];

pub struct AuthChecks {
    fetcher: Arc<dyn Fetcher>,
}

impl AuthChecks {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Run every URL-level check for a freshly crawled page
    pub async fn check_page(
        &self,
        url: &str,
        set_cookies: &[String],
        recorder: &FindingRecorder,
    ) -> Result<(), StoreError> {
        self.check_https(url, recorder).await?;
        check_credentials_in_url(url, recorder).await?;
        check_for_password_reset(url, recorder).await?;
        check_cookies_for_security_flags(set_cookies, url, recorder).await?;
        Ok(())
    }

    /// Plain-HTTP URL must redirect to HTTPS. A failed HEAD is still a finding.
    pub async fn check_https(&self, url: &str, recorder: &FindingRecorder) -> Result<(), StoreError> {
        if url.to_ascii_lowercase().starts_with("https://") {
            return Ok(());
        }

        match self.fetcher.fetch(FetchRequest::head(url)).await {
            Ok(response) => {
                let redirects_to_https = response
                    .location()
                    .map(|l| l.trim().to_ascii_lowercase().starts_with("https://"))
                    .unwrap_or(false);

                if !redirects_to_https {
                    info!("[Transport] {} is served over plain HTTP", url);
                    recorder
                        .record(
                            FindingType::InsecureTransport,
                            url,
                            "Site is reachable over HTTP without a redirect to HTTPS",
                            FindingOptions::new(Confidence::High, Severity::High),
                        )
                        .await?;
                }
            }
            Err(e) => {
                debug!("[Transport] HEAD {} failed: {:#}", url, e);
                recorder
                    .record(
                        FindingType::InsecureTransport,
                        url,
                        "HTTP endpoint did not answer a HEAD probe; HTTPS enforcement could not be confirmed",
                        FindingOptions::new(Confidence::Medium, Severity::High),
                    )
                    .await?;
            }
        }

        Ok(())
    }
}

/// One finding per query parameter whose key or value looks like a secret
pub async fn check_credentials_in_url(url: &str, recorder: &FindingRecorder) -> Result<(), StoreError> {
    let Ok(parsed) = Url::parse(url) else {
        return Ok(());
    };

    for (key, value) in parsed.query_pairs() {
        let key_lower = key.to_lowercase();
        let value_lower = value.to_lowercase();
        let sensitive = SENSITIVE_PARAM_FRAGMENTS
            .iter()
            .any(|s| key_lower.contains(s) || value_lower.contains(s));

        if sensitive {
            recorder
                .record(
                    FindingType::CredentialsInUrl,
                    url,
                    format!("Query parameter '{}' appears to carry credentials or a session token", key),
                    FindingOptions::new(Confidence::Medium, Severity::High),
                )
                .await?;
        }
    }

    Ok(())
}

/// Routing heuristic only; reset-token strength is not assessed
pub async fn check_for_password_reset(url: &str, recorder: &FindingRecorder) -> Result<(), StoreError> {
    let Ok(parsed) = Url::parse(url) else {
        return Ok(());
    };

    let path = parsed.path().to_lowercase();
    if path.contains("forgot") || path.contains("reset") {
        recorder
            .record(
                FindingType::PotentialInsecureReset,
                url,
                format!("Password reset route {} should be reviewed manually", parsed.path()),
                FindingOptions::new(Confidence::Low, Severity::Medium),
            )
            .await?;
    }

    Ok(())
}

/// Flags missing `Secure` (skipped on localhost) and `HttpOnly` on
/// session-looking cookies.
pub async fn check_cookies_for_security_flags(
    set_cookies: &[String],
    url: &str,
    recorder: &FindingRecorder,
) -> Result<(), StoreError> {
    let local = is_localhost(url);

    for raw in set_cookies {
        let Some(name) = cookie_name(raw) else { continue };
        if !is_session_cookie_name(name) {
            continue;
        }

        let missing = missing_cookie_flags(raw, local);
        if missing.is_empty() {
            continue;
        }

        recorder
            .record(
                FindingType::InsecureCookie,
                url,
                format!("Cookie '{}' is missing {}", name, missing.join(" and ")),
                FindingOptions::new(Confidence::High, Severity::Medium),
            )
            .await?;
    }

    Ok(())
}

fn missing_cookie_flags(set_cookie: &str, skip_secure: bool) -> Vec<&'static str> {
    let attributes: Vec<String> = set_cookie
        .split(';')
        .skip(1)
        .map(|attr| attr.trim().to_ascii_lowercase())
        .collect();
    let has = |flag: &str| attributes.iter().any(|a| a == flag);

    let mut missing = Vec::new();
    if !skip_secure && !has("secure") {
        missing.push("Secure");
    }
    if !has("httponly") {
        missing.push("HttpOnly");
    }
    missing
}
