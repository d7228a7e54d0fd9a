// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Upload Form Prober
 * Attaches a server-side script / active SVG to multipart forms and checks
 * whether the stored file is served or executed
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::forms::FormDescriptor;
use crate::http_client::{FetchRequest, Fetcher, HttpMethod};
use crate::payloads::{generate_marker, upload_payloads, UploadPayload};
use crate::recorder::FindingRecorder;
use crate::session::CancelHandle;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use crate::url_utils::normalize;
use anyhow::Result;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// Directories commonly used to serve uploads, relative to the site root
const UPLOAD_DIRS: &[&str] = &["/uploads/", "/upload/", "/files/", "/images/", "/media/"];

static UPLOAD_SUCCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)upload.*success|file.*uploaded|successfully.*saved|file.*accepted|"success":\s*true|"uploaded":\s*true"#,
    )
    .unwrap()
});

static UPLOAD_REJECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)not allowed|invalid file|file type|rejected|forbidden|too large|error").unwrap()
});

pub struct FileUploadScanner {
    fetcher: Arc<dyn Fetcher>,
}

impl FileUploadScanner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Upload each payload through `form` and look for the stored file.
    ///
    /// Returns the number of upload submissions that got a response.
    pub async fn probe_upload_form(
        &self,
        form: &FormDescriptor,
        recorder: &FindingRecorder,
        cancel: &CancelHandle,
    ) -> Result<usize> {
        let file_fields = form.file_fields();
        let Some(file_field) = file_fields.first().copied() else {
            return Ok(0);
        };

        let marker = generate_marker();
        let mut submissions = 0;

        for payload in upload_payloads(&marker) {
            if cancel.is_cancelled() {
                return Ok(submissions);
            }

            let boundary = format!("----FormAuditBoundary{:016x}", rand::rng().random::<u64>());
            let body = build_multipart_body(&boundary, &form.fill(&[]), file_field, &payload);
            let request = FetchRequest::new(HttpMethod::Post, &form.action_url)
                .with_header("Content-Type", format!("multipart/form-data; boundary={}", boundary))
                .with_body(body);

            let response = match self.fetcher.fetch(request).await {
                Ok(r) => r,
                Err(e) => {
                    debug!("[Upload] Submission to {} failed: {:#}", form.action_url, e);
                    continue;
                }
            };
            submissions += 1;

            if !is_upload_accepted(&response.body, response.status_code) {
                debug!("[Upload] {} rejected by {}", payload.filename, form.action_url);
                continue;
            }

            info!("[Upload] {} accepted by {}", payload.filename, form.action_url);
            recorder
                .record(
                    FindingType::FileUploadAccepted,
                    &form.action_url,
                    format!("Upload field '{}' accepted {}", file_field, extension(&payload.filename)),
                    FindingOptions::new(Confidence::Medium, Severity::Medium),
                )
                .await?;

            let candidates = candidate_locations(&response.body, &form.action_url, &payload.filename);
            for candidate in candidates {
                if cancel.is_cancelled() {
                    return Ok(submissions);
                }

                let served = match self.fetcher.fetch(FetchRequest::get(&candidate)).await {
                    Ok(r) if r.is_success() => r,
                    _ => continue,
                };

                let executed = served.body.contains(&payload.execution_proof)
                    && !payload.content.contains(&payload.execution_proof);

                if executed {
                    info!("[Upload] {} executed at {}", payload.filename, candidate);
                    recorder
                        .record(
                            FindingType::FileUploadExposure,
                            &candidate,
                            format!("Uploaded {} file is executed by the server", extension(&payload.filename)),
                            FindingOptions::new(Confidence::High, Severity::Critical),
                        )
                        .await?;
                    break;
                }

                if served.body.contains(&payload.raw_proof) {
                    info!("[Upload] {} served verbatim at {}", payload.filename, candidate);
                    recorder
                        .record(
                            FindingType::FileUploadExposure,
                            &candidate,
                            format!("Uploaded {} file is publicly served from the web root", extension(&payload.filename)),
                            FindingOptions::new(Confidence::High, Severity::High),
                        )
                        .await?;
                    break;
                }
            }
        }

        Ok(submissions)
    }
}

fn extension(filename: &str) -> &str {
    filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or(filename)
}

/// 2xx (or a 3xx back to a page) without rejection text, or explicit success text
pub fn is_upload_accepted(body: &str, status: u16) -> bool {
    if UPLOAD_SUCCESS.is_match(body) {
        return true;
    }
    (200..400).contains(&status) && !UPLOAD_REJECTED.is_match(body)
}

/// Where the stored file may be served: a path disclosed by the upload
/// response wins; common upload directories are only guessed without one.
pub fn candidate_locations(body: &str, action_url: &str, filename: &str) -> Vec<String> {
    let disclosed = Regex::new(&format!(r#"[\w./:-]*{}"#, regex::escape(filename)))
        .ok()
        .map(|re| {
            re.find_iter(body)
                .filter_map(|m| normalize(m.as_str(), action_url))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if !disclosed.is_empty() {
        let mut unique = Vec::new();
        for url in disclosed {
            if !unique.contains(&url) {
                unique.push(url);
            }
        }
        return unique;
    }

    let mut guesses: Vec<String> = UPLOAD_DIRS
        .iter()
        .filter_map(|dir| normalize(&format!("{}{}", dir, filename), action_url))
        .collect();
    if let Some(relative) = normalize(&format!("uploads/{}", filename), action_url) {
        if !guesses.contains(&relative) {
            guesses.push(relative);
        }
    }
    guesses
}

/// `multipart/form-data` body with every data field plus the file part
pub fn build_multipart_body(
    boundary: &str,
    fields: &[(String, String)],
    file_field: &str,
    payload: &UploadPayload,
) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    body.push_str(&format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n--{}--\r\n",
        boundary, file_field, payload.filename, payload.content_type, payload.content, boundary
    ));
    body
}
