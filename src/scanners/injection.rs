// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Form Injection Prober
 * Injects SQLi, parameter tampering and XSS payloads into one field at a
 * time and inspects the response for executed markers or live reflections
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::detection::{
    detect_sql_error_message, detect_sql_error_shape, detect_sql_marker, detect_xss_reflection,
};
use crate::forms::FormDescriptor;
use crate::http_client::Fetcher;
use crate::payloads::{generate_marker, injection_battery, Payload, PayloadKind};
use crate::recorder::FindingRecorder;
use crate::session::CancelHandle;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use anyhow::Result;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info};

pub struct InjectionScanner {
    fetcher: Arc<dyn Fetcher>,
}

impl InjectionScanner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Probe every data field of `form` with the full payload battery.
    ///
    /// Returns the number of submissions that got a response.
    pub async fn submit_form_with_payloads(
        &self,
        form: &FormDescriptor,
        recorder: &FindingRecorder,
        cancel: &CancelHandle,
    ) -> Result<usize> {
        let fields = form.injectable_fields();
        if fields.is_empty() {
            return Ok(0);
        }

        let marker = generate_marker();
        let battery = injection_battery(&marker);
        let mut submissions = 0;

        info!(
            "[Injection] Probing {} {} ({} fields x {} payloads)",
            form.method,
            form.action_url,
            fields.len(),
            battery.len()
        );

        for field in fields {
            for payload in &battery {
                if cancel.is_cancelled() {
                    debug!("[Injection] Cancelled while probing {}", form.action_url);
                    return Ok(submissions);
                }

                let values = form.fill(&[(field, payload.value.as_str())]);
                let request = form.build_request(&values);

                let response = match self.fetcher.fetch(request).await {
                    Ok(r) => r,
                    Err(e) => {
                        debug!("[Injection] Submission to {} failed: {:#}", form.action_url, e);
                        continue;
                    }
                };
                submissions += 1;

                let patterns = analyze_response(&response.body, payload, &marker);
                if patterns.is_empty() {
                    continue;
                }

                let confidence = if patterns.len() > 1 {
                    Confidence::High
                } else {
                    Confidence::Medium
                };

                recorder
                    .record(
                        FindingType::PossibleInjectionResponse,
                        &form.action_url,
                        format!(
                            "{} field '{}' triggered {} with a {} payload",
                            form.method,
                            field,
                            patterns.join("+"),
                            payload.kind.as_str()
                        ),
                        FindingOptions::new(confidence, Severity::High),
                    )
                    .await?;
            }
        }

        Ok(submissions)
    }
}

/// Detector names that fired for one response
pub fn analyze_response(body: &str, payload: &Payload, marker: &str) -> Vec<&'static str> {
    let mut patterns = Vec::new();

    match payload.kind {
        PayloadKind::SqlInjection => {
            if detect_sql_marker(body, &payload.value, marker) {
                patterns.push("sql_marker");
            }
            if body.contains(marker) {
                let document = Html::parse_document(body);
                if detect_sql_error_shape(&document, &payload.value, marker) {
                    patterns.push("sql_error_shape");
                }
            }
        }
        PayloadKind::ParameterTampering => {
            if detect_sql_error_message(body) {
                patterns.push("sql_error_message");
            }
        }
        PayloadKind::Xss => {
            if body.contains(&payload.value) {
                let document = Html::parse_document(body);
                if let Some(variant) = detect_xss_reflection(body, &document, &payload.value, marker) {
                    patterns.push(match variant {
                        "script" => "xss_script",
                        "img-onerror" => "xss_img_onerror",
                        "svg-onload" => "xss_svg_onload",
                        "iframe-javascript" => "xss_iframe",
                        "anchor-javascript" => "xss_anchor",
                        _ => "xss_html",
                    });
                }
            }
        }
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(kind: PayloadKind, value: &str) -> Payload {
        Payload {
            kind,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_combined_sql_detectors() {
        let marker = "faabc123def456";
        let p = payload(PayloadKind::SqlInjection, &format!("' UNION SELECT '{}'-- -", marker));
        let body = format!("<pre>id: 1 | name: {} |</pre>", marker);

        assert_eq!(analyze_response(&body, &p, marker), vec!["sql_marker", "sql_error_shape"]);
    }

    #[test]
    fn test_literal_reflection_is_quiet() {
        let marker = "faabc123def456";
        let p = payload(PayloadKind::SqlInjection, &format!("' UNION SELECT '{}'-- -", marker));
        let body = format!("<p>You searched for {}</p>", p.value);

        assert!(analyze_response(&body, &p, marker).is_empty());
    }

    #[test]
    fn test_echo_beside_form_label_is_quiet() {
        let marker = "faabc123def456";
        let p = payload(PayloadKind::SqlInjection, &format!("' UNION SELECT '{}'-- -", marker));
        let body = format!(
            "<div><label>Name:</label><p>You searched for {}</p></div>",
            p.value
        );

        assert!(analyze_response(&body, &p, marker).is_empty());
    }

    #[test]
    fn test_xss_reflection_pattern() {
        let marker = "faabc123def456";
        let p = payload(PayloadKind::Xss, &format!("<script>alert('{}')</script>", marker));
        let body = format!("<html><body>Hello {}</body></html>", p.value);

        assert_eq!(analyze_response(&body, &p, marker), vec!["xss_script"]);
    }

    #[test]
    fn test_tampering_error_message() {
        let p = payload(PayloadKind::ParameterTampering, "-1");
        let body = "<b>Warning</b>: You have an error in your SQL syntax near '-1'";
        assert_eq!(analyze_response(body, &p, "unused"), vec!["sql_error_message"]);
    }
}
