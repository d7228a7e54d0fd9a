// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Transport Check Tests
 * HTTPS enforcement over HEAD: plain HTTP, redirects and dead endpoints
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod common;

use common::{recorder_with_store, response, response_with_headers, ScriptedFetcher};
use formaudit::http_client::HttpMethod;
use formaudit::scanners::AuthChecks;
use formaudit::types::{Confidence, FindingType, Severity};

#[tokio::test]
async fn test_unanswered_head_is_medium_confidence() {
    let fetcher = ScriptedFetcher::fallible(|_| Err(anyhow::anyhow!("connection reset by peer")));
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    AuthChecks::new(fetcher.clone())
        .check_https("http://example.com/", &recorder)
        .await
        .unwrap();

    let findings = recorder.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].finding_type, FindingType::InsecureTransport);
    assert_eq!(findings[0].confidence, Confidence::Medium);
    assert_eq!(findings[0].severity, Severity::High);
    assert_eq!(fetcher.count_matching(|r| r.method == HttpMethod::Head), 1);
}

#[tokio::test]
async fn test_plain_http_without_redirect_is_high_confidence() {
    let fetcher = ScriptedFetcher::new(|_| response(200, ""));
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    AuthChecks::new(fetcher)
        .check_https("http://example.com/login", &recorder)
        .await
        .unwrap();

    let findings = recorder.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].confidence, Confidence::High);
    assert_eq!(findings[0].url, "http://example.com/login");
}

#[tokio::test]
async fn test_redirect_to_https_records_nothing() {
    let fetcher = ScriptedFetcher::new(|_| {
        response_with_headers(301, "", &[("Location", "https://example.com/")])
    });
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    AuthChecks::new(fetcher.clone())
        .check_https("http://example.com/", &recorder)
        .await
        .unwrap();

    assert!(recorder.is_empty());
    assert_eq!(fetcher.requests().len(), 1);
}

#[tokio::test]
async fn test_redirect_to_plain_http_is_still_insecure() {
    let fetcher = ScriptedFetcher::new(|_| {
        response_with_headers(302, "", &[("Location", "http://www.example.com/")])
    });
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    AuthChecks::new(fetcher)
        .check_https("http://example.com/", &recorder)
        .await
        .unwrap();

    assert_eq!(recorder.count_of(&FindingType::InsecureTransport), 1);
}

#[tokio::test]
async fn test_https_page_sends_no_request() {
    let fetcher = ScriptedFetcher::fallible(|_| Err(anyhow::anyhow!("must not be called")));
    let (recorder, _store) = recorder_with_store("https://example.com/").await;

    AuthChecks::new(fetcher.clone())
        .check_https("https://example.com/account", &recorder)
        .await
        .unwrap();

    assert!(recorder.is_empty());
    assert!(fetcher.requests().is_empty());
}
