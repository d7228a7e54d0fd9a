// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Upload Prober Tests
 * Acceptance, execution and verbatim exposure of uploaded payloads
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod common;

use common::{recorder_with_store, response, ScriptedFetcher};
use formaudit::forms::{extract_forms, FormDescriptor};
use formaudit::http_client::{FetchRequest, HttpMethod};
use formaudit::scanners::FileUploadScanner;
use formaudit::session::CancelHandle;
use formaudit::types::{FindingType, Severity};

const AVATAR_PAGE: &str = r#"
    <form method="post" action="/account/upload" enctype="multipart/form-data">
        <input type="hidden" name="csrf_token" value="abc123">
        <input type="file" name="avatar">
        <input type="submit" value="Upload">
    </form>
"#;

fn avatar_form() -> FormDescriptor {
    let form = extract_forms(AVATAR_PAGE, "http://example.com/account").remove(0);
    assert!(form.is_multipart());
    form
}

fn uploaded_filename(request: &FetchRequest) -> Option<String> {
    let body = request.body.as_deref()?;
    let start = body.find("filename=\"")? + "filename=\"".len();
    let end = body[start..].find('"')?;
    Some(body[start..start + end].to_string())
}

/// Accepts anything, discloses `/files/<name>` and executes PHP there
fn executing_server(request: &FetchRequest) -> formaudit::http_client::HttpResponse {
    if request.method == HttpMethod::Post {
        return match uploaded_filename(request) {
            Some(name) => response(200, &format!("File uploaded: <a href=\"/files/{0}\">{0}</a>", name)),
            None => response(400, "Missing file"),
        };
    }

    let name = request.url.rsplit('/').next().unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, "php")) => response(200, &stem.chars().rev().collect::<String>()),
        Some((stem, "svg")) => response(
            200,
            &format!("<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert('{}')</script></svg>", stem),
        ),
        _ => response(404, "Not found"),
    }
}

#[tokio::test]
async fn test_executed_and_served_uploads_are_reported() {
    let fetcher = ScriptedFetcher::new(executing_server);
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    let submissions = FileUploadScanner::new(fetcher.clone())
        .probe_upload_form(&avatar_form(), &recorder, &CancelHandle::new())
        .await
        .unwrap();

    assert_eq!(submissions, 2);
    assert_eq!(recorder.count_of(&FindingType::FileUploadAccepted), 2);

    let exposures: Vec<_> = recorder
        .findings()
        .into_iter()
        .filter(|f| f.finding_type == FindingType::FileUploadExposure)
        .collect();
    assert_eq!(exposures.len(), 2);

    let php = exposures.iter().find(|f| f.url.ends_with(".php")).unwrap();
    assert_eq!(php.severity, Severity::Critical);
    assert!(php.url.starts_with("http://example.com/files/"));

    let svg = exposures.iter().find(|f| f.url.ends_with(".svg")).unwrap();
    assert_eq!(svg.severity, Severity::High);

    // Disclosed location is used; no guessed directories are fetched
    assert_eq!(
        fetcher.count_matching(|r| r.method == HttpMethod::Get && r.url.contains("/uploads/")),
        0
    );

    let posts = fetcher.requests().into_iter().filter(|r| r.method == HttpMethod::Post);
    for post in posts {
        let body = post.body.unwrap_or_default();
        assert!(body.contains("name=\"csrf_token\"\r\n\r\nabc123"));
        assert!(post
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v.starts_with("multipart/form-data; boundary=")));
    }
}

#[tokio::test]
async fn test_rejected_upload_records_nothing() {
    let fetcher = ScriptedFetcher::new(|request| {
        if request.method == HttpMethod::Post {
            response(200, "Error: file type not allowed")
        } else {
            response(404, "")
        }
    });
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    FileUploadScanner::new(fetcher.clone())
        .probe_upload_form(&avatar_form(), &recorder, &CancelHandle::new())
        .await
        .unwrap();

    assert!(recorder.is_empty());
    assert_eq!(fetcher.count_matching(|r| r.method == HttpMethod::Get), 0);
}

#[tokio::test]
async fn test_accepted_but_unreachable_upload_is_medium() {
    let fetcher = ScriptedFetcher::new(|request| {
        if request.method == HttpMethod::Post {
            response(200, "OK")
        } else {
            response(404, "")
        }
    });
    let (recorder, _store) = recorder_with_store("http://example.com/").await;

    FileUploadScanner::new(fetcher.clone())
        .probe_upload_form(&avatar_form(), &recorder, &CancelHandle::new())
        .await
        .unwrap();

    assert_eq!(recorder.count_of(&FindingType::FileUploadAccepted), 2);
    assert_eq!(recorder.count_of(&FindingType::FileUploadExposure), 0);
    // Without a disclosed path the common upload directories are tried
    assert!(fetcher.count_matching(|r| r.url.contains("/uploads/")) >= 2);
}
