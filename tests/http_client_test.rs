// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Client Tests
 * Status passthrough, redirect handling, cookies and retry behaviour
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use formaudit::http_client::{FetchRequest, Fetcher, HttpClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::{
    matchers::{body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_get_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let url = format!("{}/test", &mock_server.uri());
    let response = client.fetch(FetchRequest::get(&url)).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "Success");
}

#[tokio::test]
async fn test_post_form_body_and_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=admin&password=admin"))
        .respond_with(ResponseTemplate::new(201).set_body_string("Created"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let url = format!("{}/login", &mock_server.uri());
    let response = client
        .fetch(FetchRequest::post_form(&url, "username=admin&password=admin"))
        .await
        .unwrap();

    assert_eq!(response.status_code, 201);
}

#[tokio::test]
async fn test_error_statuses_are_responses_not_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 3).unwrap();
    let url = format!("{}/limited", &mock_server.uri());
    let response = client.fetch(FetchRequest::get(&url)).await.unwrap();

    assert_eq!(response.status_code, 429);
    assert!(response.body.contains("Too many"));
}

#[tokio::test]
async fn test_redirects_are_not_followed_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/dashboard"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Dashboard"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let url = format!("{}/start", &mock_server.uri());

    let raw = client.fetch(FetchRequest::get(&url)).await.unwrap();
    assert!(raw.is_redirect());
    assert_eq!(raw.location().as_deref(), Some("/dashboard"));

    let followed = client
        .fetch(FetchRequest::get(&url).following_redirects())
        .await
        .unwrap();
    assert_eq!(followed.status_code, 200);
    assert_eq!(followed.body, "Dashboard");
}

#[tokio::test]
async fn test_every_set_cookie_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cookies"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "sessionid=abc; HttpOnly")
                .append_header("Set-Cookie", "theme=dark"),
        )
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let url = format!("{}/cookies", &mock_server.uri());
    let response = client.fetch(FetchRequest::get(&url)).await.unwrap();

    assert_eq!(response.set_cookies.len(), 2);
    assert!(response.set_cookies.iter().any(|c| c.starts_with("sessionid=")));
}

#[tokio::test]
async fn test_cookie_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .and(header("cookie", "token=abc.def."))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new(30, 0).unwrap();
    let url = format!("{}/account", &mock_server.uri());
    let response = client
        .fetch(FetchRequest::get(&url).with_cookie("token", "abc.def."))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let client = HttpClient::new(2, 0).unwrap();
    let result = client.fetch(FetchRequest::get("http://127.0.0.1:9/")).await;
    assert!(result.is_err());
}

/// Advertises a longer body than it sends, then hangs up
async fn spawn_truncating_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 4096\r\n\r\n<html><a href=\"/next\">")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/page", addr), connections)
}

#[tokio::test]
async fn test_truncated_body_is_retried_then_fails() {
    let (url, connections) = spawn_truncating_server().await;

    let client = HttpClient::new(5, 2).unwrap();
    let result = client.fetch(FetchRequest::get(&url)).await;

    assert!(result.is_err(), "a cut-off body must not pass as an empty page");
    assert_eq!(connections.load(Ordering::SeqCst), 3);
}
