// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Collaborator
 * Pluggable fetch boundary used by the crawler and every prober
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::AuditConfig;
use crate::errors::AuditResult;
use crate::retry::{retry_with_backoff, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Realistic browser User-Agent used when none is configured
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_POOL_IDLE_PER_HOST: usize = 16;
const DEFAULT_MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request.
///
/// Redirects are not followed unless `follow_redirects` is set, so probers
/// can inspect raw 3xx `Location` headers.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
}

impl FetchRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
            follow_redirects: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    /// POST with an `application/x-www-form-urlencoded` body
    pub fn post_form(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        self.with_header("Cookie", format!("{}={}", name, value))
    }

    pub fn following_redirects(mut self) -> Self {
        self.follow_redirects = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Lowercase header name to value; repeated headers are comma-joined
    pub headers: HashMap<String, String>,
    /// Every raw `Set-Cookie` value, in arrival order
    pub set_cookies: Vec<String>,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_lowercase()).cloned()
    }

    pub fn location(&self) -> Option<String> {
        self.header("location")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }
}

/// The HTTP boundary every crawl step and probe submission goes through.
///
/// Implementations must return non-2xx statuses as ordinary responses and
/// only fail on transport errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, request: FetchRequest) -> Result<HttpResponse> {
        (**self).fetch(request).await
    }
}

/// reqwest-backed fetcher with per-request timeout and bounded retry.
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    redirect_client: Arc<Client>,
    retry: RetryConfig,
    max_body_size: usize,
}

impl HttpClient {
    pub fn new(timeout_secs: u64, max_retries: u32) -> Result<Self> {
        Self::with_options(timeout_secs, max_retries, None, false)
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::with_options(
            config.request_timeout_secs,
            config.max_retries,
            config.user_agent.as_deref(),
            config.accept_invalid_certs,
        )
    }

    pub fn with_options(
        timeout_secs: u64,
        max_retries: u32,
        user_agent: Option<&str>,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        if accept_invalid_certs {
            warn!("Certificate validation is DISABLED - only use against test targets");
        }

        let user_agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
        let timeout = Duration::from_secs(timeout_secs);

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(user_agent)
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        let redirect_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS))
            .user_agent(user_agent)
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .build()
            .context("Failed to create redirect-following HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            redirect_client: Arc::new(redirect_client),
            retry: RetryConfig::with_retries(max_retries),
            max_body_size: MAX_BODY_SIZE,
        })
    }

    async fn send_once(&self, request: &FetchRequest) -> AuditResult<HttpResponse> {
        let client = if request.follow_redirects {
            &self.redirect_client
        } else {
            &self.client
        };

        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .unwrap_or(reqwest::Method::GET);

        let mut builder = client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status_code = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::with_capacity(response.headers().len());
        let mut set_cookies = Vec::new();
        for (name, value) in response.headers().iter() {
            let Ok(value) = value.to_str() else { continue };
            if name == reqwest::header::SET_COOKIE {
                set_cookies.push(value.to_string());
            }
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        // Read body with size limit; a broken body is retried like a failed send
        let body_bytes = response.bytes().await?;
        let body = if body_bytes.len() > self.max_body_size {
            String::from_utf8_lossy(&body_bytes[..self.max_body_size]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        Ok(HttpResponse {
            status_code,
            body,
            headers,
            set_cookies,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, request: FetchRequest) -> Result<HttpResponse> {
        let operation = format!("{} {}", request.method, request.url);
        let response = retry_with_backoff(&self.retry, &operation, || self.send_once(&request))
            .await
            .with_context(|| format!("Request failed: {}", operation))?;

        debug!(
            "{} -> {} ({} ms)",
            operation, response.status_code, response.duration_ms
        );

        Ok(response)
    }
}

/// Encode key/value pairs as an `application/x-www-form-urlencoded` body
pub fn encode_form_data(data: &[(String, String)]) -> String {
    data.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
