// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared fixtures: a scripted in-process fetcher and a store that fails
//! on demand.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use formaudit::config::AuditConfig;
use formaudit::errors::StoreError;
use formaudit::http_client::{FetchRequest, Fetcher, HttpResponse};
use formaudit::recorder::FindingRecorder;
use formaudit::store::{MemoryStore, ScanStore};
use formaudit::types::{Finding, ScanStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type Handler = dyn Fn(&FetchRequest) -> Result<HttpResponse> + Send + Sync;
type Delay = dyn Fn(usize) -> Duration + Send + Sync;

/// Answers every request through a closure and keeps a log of what was sent
pub struct ScriptedFetcher {
    handler: Box<Handler>,
    delay: Option<Box<Delay>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&FetchRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self::fallible(move |request| Ok(handler(request)))
    }

    /// Handler may fail the request the way a dead connection would
    pub fn fallible<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&FetchRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            delay: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Sleeps `delay(n)` before answering the n-th request (zero-based)
    pub fn slowing<F, D>(handler: F, delay: D) -> Arc<Self>
    where
        F: Fn(&FetchRequest) -> HttpResponse + Send + Sync + 'static,
        D: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(move |request| Ok(handler(request))),
            delay: Some(Box::new(delay)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    pub fn count_matching(&self, predicate: impl Fn(&FetchRequest) -> bool) -> usize {
        self.requests.lock().iter().filter(|r| predicate(r)).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<HttpResponse> {
        let wait = {
            let sent = self.requests.lock().len();
            self.delay.as_ref().map(|delay| delay(sent))
        };
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }

        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}

pub fn response(status_code: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        body: body.to_string(),
        ..Default::default()
    }
}

pub fn response_with_headers(status_code: u16, body: &str, headers: &[(&str, &str)]) -> HttpResponse {
    let mut map = HashMap::new();
    let mut set_cookies = Vec::new();
    for (name, value) in headers {
        let name = name.to_ascii_lowercase();
        if name == "set-cookie" {
            set_cookies.push(value.to_string());
        }
        map.insert(name, value.to_string());
    }
    HttpResponse {
        status_code,
        body: body.to_string(),
        headers: map,
        set_cookies,
        duration_ms: 1,
    }
}

/// Decoded form body of a POST, or the query of a GET
pub fn submitted_pairs(request: &FetchRequest) -> HashMap<String, String> {
    let raw = match &request.body {
        Some(body) => body.clone(),
        None => url::Url::parse(&request.url)
            .ok()
            .and_then(|u| u.query().map(str::to_string))
            .unwrap_or_default(),
    };
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

pub async fn recorder_with_store(seed: &str) -> (FindingRecorder, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .begin_session("test-session", seed)
        .await
        .expect("session should open");
    let recorder = FindingRecorder::new("test-session", Arc::clone(&store) as Arc<dyn ScanStore>);
    (recorder, store)
}

/// Small credential matrix so scripted runs stay short
pub fn test_config() -> AuditConfig {
    AuditConfig {
        max_concurrency: 4,
        max_retries: 0,
        request_timeout_secs: 5,
        usernames: vec!["admin".to_string(), "test".to_string(), "user".to_string()],
        passwords: vec![
            "admin".to_string(),
            "password".to_string(),
            "123456".to_string(),
            "test".to_string(),
        ],
        ..AuditConfig::default()
    }
}

/// Delegates to a `MemoryStore` until the configured operation is reached
pub struct FailingStore {
    inner: MemoryStore,
    fail_on_finding: bool,
    fail_on_url: bool,
    statuses: Mutex<Vec<ScanStatus>>,
}

impl FailingStore {
    pub fn failing_findings() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_on_finding: true,
            fail_on_url: false,
            statuses: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_urls() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_on_finding: false,
            fail_on_url: true,
            statuses: Mutex::new(Vec::new()),
        })
    }

    pub fn statuses(&self) -> Vec<ScanStatus> {
        self.statuses.lock().clone()
    }
}

#[async_trait]
impl ScanStore for FailingStore {
    async fn begin_session(&self, session_id: &str, seed_url: &str) -> Result<(), StoreError> {
        self.inner.begin_session(session_id, seed_url).await
    }

    async fn append_crawled_url(&self, session_id: &str, url: &str) -> Result<(), StoreError> {
        if self.fail_on_url {
            return Err(StoreError::WriteFailed("crawled url rejected".to_string()));
        }
        self.inner.append_crawled_url(session_id, url).await
    }

    async fn append_finding(&self, session_id: &str, finding: &Finding) -> Result<(), StoreError> {
        if self.fail_on_finding {
            return Err(StoreError::WriteFailed("finding rejected".to_string()));
        }
        self.inner.append_finding(session_id, finding).await
    }

    async fn mark_status(&self, session_id: &str, status: ScanStatus) -> Result<(), StoreError> {
        self.statuses.lock().push(status);
        self.inner.mark_status(session_id, status).await
    }
}
