// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-run scan state: visited set, tested forms, crawled-URL list, finding
//! recorder and cancellation flag. One `ScanSession` per `run_audit` call; nothing here
//! is process-global.

use crate::errors::StoreError;
use crate::forms::FormDescriptor;
use crate::recorder::FindingRecorder;
use crate::store::ScanStore;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared with the operator.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ScanSession {
    session_id: String,
    store: Arc<dyn ScanStore>,
    recorder: FindingRecorder,
    visited: Mutex<HashSet<String>>,
    probed_forms: Mutex<HashSet<String>>,
    crawled_urls: Mutex<Vec<String>>,
    cancel: CancelHandle,
}

impl ScanSession {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn ScanStore>, cancel: CancelHandle) -> Self {
        let session_id = session_id.into();
        Self {
            recorder: FindingRecorder::new(session_id.clone(), Arc::clone(&store)),
            session_id,
            store,
            visited: Mutex::new(HashSet::new()),
            probed_forms: Mutex::new(HashSet::new()),
            crawled_urls: Mutex::new(Vec::new()),
            cancel,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn recorder(&self) -> &FindingRecorder {
        &self.recorder
    }

    pub fn store(&self) -> &Arc<dyn ScanStore> {
        &self.store
    }

    pub fn cancel_handle(&self) -> &CancelHandle {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Claim `url` for fetching. Returns false if it was already claimed.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.visited.lock().insert(url.to_string())
    }

    /// Claim `form` for testing. A form already seen on another page
    /// returns false.
    pub fn claim_form(&self, form: &FormDescriptor) -> bool {
        self.probed_forms.lock().insert(form.identity_key())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.lock().len()
    }

    /// Append a successfully fetched page to the crawled list and the store
    pub async fn record_crawled(&self, url: &str) -> Result<(), StoreError> {
        self.crawled_urls.lock().push(url.to_string());
        self.store.append_crawled_url(&self.session_id, url).await
    }

    pub fn crawled_urls(&self) -> Vec<String> {
        self.crawled_urls.lock().clone()
    }
}
