// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Form Audit Library
 * Unauthenticated crawl + form probing engine
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod crawler;
pub mod detection;
pub mod forms;
pub mod payloads;
pub mod recorder;
pub mod reporting;
pub mod session;
pub mod store;
pub mod types;
pub mod url_utils;

// Scanner modules
pub mod scanners;
pub mod http_client;

// Production error handling and resilience modules
pub mod errors;
pub mod retry;

// Audit entry point
pub mod engine;

pub use config::AuditConfig;
pub use engine::AuditEngine;
pub use errors::{AuditError, AuditResult};
pub use http_client::{FetchRequest, Fetcher, HttpClient, HttpMethod, HttpResponse};
pub use session::CancelHandle;
pub use store::{MemoryStore, ScanStore};
pub use types::{Finding, FindingType, ScanOutcome, ScanStatus};
