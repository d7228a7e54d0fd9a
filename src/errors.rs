// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Audit Error Types
 * Run-level error handling with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can reach the caller of `run_audit`.
///
/// Malformed input and probe-target responses never surface here; probers
/// degrade those to "no finding" on their own.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Persistence collaborator failures (run-fatal)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Seed URL could not be parsed or is not http(s)
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    /// Operator terminated the run
    #[error("Audit cancelled: {reason}")]
    Cancelled { reason: String },

    /// General errors
    #[error("Audit error: {0}")]
    General(String),
}

/// Network-specific errors with detailed classification
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    #[error("Connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("Connection reset by peer for {url}")]
    ConnectionReset { url: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Network error: {0}")]
    Other(String),
}

/// Persistence collaborator errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Scan record for session {session_id} could not be created: {reason}")]
    SessionCreateFailed { session_id: String, reason: String },

    #[error("Unknown session {session_id}")]
    UnknownSession { session_id: String },

    #[error("Store write failed: {0}")]
    WriteFailed(String),
}

impl NetworkError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionTimeout { .. } => true,
            NetworkError::ConnectionReset { .. } => true,
            NetworkError::ConnectionRefused { .. } => true,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::Other(_) => false,
        }
    }
}

impl AuditError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AuditError::Network(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        AuditError::Cancelled {
            reason: reason.into(),
        }
    }
}

/// Convert reqwest errors to our error types
impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if err.is_timeout() {
            AuditError::Network(NetworkError::ConnectionTimeout {
                url,
                timeout: Duration::from_secs(30),
            })
        } else if err.is_connect() {
            AuditError::Network(NetworkError::ConnectionRefused { url })
        } else if err.is_request() || err.is_body() || err.is_decode() {
            AuditError::Network(NetworkError::ConnectionReset { url })
        } else if err.is_builder() {
            AuditError::Network(NetworkError::InvalidUrl { url })
        } else {
            AuditError::Network(NetworkError::Other(err.to_string()))
        }
    }
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
