// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod validation;

pub use self::core::AuditConfig;
pub use self::validation::ConfigValidator;

use anyhow::Result;

impl AuditConfig {
    /// Load configuration from environment variables with sensible defaults
    ///
    /// Supports the following environment variables:
    /// - AUDIT_MAX_CONCURRENCY: Maximum simultaneous page fetches
    /// - AUDIT_MAX_RETRIES: Retries per request on transient failure
    /// - AUDIT_TIMEOUT_SECS: Per-request timeout
    /// - AUDIT_MAX_PAGES: Crawl page bound (0 = unbounded)
    /// - AUDIT_USER_AGENT: User-Agent override
    /// - ACCEPT_INVALID_CERTS: Disable TLS certificate validation
    pub fn from_env() -> Result<Self> {
        let mut config = AuditConfig::default();

        if let Ok(concurrency) = std::env::var("AUDIT_MAX_CONCURRENCY") {
            config.max_concurrency = concurrency
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid AUDIT_MAX_CONCURRENCY value"))?;
        }

        if let Ok(retries) = std::env::var("AUDIT_MAX_RETRIES") {
            config.max_retries = retries
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid AUDIT_MAX_RETRIES value"))?;
        }

        if let Ok(timeout) = std::env::var("AUDIT_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid AUDIT_TIMEOUT_SECS value"))?;
        }

        if let Ok(pages) = std::env::var("AUDIT_MAX_PAGES") {
            config.max_pages = pages
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid AUDIT_MAX_PAGES value"))?;
        }

        if let Ok(user_agent) = std::env::var("AUDIT_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }

        config.accept_invalid_certs = std::env::var("ACCEPT_INVALID_CERTS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        ConfigValidator::validate_audit_config(&config)?;

        Ok(config)
    }
}
