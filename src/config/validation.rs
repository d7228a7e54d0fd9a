// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::AuditConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_audit_config(config: &AuditConfig) -> Result<()> {
        config
            .validate()
            .context("Configuration validation failed")?;

        Self::validate_credentials(config)?;

        Ok(())
    }

    fn validate_credentials(config: &AuditConfig) -> Result<()> {
        if config.usernames.iter().any(|u| u.trim().is_empty()) {
            return Err(anyhow::anyhow!("Usernames in the credential list cannot be blank"));
        }

        if config.passwords.iter().any(|p| p.is_empty()) {
            return Err(anyhow::anyhow!("Passwords in the credential list cannot be empty"));
        }

        Ok(())
    }
}
