// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::reporting::SummaryReport;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of finding produced by a prober.
///
/// Every kind has a stable snake_case wire name. Kinds this engine does not
/// produce itself are carried as `Other` so they can still be counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FindingType {
    PossibleInjectionResponse,
    InsecureCookie,
    DefaultOrWeakCreds,
    RateLimitDetected,
    CaptchaDetected,
    AccountLockoutDetected,
    NoRateLimitDetected,
    ProgressiveDelayDetected,
    InsecureTransport,
    CredentialsInUrl,
    PotentialInsecureReset,
    ImproperJwtHandling,
    MissingCsrfToken,
    FileUploadAccepted,
    FileUploadExposure,
    Other(String),
}

impl FindingType {
    pub fn as_str(&self) -> &str {
        match self {
            FindingType::PossibleInjectionResponse => "possible_injection_response",
            FindingType::InsecureCookie => "insecure_cookie",
            FindingType::DefaultOrWeakCreds => "default_or_weak_creds",
            FindingType::RateLimitDetected => "rate_limit_detected",
            FindingType::CaptchaDetected => "captcha_detected",
            FindingType::AccountLockoutDetected => "account_lockout_detected",
            FindingType::NoRateLimitDetected => "no_rate_limit_detected",
            FindingType::ProgressiveDelayDetected => "progressive_delay_detected",
            FindingType::InsecureTransport => "insecure_transport",
            FindingType::CredentialsInUrl => "credentials_in_url",
            FindingType::PotentialInsecureReset => "potential_insecure_reset",
            FindingType::ImproperJwtHandling => "improper_jwt_handling",
            FindingType::MissingCsrfToken => "missing_csrf_token",
            FindingType::FileUploadAccepted => "file_upload_accepted",
            FindingType::FileUploadExposure => "file_upload_exposure",
            FindingType::Other(name) => name.as_str(),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "possible_injection_response" => FindingType::PossibleInjectionResponse,
            "insecure_cookie" => FindingType::InsecureCookie,
            "default_or_weak_creds" => FindingType::DefaultOrWeakCreds,
            "rate_limit_detected" => FindingType::RateLimitDetected,
            "captcha_detected" => FindingType::CaptchaDetected,
            "account_lockout_detected" => FindingType::AccountLockoutDetected,
            "no_rate_limit_detected" => FindingType::NoRateLimitDetected,
            "progressive_delay_detected" => FindingType::ProgressiveDelayDetected,
            "insecure_transport" => FindingType::InsecureTransport,
            "credentials_in_url" => FindingType::CredentialsInUrl,
            "potential_insecure_reset" => FindingType::PotentialInsecureReset,
            "improper_jwt_handling" => FindingType::ImproperJwtHandling,
            "missing_csrf_token" => FindingType::MissingCsrfToken,
            "file_upload_accepted" => FindingType::FileUploadAccepted,
            "file_upload_exposure" => FindingType::FileUploadExposure,
            other => FindingType::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for FindingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FindingType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FindingType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(FindingType::from_name(&name))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Confidence and severity attached to a finding at record time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindingOptions {
    pub confidence: Confidence,
    pub severity: Severity,
}

impl FindingOptions {
    pub fn new(confidence: Confidence, severity: Severity) -> Self {
        Self {
            confidence,
            severity,
        }
    }
}

impl Default for FindingOptions {
    fn default() -> Self {
        Self {
            confidence: Confidence::Medium,
            severity: Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub url: String,
    pub detail: String,
    pub confidence: Confidence,
    pub severity: Severity,
    pub discovered_at: String,
}

/// Final status of one audit run as seen by the persistence collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Running,
    Success,
    Error,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Running => write!(f, "running"),
            ScanStatus::Success => write!(f, "success"),
            ScanStatus::Error => write!(f, "error"),
        }
    }
}

/// Result handed back to the caller of `run_audit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub session_id: String,
    pub seed_url: String,
    pub status: ScanStatus,
    pub crawled_urls: Vec<String>,
    pub findings: Vec<Finding>,
    pub report: SummaryReport,
    pub started_at: String,
    pub completed_at: String,
}
