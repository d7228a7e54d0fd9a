// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Login Brute-Force Prober
 * Small credential matrix against login-like forms with rate-limit,
 * lockout, CAPTCHA and progressive-delay detection
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::config::AuditConfig;
use crate::detection::{
    score_login_response, CaptchaDetector, LockoutDetector, MarkupCaptchaDetector,
    PhraseLockoutDetector,
};
use crate::forms::FormDescriptor;
use crate::http_client::{encode_form_data, Fetcher, HttpMethod};
use crate::recorder::FindingRecorder;
use crate::scanners::auth_checks::check_cookies_for_security_flags;
use crate::session::CancelHandle;
use crate::types::{Confidence, FindingOptions, FindingType, Severity};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum timing samples before progressive delay is evaluated
const MIN_TIMING_SAMPLES: usize = 6;

/// Second-half mean over first-half mean that counts as throttling
const PROGRESSIVE_DELAY_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
    RateLimited,
    Locked,
}

/// One submitted credential pair. Only successful attempts outlive the probe.
#[derive(Debug, Clone)]
pub struct BruteForceAttempt {
    pub username: String,
    pub password: String,
    pub target_url: String,
    pub method: HttpMethod,
    pub payload: String,
    pub outcome: AttemptOutcome,
    /// Raw `Set-Cookie` values from the login response
    pub set_cookies: Vec<String>,
    /// `Location` of a post-login redirect, if any
    pub location: Option<String>,
    pub duration_ms: u64,
}

pub struct BruteForceScanner {
    fetcher: Arc<dyn Fetcher>,
    usernames: Vec<String>,
    passwords: Vec<String>,
    success_threshold: u8,
    lockout_detector: Box<dyn LockoutDetector>,
    captcha_detector: Box<dyn CaptchaDetector>,
}

impl BruteForceScanner {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: &AuditConfig) -> Self {
        Self {
            fetcher,
            usernames: config.usernames.clone(),
            passwords: config.passwords.clone(),
            success_threshold: u8::try_from(config.login_success_threshold).unwrap_or(u8::MAX),
            lockout_detector: Box::new(PhraseLockoutDetector),
            captcha_detector: Box::new(MarkupCaptchaDetector),
        }
    }

    pub fn with_lockout_detector(mut self, detector: Box<dyn LockoutDetector>) -> Self {
        self.lockout_detector = detector;
        self
    }

    pub fn with_captcha_detector(mut self, detector: Box<dyn CaptchaDetector>) -> Self {
        self.captcha_detector = detector;
        self
    }

    /// Try the username x password matrix against a login-like form.
    ///
    /// Forms without both a username-like and a password field are skipped.
    /// Probing continues past a success so every weak pair is reported.
    pub async fn brute_force_login(
        &self,
        form: &FormDescriptor,
        recorder: &FindingRecorder,
        cancel: &CancelHandle,
    ) -> Result<Vec<BruteForceAttempt>> {
        let (Some(user_field), Some(pass_field)) = (form.username_field(), form.password_field())
        else {
            debug!("[BruteForce] {} has no username/password pair, skipping", form.action_url);
            return Ok(Vec::new());
        };

        info!(
            "[BruteForce] Testing {} credential pairs against {}",
            self.usernames.len() * self.passwords.len(),
            form.action_url
        );

        let url = form.action_url.as_str();
        let mut successes = Vec::new();
        let mut timings: Vec<u64> = Vec::new();
        let mut attempts = 0usize;
        let mut rate_limited = false;
        let mut locked_out = false;
        let mut delay_reported = false;

        'users: for username in &self.usernames {
            for password in &self.passwords {
                if cancel.is_cancelled() {
                    debug!("[BruteForce] Cancelled during {}", url);
                    break 'users;
                }

                let values = form.fill(&[(user_field, username.as_str()), (pass_field, password.as_str())]);
                let request = form.build_request(&values);

                let started = Instant::now();
                let response = match self.fetcher.fetch(request).await {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("[BruteForce] Attempt against {} failed: {:#}", url, e);
                        continue;
                    }
                };
                let elapsed = started.elapsed().as_millis() as u64;
                attempts += 1;
                timings.push(elapsed);

                check_cookies_for_security_flags(&response.set_cookies, url, recorder).await?;

                if !delay_reported && is_progressive_delay(&timings) {
                    delay_reported = true;
                    info!("[BruteForce] Response times are growing at {}", url);
                    recorder
                        .record(
                            FindingType::ProgressiveDelayDetected,
                            url,
                            format!("Login response time grew across {} attempts", timings.len()),
                            FindingOptions::new(Confidence::Medium, Severity::Low),
                        )
                        .await?;
                }

                let outcome = if response.status_code == 429 {
                    AttemptOutcome::RateLimited
                } else if self.lockout_detector.is_locked_out(&response) {
                    AttemptOutcome::Locked
                } else if score_login_response(&response).is_success(self.success_threshold) {
                    AttemptOutcome::Success
                } else {
                    AttemptOutcome::Failure
                };

                // A challenge page can still carry a lockout or a success
                if outcome != AttemptOutcome::RateLimited && self.captcha_detector.has_captcha(&response.body) {
                    recorder
                        .record(
                            FindingType::CaptchaDetected,
                            url,
                            format!("Login form {} presents a CAPTCHA challenge", url),
                            FindingOptions::new(Confidence::High, Severity::Low),
                        )
                        .await?;
                }

                match outcome {
                    AttemptOutcome::RateLimited => {
                        info!("[BruteForce] HTTP 429 from {} after {} attempts", url, attempts);
                        if !rate_limited {
                            recorder
                                .record(
                                    FindingType::RateLimitDetected,
                                    url,
                                    format!("Login form {} answered HTTP 429", url),
                                    FindingOptions::new(Confidence::High, Severity::Low),
                                )
                                .await?;
                        }
                        rate_limited = true;
                        break 'users;
                    }
                    AttemptOutcome::Locked => {
                        info!("[BruteForce] Lockout indicator from {} (HTTP {})", url, response.status_code);
                        if !locked_out {
                            recorder
                                .record(
                                    FindingType::AccountLockoutDetected,
                                    url,
                                    format!("Login form {} locked the account after {} attempts", url, attempts),
                                    FindingOptions::new(Confidence::Medium, Severity::Low),
                                )
                                .await?;
                        }
                        locked_out = true;
                        break 'users;
                    }
                    AttemptOutcome::Success => {
                        info!("[BruteForce] Weak credentials accepted at {}: {}", url, username);
                        recorder
                            .record(
                                FindingType::DefaultOrWeakCreds,
                                url,
                                format!("Login succeeded with {}:{}", username, password),
                                FindingOptions::new(Confidence::High, Severity::Critical),
                            )
                            .await?;

                        successes.push(BruteForceAttempt {
                            username: username.clone(),
                            password: password.clone(),
                            target_url: url.to_string(),
                            method: form.method,
                            payload: encode_form_data(&values),
                            outcome,
                            location: response.location(),
                            set_cookies: response.set_cookies,
                            duration_ms: elapsed,
                        });
                    }
                    AttemptOutcome::Failure => {}
                }
            }
        }

        if !rate_limited && !locked_out && attempts > self.usernames.len() {
            recorder
                .record(
                    FindingType::NoRateLimitDetected,
                    url,
                    format!(
                        "{} failed logins against {} met no rate limit or lockout",
                        attempts, url
                    ),
                    FindingOptions::new(Confidence::Medium, Severity::Medium),
                )
                .await?;
        }

        Ok(successes)
    }
}

/// Second-half mean at least 1.5x the first-half mean, over at least six
/// samples. Sub-millisecond first halves are treated as 1 ms.
pub fn is_progressive_delay(timings: &[u64]) -> bool {
    if timings.len() < MIN_TIMING_SAMPLES {
        return false;
    }

    let half = timings.len() / 2;
    let mean = |samples: &[u64]| samples.iter().sum::<u64>() as f64 / samples.len() as f64;

    let first = mean(&timings[..half]).max(1.0);
    let second = mean(&timings[half..]);
    second >= first * PROGRESSIVE_DELAY_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progressive_delay_needs_six_samples() {
        assert!(!is_progressive_delay(&[10, 10, 100, 100, 100]));
        assert!(is_progressive_delay(&[10, 10, 10, 30, 30, 30]));
        assert!(!is_progressive_delay(&[10, 12, 11, 12, 13, 12]));
    }

    #[test]
    fn test_progressive_delay_ratio_boundary() {
        assert!(is_progressive_delay(&[100, 100, 100, 150, 150, 150]));
        assert!(!is_progressive_delay(&[100, 100, 100, 149, 149, 149]));
    }

    #[test]
    fn test_zero_length_first_half_does_not_divide_by_zero() {
        assert!(!is_progressive_delay(&[0, 0, 0, 1, 1, 1]));
        assert!(is_progressive_delay(&[0, 0, 0, 5, 5, 5]));
    }
}
