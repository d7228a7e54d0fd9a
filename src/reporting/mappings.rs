// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::reporting::types::Priority;
use crate::types::FindingType;

/// Static recommendation attached to one or more finding types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationEntry {
    pub id: &'static str,
    pub text: &'static str,
    pub priority: Priority,
}

const INPUT_VALIDATION: RecommendationEntry = RecommendationEntry {
    id: "INPUT_VALIDATION",
    text: "Use parameterized queries for every database access and encode user input for the output context (HTML, attribute, JavaScript) before rendering it.",
    priority: Priority::Critical,
};

const COOKIE_FLAGS: RecommendationEntry = RecommendationEntry {
    id: "COOKIE_FLAGS",
    text: "Set the Secure and HttpOnly attributes on every session and authentication cookie, and add SameSite=Lax or Strict.",
    priority: Priority::Medium,
};

const STRONG_CREDENTIALS: RecommendationEntry = RecommendationEntry {
    id: "STRONG_CREDENTIALS",
    text: "Remove default accounts, rotate weak passwords immediately and enforce a password policy that rejects common and breached passwords.",
    priority: Priority::Critical,
};

const RATE_LIMITING: RecommendationEntry = RecommendationEntry {
    id: "RATE_LIMITING",
    text: "Throttle authentication endpoints per account and per client, returning 429 after repeated failures and adding CAPTCHA after a small number of attempts.",
    priority: Priority::High,
};

const LOCKOUT_POLICY: RecommendationEntry = RecommendationEntry {
    id: "LOCKOUT_POLICY",
    text: "Review account lockout behaviour: prefer temporary, progressive lockouts with user notification so attackers cannot lock out legitimate users indefinitely.",
    priority: Priority::Low,
};

const HTTPS_ENFORCEMENT: RecommendationEntry = RecommendationEntry {
    id: "HTTPS_ENFORCEMENT",
    text: "Redirect all plain HTTP traffic to HTTPS and send a Strict-Transport-Security header.",
    priority: Priority::High,
};

const SECRETS_IN_URL: RecommendationEntry = RecommendationEntry {
    id: "SECRETS_IN_URL",
    text: "Never place passwords, session identifiers or tokens in URLs; send them in headers or POST bodies instead.",
    priority: Priority::High,
};

const RESET_FLOW: RecommendationEntry = RecommendationEntry {
    id: "RESET_FLOW",
    text: "Make password reset tokens single-use, random, short-lived and bound to the account, and return identical responses for known and unknown accounts.",
    priority: Priority::Medium,
};

const JWT_VERIFICATION: RecommendationEntry = RecommendationEntry {
    id: "JWT_VERIFICATION",
    text: "Verify every JWT signature with an explicit algorithm allow-list and reject tokens whose header declares alg=none.",
    priority: Priority::Critical,
};

const CSRF_PROTECTION: RecommendationEntry = RecommendationEntry {
    id: "CSRF_PROTECTION",
    text: "Protect state-changing forms with per-session anti-CSRF tokens and SameSite cookies.",
    priority: Priority::Medium,
};

const UPLOAD_VALIDATION: RecommendationEntry = RecommendationEntry {
    id: "UPLOAD_VALIDATION",
    text: "Validate uploads against an extension and content-type allow-list, store them outside the web root under random names and never execute them.",
    priority: Priority::High,
};

pub struct RecommendationMapper;

impl RecommendationMapper {
    /// Finding type to recommendation; `None` for types without guidance
    pub fn recommendation_for(finding_type: &FindingType) -> Option<RecommendationEntry> {
        let entry = match finding_type {
            FindingType::PossibleInjectionResponse => INPUT_VALIDATION,
            FindingType::InsecureCookie => COOKIE_FLAGS,
            FindingType::DefaultOrWeakCreds => STRONG_CREDENTIALS,
            FindingType::NoRateLimitDetected => RATE_LIMITING,
            FindingType::RateLimitDetected
            | FindingType::CaptchaDetected
            | FindingType::AccountLockoutDetected
            | FindingType::ProgressiveDelayDetected => LOCKOUT_POLICY,
            FindingType::InsecureTransport => HTTPS_ENFORCEMENT,
            FindingType::CredentialsInUrl => SECRETS_IN_URL,
            FindingType::PotentialInsecureReset => RESET_FLOW,
            FindingType::ImproperJwtHandling => JWT_VERIFICATION,
            FindingType::MissingCsrfToken => CSRF_PROTECTION,
            FindingType::FileUploadAccepted | FindingType::FileUploadExposure => UPLOAD_VALIDATION,
            FindingType::Other(_) => return None,
        };
        Some(entry)
    }

    /// Recommendation id to reference links
    pub fn resources_for(recommendation_id: &str) -> &'static [&'static str] {
        match recommendation_id {
            "INPUT_VALIDATION" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/SQL_Injection_Prevention_Cheat_Sheet.html",
                "https://cheatsheetseries.owasp.org/cheatsheets/Cross_Site_Scripting_Prevention_Cheat_Sheet.html",
                "https://cwe.mitre.org/data/definitions/89.html",
                "https://cwe.mitre.org/data/definitions/79.html",
            ],
            "COOKIE_FLAGS" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Session_Management_Cheat_Sheet.html",
                "https://developer.mozilla.org/en-US/docs/Web/HTTP/Cookies",
            ],
            "STRONG_CREDENTIALS" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Authentication_Cheat_Sheet.html",
                "https://cwe.mitre.org/data/definitions/521.html",
            ],
            "RATE_LIMITING" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Credential_Stuffing_Prevention_Cheat_Sheet.html",
                "https://cwe.mitre.org/data/definitions/307.html",
            ],
            "LOCKOUT_POLICY" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Authentication_Cheat_Sheet.html#account-lockout",
            ],
            "HTTPS_ENFORCEMENT" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Transport_Layer_Security_Cheat_Sheet.html",
                "https://cheatsheetseries.owasp.org/cheatsheets/HTTP_Strict_Transport_Security_Cheat_Sheet.html",
            ],
            "SECRETS_IN_URL" => &["https://cwe.mitre.org/data/definitions/598.html"],
            "RESET_FLOW" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Forgot_Password_Cheat_Sheet.html",
            ],
            "JWT_VERIFICATION" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/JSON_Web_Token_for_Java_Cheat_Sheet.html",
                "https://cwe.mitre.org/data/definitions/347.html",
            ],
            "CSRF_PROTECTION" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/Cross-Site_Request_Forgery_Prevention_Cheat_Sheet.html",
            ],
            "UPLOAD_VALIDATION" => &[
                "https://cheatsheetseries.owasp.org/cheatsheets/File_Upload_Cheat_Sheet.html",
                "https://cwe.mitre.org/data/definitions/434.html",
            ],
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mapped_id_has_resources() {
        let types = [
            FindingType::PossibleInjectionResponse,
            FindingType::InsecureCookie,
            FindingType::DefaultOrWeakCreds,
            FindingType::NoRateLimitDetected,
            FindingType::CaptchaDetected,
            FindingType::InsecureTransport,
            FindingType::CredentialsInUrl,
            FindingType::PotentialInsecureReset,
            FindingType::ImproperJwtHandling,
            FindingType::MissingCsrfToken,
            FindingType::FileUploadExposure,
        ];
        for finding_type in types {
            let entry = RecommendationMapper::recommendation_for(&finding_type).unwrap();
            assert!(!RecommendationMapper::resources_for(entry.id).is_empty());
        }
    }

    #[test]
    fn test_unknown_type_has_no_recommendation() {
        assert!(RecommendationMapper::recommendation_for(&FindingType::Other("x".into())).is_none());
        assert!(RecommendationMapper::resources_for("NOPE").is_empty());
    }
}
