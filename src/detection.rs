// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Response Heuristics
 * Swappable predicates for lockout, CAPTCHA, login success, session cookies
 * and injection signals over noisy HTTP responses
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::http_client::HttpResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static SESSION_COOKIE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)session|auth|jwt|sid").unwrap());

static CAPTCHA_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:class|id)\s*=\s*["']?[^"'>]*captcha"#).unwrap()
});

static RECAPTCHA_DIV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<div[^>]*g-recaptcha"#).unwrap());

static CAPTCHA_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]*captcha[^>]*>"#).unwrap());

/// Tabular dumps (`id: 1`, `name: x`) and pipe-delimited rows
static TABULAR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\bid\s*:|\bname\s*:|\|[^|\n]+\|").unwrap());

static SQL_ERROR_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)you have an error in your sql syntax|warning:\s*mysql|unclosed quotation mark|quoted string not properly terminated|ora-[0-9]{5}|sqlstate\[|pg::syntaxerror|syntax error at or near|invalid input syntax for|conversion failed when converting|sqlite3?::|sqlite_error|xpath syntax error|odbc sql server driver",
    )
    .unwrap()
});

/// SQL keywords that precede the marker when a payload is echoed in pieces
static SQL_ECHO_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(select|cast|convert|concat|union)\W*$").unwrap());

static BLOCK_TEXT_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse("p, div, pre, code, td, th, tr, li, span, h1, h2, h3, h4, b, strong, font").ok()
});

static XSS_SINK_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| {
    Selector::parse("script, img[onerror], svg[onload], iframe[src], a[href]").ok()
});

pub const SUCCESS_KEYWORDS: &[&str] = &[
    "welcome",
    "dashboard",
    "logout",
    "log out",
    "sign out",
    "my account",
    "profile",
    "successfully logged in",
];

pub const FAILURE_KEYWORDS: &[&str] = &[
    "invalid",
    "incorrect",
    "login failed",
    "wrong password",
    "authentication failed",
    "unknown user",
    "try again",
    "identifiants incorrects",
    "mot de passe incorrect",
];

const LOCKOUT_PHRASES: &[&str] = &[
    "account locked",
    "account has been locked",
    "account is locked",
    "too many attempts",
    "too many login attempts",
    "too many failed",
    "temporarily locked",
    "compte verrouillé",
    "compte bloqué",
    "trop de tentatives",
];

/// Paths a successful login commonly redirects to
const POST_LOGIN_PATHS: &[&str] = &["/dashboard", "/account", "/home"];

/// Decides whether a login response means the account is locked.
pub trait LockoutDetector: Send + Sync {
    fn is_locked_out(&self, response: &HttpResponse) -> bool;
}

/// HTTP 403 or an English/French lockout phrase in the body
#[derive(Debug, Default, Clone)]
pub struct PhraseLockoutDetector;

impl LockoutDetector for PhraseLockoutDetector {
    fn is_locked_out(&self, response: &HttpResponse) -> bool {
        if response.status_code == 403 {
            return true;
        }
        let body = response.body.to_lowercase();
        LOCKOUT_PHRASES.iter().any(|phrase| body.contains(phrase))
    }
}

/// Decides whether a response carries a CAPTCHA challenge.
pub trait CaptchaDetector: Send + Sync {
    fn has_captcha(&self, body: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct MarkupCaptchaDetector;

impl CaptchaDetector for MarkupCaptchaDetector {
    fn has_captcha(&self, body: &str) -> bool {
        CAPTCHA_ATTRIBUTE.is_match(body) || RECAPTCHA_DIV.is_match(body) || CAPTCHA_IMAGE.is_match(body)
    }
}

/// Weighted login-success score for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginScore {
    pub score: u8,
    pub has_failure_keyword: bool,
}

impl LoginScore {
    pub fn is_success(&self, threshold: u8) -> bool {
        self.score >= threshold && !self.has_failure_keyword
    }
}

pub fn has_failure_keyword(body: &str) -> bool {
    let body = body.to_lowercase();
    FAILURE_KEYWORDS.iter().any(|k| body.contains(k))
}

/// Score a login response: +1 for 2xx, +2 for success keywords without
/// failure keywords, +2 for a session-looking cookie, +1 for a 302 to a
/// post-login path.
pub fn score_login_response(response: &HttpResponse) -> LoginScore {
    let body = response.body.to_lowercase();
    let failure = FAILURE_KEYWORDS.iter().any(|k| body.contains(k));
    let success = SUCCESS_KEYWORDS.iter().any(|k| body.contains(k));

    let mut score = 0u8;
    if response.is_success() {
        score += 1;
    }
    if success && !failure {
        score += 2;
    }
    if response
        .set_cookies
        .iter()
        .filter_map(|c| cookie_name(c))
        .any(is_session_cookie_name)
    {
        score += 2;
    }
    if response.status_code == 302 {
        if let Some(location) = response.location() {
            let location = location.to_lowercase();
            if POST_LOGIN_PATHS.iter().any(|p| location.contains(p)) {
                score += 1;
            }
        }
    }

    LoginScore {
        score,
        has_failure_keyword: failure,
    }
}

pub fn is_session_cookie_name(name: &str) -> bool {
    SESSION_COOKIE_NAME.is_match(name)
}

/// Cookie name from a raw `Set-Cookie` value
pub fn cookie_name(set_cookie: &str) -> Option<&str> {
    let (name, _) = set_cookie.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Cookie value from a raw `Set-Cookie` value, without attributes
pub fn cookie_value(set_cookie: &str) -> Option<&str> {
    let (_, rest) = set_cookie.split_once('=')?;
    Some(rest.split(';').next().unwrap_or("").trim())
}

/// True when `value` has the three-segment shape of a JWT
pub fn looks_like_jwt(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 3 && parts[0].starts_with("eyJ") && !parts[1].is_empty()
}

/// Ways a payload can echo back without being executed
fn reflection_shapes(payload: &str) -> Vec<String> {
    let html_escaped = payload
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");

    vec![
        payload.to_string(),
        html_escaped.replace('\'', "&#39;"),
        html_escaped.replace('\'', "&#x27;"),
        html_escaped.replace('\'', "&apos;"),
        html_escaped,
        payload.replace('\'', "\\'").replace('"', "\\\""),
        payload.replace('\'', "''"),
        urlencoding::encode(payload).into_owned(),
        urlencoding::encode(payload).replace("%20", "+"),
    ]
}

fn strip_reflections(text: &str, payload: &str) -> String {
    let mut residue = text.to_string();
    for shape in reflection_shapes(payload) {
        if !shape.is_empty() {
            residue = residue.replace(&shape, "");
        }
    }
    residue
}

/// Marker surfaced by query execution rather than a literal echo.
///
/// Every known reflection shape of the payload is removed first; a marker
/// left behind must not sit right after SQL syntax.
pub fn detect_sql_marker(body: &str, payload: &str, marker: &str) -> bool {
    if !body.contains(marker) {
        return false;
    }

    let residue = strip_reflections(body, payload);
    residue.match_indices(marker).any(|(idx, _)| {
        let window_start = residue[..idx]
            .char_indices()
            .rev()
            .nth(24)
            .map(|(i, _)| i)
            .unwrap_or(0);
        !SQL_ECHO_CONTEXT.is_match(&residue[window_start..idx])
    })
}

/// Marker inside a block/text element that looks like a row dump or a
/// database error message. Echoes of the payload itself are removed from
/// the element text before matching.
pub fn detect_sql_error_shape(document: &Html, payload: &str, marker: &str) -> bool {
    let Some(selector) = BLOCK_TEXT_SELECTOR.as_ref() else {
        return false;
    };

    document.select(selector).any(|element| {
        let text: String = element.text().collect();
        if !text.contains(marker) {
            return false;
        }
        let residue = strip_reflections(&text, payload);
        residue.contains(marker) && (TABULAR_ROW.is_match(&residue) || SQL_ERROR_MESSAGE.is_match(&residue))
    })
}

/// Database error text anywhere in the body
pub fn detect_sql_error_message(body: &str) -> bool {
    SQL_ERROR_MESSAGE.is_match(body)
}

/// Name of the XSS variant when the raw payload is reflected and the DOM
/// carries a live sink containing `token`
pub fn detect_xss_reflection(body: &str, document: &Html, payload: &str, token: &str) -> Option<&'static str> {
    if !body.contains(payload) {
        return None;
    }

    let selector = XSS_SINK_SELECTOR.as_ref()?;
    let live_sink = document
        .select(selector)
        .any(|element| element.html().contains(token));
    if !live_sink {
        return None;
    }

    let lower = payload.to_lowercase();
    let variant = if lower.starts_with("<script") {
        "script"
    } else if lower.starts_with("<img") {
        "img-onerror"
    } else if lower.starts_with("<svg") {
        "svg-onload"
    } else if lower.starts_with("<iframe") {
        "iframe-javascript"
    } else if lower.starts_with("<a") {
        "anchor-javascript"
    } else {
        "html"
    };
    Some(variant)
}
