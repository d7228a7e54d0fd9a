// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Form Extractor & Classifier
 * Enumerates HTML forms, flags CSRF tokens and login-like forms, and builds
 * filled-in submissions for the probers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::http_client::{encode_form_data, FetchRequest, HttpMethod};
use crate::payloads::field_default_value;
use crate::url_utils::normalize;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Input types that carry no user data and are never injection targets
const NON_DATA_TYPES: &[&str] = &["submit", "button", "reset", "image", "file"];

/// One `<form>` as seen on a page. Immutable after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDescriptor {
    pub method: HttpMethod,
    /// Always absolute; falls back to the hosting page URL
    pub action_url: String,
    /// Field name to lowercase input type
    pub fields: BTreeMap<String, String>,
    /// Field name to the `value` attribute found in the markup (or empty)
    pub field_values: BTreeMap<String, String>,
    pub has_csrf_token: bool,
    pub is_login_form: bool,
    pub page_url: String,
    pub enctype: Option<String>,
}

impl FormDescriptor {
    /// Name of the first field that looks like a username/email
    pub fn username_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, kind)| kind.as_str() != "password" && is_identity_name(name))
            .map(|(name, _)| name.as_str())
    }

    /// Name of the first password-typed field
    pub fn password_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, kind)| kind.as_str() == "password")
            .map(|(name, _)| name.as_str())
    }

    pub fn file_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, kind)| kind.as_str() == "file")
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Method, action and field names. Two pages embedding the same form
    /// share this key.
    pub fn identity_key(&self) -> String {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        format!("{} {} [{}]", self.method, self.action_url, names.join(","))
    }

    pub fn is_multipart(&self) -> bool {
        let declared = self
            .enctype
            .as_deref()
            .map(|e| e.to_ascii_lowercase().contains("multipart/form-data"))
            .unwrap_or(false);
        declared || !self.file_fields().is_empty()
    }

    /// Fields a payload can be injected into
    pub fn injectable_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, kind)| !NON_DATA_TYPES.contains(&kind.as_str()))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Filler value for one field: hidden/select fields keep the markup value
    /// (CSRF tokens, option ids), everything else gets the typed default.
    pub fn default_value_for(&self, name: &str) -> String {
        let kind = self.fields.get(name).map(String::as_str).unwrap_or("text");
        let seed = self.field_values.get(name).map(String::as_str).unwrap_or("");

        if matches!(kind, "hidden" | "select") && !seed.is_empty() {
            return seed.to_string();
        }
        field_default_value(kind).to_string()
    }

    /// Every data field filled with its default, then `overrides` applied
    pub fn fill(&self, overrides: &[(&str, &str)]) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|(_, kind)| !NON_DATA_TYPES.contains(&kind.as_str()))
            .map(|(name, _)| {
                let value = overrides
                    .iter()
                    .find(|(field, _)| *field == name.as_str())
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_else(|| self.default_value_for(name));
                (name.clone(), value)
            })
            .collect()
    }

    /// Turn filled values into a request using the form's method.
    ///
    /// GET appends to the action URL query; POST sends an urlencoded body.
    pub fn build_request(&self, values: &[(String, String)]) -> FetchRequest {
        match self.method {
            HttpMethod::Post => FetchRequest::post_form(&self.action_url, encode_form_data(values)),
            _ => {
                let url = match Url::parse(&self.action_url) {
                    Ok(mut url) => {
                        {
                            let mut query = url.query_pairs_mut();
                            for (name, value) in values {
                                query.append_pair(name, value);
                            }
                        }
                        url.to_string()
                    }
                    Err(_) => self.action_url.clone(),
                };
                FetchRequest::get(url)
            }
        }
    }
}

fn is_identity_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("user") || lower.contains("email")
}

fn is_csrf_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("csrf") || lower.contains("token")
}

/// Classify a login-like form: a password field plus an identity field.
///
/// The identity field is any non-password field whose name contains
/// user/email or whose type is text/email.
pub fn is_login_form(fields: &BTreeMap<String, String>) -> bool {
    let has_password = fields.values().any(|kind| kind == "password");
    let has_identity = fields.iter().any(|(name, kind)| {
        kind != "password" && (is_identity_name(name) || kind == "text" || kind == "email")
    });
    has_password && has_identity
}

/// True when any hidden field name looks like an anti-CSRF token
pub fn has_csrf_token(fields: &BTreeMap<String, String>) -> bool {
    fields
        .iter()
        .any(|(name, kind)| kind == "hidden" && is_csrf_name(name))
}

fn field_type(element: &ElementRef) -> String {
    match element.value().name() {
        "textarea" => "textarea".to_string(),
        "select" => "select".to_string(),
        _ => element
            .value()
            .attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string()),
    }
}

/// Extract every `<form>` on a page. Invalid HTML degrades to fewer forms.
pub fn extract_forms(html: &str, page_url: &str) -> Vec<FormDescriptor> {
    let document = Html::parse_document(html);
    extract_forms_from_document(&document, page_url)
}

pub fn extract_forms_from_document(document: &Html, page_url: &str) -> Vec<FormDescriptor> {
    let (Ok(form_selector), Ok(field_selector)) = (
        Selector::parse("form"),
        Selector::parse("input[name], textarea[name], select[name]"),
    ) else {
        return Vec::new();
    };

    let mut forms = Vec::new();

    for form_element in document.select(&form_selector) {
        let method = match form_element.value().attr("method") {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => HttpMethod::Post,
            _ => HttpMethod::Get,
        };

        let action_url = form_element
            .value()
            .attr("action")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .and_then(|a| normalize(a, page_url))
            .unwrap_or_else(|| page_url.to_string());

        let mut fields = BTreeMap::new();
        let mut field_values = BTreeMap::new();

        for field in form_element.select(&field_selector) {
            let Some(name) = field.value().attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            let value = field.value().attr("value").unwrap_or("").to_string();

            fields.insert(name.to_string(), field_type(&field));
            field_values.insert(name.to_string(), value);
        }

        let descriptor = FormDescriptor {
            method,
            has_csrf_token: has_csrf_token(&fields),
            is_login_form: is_login_form(&fields),
            action_url,
            fields,
            field_values,
            page_url: page_url.to_string(),
            enctype: form_element.value().attr("enctype").map(|e| e.to_string()),
        };

        debug!(
            "[Forms] {} {} ({} fields, login={}, csrf={})",
            descriptor.method,
            descriptor.action_url,
            descriptor.fields.len(),
            descriptor.is_login_form,
            descriptor.has_csrf_token
        );

        forms.push(descriptor);
    }

    forms
}
