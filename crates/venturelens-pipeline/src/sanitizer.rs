use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use venturelens_core::{Result, VentureLensError};

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?").expect("valid fence regex"));
static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```$").expect("valid fence regex"));

/// Whether a blank or `{}` payload counts as a failure before parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCheck {
    RejectEmpty,
    Skip,
}

/// Remove a surrounding markdown code fence, then trim.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(m) = OPENING_FENCE.find(text) {
        text = &text[m.end()..];
    }
    if let Some(m) = CLOSING_FENCE.find(text) {
        text = &text[..m.start()];
    }
    text.trim()
}

fn is_empty_payload(text: &str) -> bool {
    text.is_empty() || text == "{}"
}

/// Strip, check, parse and shape-validate raw completion text.
pub fn parse_report<T: DeserializeOwned>(raw: &str, check: EmptyCheck) -> Result<T> {
    let text = strip_fences(raw);

    if check == EmptyCheck::RejectEmpty && is_empty_payload(text) {
        return Err(VentureLensError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| VentureLensError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if check == EmptyCheck::RejectEmpty && value.as_object().is_some_and(|o| o.is_empty()) {
        return Err(VentureLensError::EmptyResponse);
    }

    serde_json::from_value(value)
        .map_err(|e| VentureLensError::MalformedResponse(format!("unexpected shape: {}", e)))
}
