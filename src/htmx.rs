// src/htmx.rs

use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;

pub const ADMIN_CONTENT_TARGET: &str = "#admin-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Notification shown by the shell page's `showMessage` listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }
}

/// Response headers understood by htmx: a toast, a client-side navigation
/// into the admin content area, and swap control.
#[derive(Debug, Default, Clone)]
pub struct HtmxHeaders {
    toast: Option<Toast>,
    location: Option<String>,
    reswap: Option<&'static str>,
}

impl HtmxHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }

    pub fn navigate(mut self, path: impl Into<String>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Keeps whatever is on screen; used when a write fails so the draft
    /// stays untouched.
    pub fn keep_content(mut self) -> Self {
        self.reswap = Some("none");
        self
    }

    pub fn into_header_map(self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(toast) = self.toast {
            let payload = json!({ "showMessage": toast });
            insert_json(&mut headers, "HX-Trigger", &payload);
        }
        if let Some(path) = self.location {
            let payload = json!({
                "path": path,
                "target": ADMIN_CONTENT_TARGET,
                "swap": "innerHTML"
            });
            insert_json(&mut headers, "HX-Location", &payload);
        }
        if let Some(reswap) = self.reswap {
            headers.insert("HX-Reswap", HeaderValue::from_static(reswap));
        }
        headers
    }
}

impl IntoResponseParts for HtmxHeaders {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().extend(self.into_header_map());
        Ok(res)
    }
}

fn insert_json(headers: &mut HeaderMap, name: &'static str, payload: &serde_json::Value) {
    let encoded = ascii_json(payload);
    match HeaderValue::from_str(&encoded) {
        Ok(val) => {
            headers.insert(name, val);
        }
        Err(_) => tracing::error!("Cannot build {} header from payload {}", name, encoded),
    }
}

/// Serializes JSON with every non-ASCII character escaped as `\uXXXX`, since
/// header values must be visible ASCII.
pub fn ascii_json(value: &serde_json::Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// True when the request was issued by htmx rather than a full page load.
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_json(headers: &HeaderMap, name: &str) -> serde_json::Value {
        let raw = headers.get(name).expect("header present").to_str().unwrap();
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn toast_and_location_are_encoded_for_htmx() {
        let headers = HtmxHeaders::new()
            .toast(Toast::success("Categoria criada com sucesso!"))
            .navigate("/admin/categories")
            .into_header_map();

        let trigger = header_json(&headers, "HX-Trigger");
        assert_eq!(
            trigger["showMessage"]["message"],
            "Categoria criada com sucesso!"
        );
        assert_eq!(trigger["showMessage"]["type"], "success");

        let location = header_json(&headers, "HX-Location");
        assert_eq!(location["path"], "/admin/categories");
        assert_eq!(location["target"], ADMIN_CONTENT_TARGET);
        assert!(headers.get("HX-Reswap").is_none());
    }

    #[test]
    fn non_ascii_messages_survive_the_header_round_trip() {
        let headers = HtmxHeaders::new()
            .toast(Toast::error("O nome da categoria é obrigatório"))
            .keep_content()
            .into_header_map();

        let trigger = header_json(&headers, "HX-Trigger");
        assert_eq!(
            trigger["showMessage"]["message"],
            "O nome da categoria é obrigatório"
        );
        assert_eq!(headers.get("HX-Reswap").unwrap(), "none");
    }

    #[test]
    fn ascii_json_escapes_astral_characters_as_surrogate_pairs() {
        let encoded = ascii_json(&json!("✅ ok 😀"));
        assert!(encoded.is_ascii());
        let decoded: String = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, "✅ ok 😀");
    }
}
