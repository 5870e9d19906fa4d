//! Toast notifications.
//!
//! The form reports outcomes through the [`Notifier`] trait. The web layer
//! collects toasts with a [`FlashNotifier`] and carries them across the
//! post-submit redirect in a flash cookie that the next page clears.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Flash cookie name
pub const FLASH_COOKIE: &str = "notehub_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Collects toasts for the response being built.
#[derive(Default)]
pub struct FlashNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl FlashNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Toast> {
        let mut toasts = self.toasts.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::take(&mut *toasts)
    }
}

impl Notifier for FlashNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap_or_else(|p| p.into_inner()).push(toast);
    }
}

// ============================================================================
// Flash Cookie
// ============================================================================

/// Attach `toasts` to the jar so the next page can show them.
pub fn set_flash(jar: CookieJar, toasts: &[Toast]) -> CookieJar {
    if toasts.is_empty() {
        return jar;
    }
    let json = match serde_json::to_string(toasts) {
        Ok(json) => json,
        Err(_) => return jar,
    };
    let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
        .path("/")
        .http_only(true);
    jar.add(cookie)
}

/// Read and clear the flash cookie. A malformed cookie yields no toasts.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Vec<Toast>) {
    let toasts = match jar.get(FLASH_COOKIE) {
        Some(cookie) => decode_flash(cookie.value()),
        None => return (jar, Vec::new()),
    };
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, toasts)
}

fn decode_flash(value: &str) -> Vec<Toast> {
    urlencoding::decode(value)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}
