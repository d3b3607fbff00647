//! Self-expiring UI text
//!
//! A slot stores the text together with its own expiry instant. Setting new text
//! replaces both, so an old expiry can never clear a newer message.

use std::time::Duration;
use tokio::time::Instant;

/// How long a success message stays visible
pub const MESSAGE_TTL: Duration = Duration::from_millis(3000);

/// How long an error stays visible
pub const ERROR_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone)]
pub struct TransientSlot {
    ttl: Duration,
    current: Option<(String, Instant)>,
}

impl TransientSlot {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Show `text` until `now + ttl`
    pub fn set(&mut self, text: impl Into<String>, now: Instant) {
        self.current = Some((text.into(), now + self.ttl));
    }

    /// Text visible at `now`
    #[must_use]
    pub fn get(&self, now: Instant) -> Option<&str> {
        match &self.current {
            Some((text, expires_at)) if now < *expires_at => Some(text.as_str()),
            _ => None,
        }
    }

    /// Drop the text if it has expired; returns true if something was cleared
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|(_, at)| now >= *at) {
            self.current = None;
            return true;
        }
        false
    }
}
