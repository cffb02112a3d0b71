//! Access-token cache primitives for the speech provider.
//!
//! The provider issues long-lived (~30 day) bearer tokens via an OAuth2
//! client-credentials exchange. A token is reused until a 300-second
//! safety margin before the provider-declared expiry.

use std::time::{SystemTime, UNIX_EPOCH};

/// Safety margin subtracted from the provider-declared token lifetime.
pub const TOKEN_SAFETY_MARGIN_SECS: u64 = 300;

/// Time source for token expiry checks.
///
/// Abstracted behind a trait so tests can drive expiry deterministically
/// with a fake clock.
pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time source used in production.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// A cached access token. Held only in process memory, owned exclusively
/// by the speech client.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub expires_at_ms: u64,
}

impl CachedToken {
    /// Build a token from a provider-declared lifetime, reserving the
    /// safety margin.
    pub fn new(value: String, now_ms: u64, expires_in_secs: u64) -> Self {
        let expires_at_ms =
            now_ms + expires_in_secs.saturating_sub(TOKEN_SAFETY_MARGIN_SECS) * 1000;
        Self {
            value,
            expires_at_ms,
        }
    }

    /// True while the token may still be reused.
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_reserves_safety_margin() {
        let token = CachedToken::new("tok".to_string(), 1_000_000, 2_592_000);
        assert_eq!(
            token.expires_at_ms,
            1_000_000 + (2_592_000 - TOKEN_SAFETY_MARGIN_SECS) * 1000
        );
    }

    #[test]
    fn test_token_validity_window() {
        let token = CachedToken::new("tok".to_string(), 0, 600);
        // 600s lifetime minus 300s margin leaves 300s of reuse.
        assert!(token.is_valid_at(0));
        assert!(token.is_valid_at(299_999));
        assert!(!token.is_valid_at(300_000));
    }

    #[test]
    fn test_short_lifetime_saturates() {
        // Lifetime shorter than the margin means the token is never reused.
        let token = CachedToken::new("tok".to_string(), 5_000, 60);
        assert_eq!(token.expires_at_ms, 5_000);
        assert!(!token.is_valid_at(5_000));
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
        // Sanity: after 2020.
        assert!(a > 1_577_836_800_000);
    }
}
