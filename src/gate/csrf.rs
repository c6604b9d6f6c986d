use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Cookie holding the issued anti-forgery token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Header the client must echo the cookie value into on unsafe requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("missing CSRF header")]
    MissingHeader,

    #[error("missing CSRF cookie")]
    MissingCookie,

    #[error("CSRF header does not match cookie")]
    Mismatch,

    #[error("malformed CSRF token")]
    Malformed,

    #[error("expired CSRF token")]
    Expired,
}

/// Issues and verifies anti-forgery tokens.
///
/// Tokens are opaque to clients: `v1.<unix-ts>.<random>`. The embedded issue
/// timestamp gives the token a bounded lifetime, and `needs_rotation` lets the
/// front-end refresh before the limit is reached. Verification compares the
/// echoed header against the cookie byte for byte and then checks age.
#[derive(Debug, Clone)]
pub struct CsrfService {
    ttl: Duration,
}

impl CsrfService {
    pub fn new(ttl_minutes: i64) -> Self {
        Self { ttl: Duration::minutes(ttl_minutes) }
    }

    /// Mint a fresh token stamped with `now`.
    pub fn issue(&self, now: DateTime<Utc>) -> String {
        format!("v1.{}.{}", now.timestamp(), Uuid::new_v4().simple())
    }

    /// Check a header/cookie pair as presented by an unsafe request.
    pub fn verify(
        &self,
        header: Option<&str>,
        cookie: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let header = header.ok_or(CsrfError::MissingHeader)?;
        let cookie = cookie.ok_or(CsrfError::MissingCookie)?;

        if header != cookie {
            return Err(CsrfError::Mismatch);
        }

        let issued = issued_at(cookie).ok_or(CsrfError::Malformed)?;
        if now - issued > self.ttl {
            return Err(CsrfError::Expired);
        }

        Ok(())
    }

    /// True once a token has passed half its lifetime. The client refreshes
    /// proactively at this point instead of waiting for a hard failure.
    pub fn needs_rotation(&self, token: &str, now: DateTime<Utc>) -> bool {
        match issued_at(token) {
            Some(issued) => now - issued > self.ttl / 2,
            None => true,
        }
    }
}

/// Parse the issue timestamp out of a token, if it has the expected shape.
fn issued_at(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.splitn(3, '.');
    if parts.next() != Some("v1") {
        return None;
    }
    let ts: i64 = parts.next()?.parse().ok()?;
    parts.next()?;
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CsrfService {
        CsrfService::new(60)
    }

    #[test]
    fn issued_token_verifies_against_itself() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(now);
        assert_eq!(svc.verify(Some(&token), Some(&token), now), Ok(()));
    }

    #[test]
    fn missing_sides_are_distinct_failures() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(now);
        assert_eq!(svc.verify(None, Some(&token), now), Err(CsrfError::MissingHeader));
        assert_eq!(svc.verify(Some(&token), None, now), Err(CsrfError::MissingCookie));
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let svc = service();
        let now = Utc::now();
        let a = svc.issue(now);
        let b = svc.issue(now);
        assert_eq!(svc.verify(Some(&a), Some(&b), now), Err(CsrfError::Mismatch));
    }

    #[test]
    fn token_expires_after_ttl() {
        let svc = service();
        let issued = Utc::now();
        let token = svc.issue(issued);
        let later = issued + Duration::minutes(61);
        assert_eq!(svc.verify(Some(&token), Some(&token), later), Err(CsrfError::Expired));
    }

    #[test]
    fn foreign_token_shape_is_malformed() {
        let svc = service();
        let now = Utc::now();
        let token = "not-a-token";
        assert_eq!(
            svc.verify(Some(token), Some(token), now),
            Err(CsrfError::Malformed)
        );
    }

    #[test]
    fn rotation_threshold_is_half_ttl() {
        let svc = service();
        let issued = Utc::now();
        let token = svc.issue(issued);
        assert!(!svc.needs_rotation(&token, issued + Duration::minutes(10)));
        assert!(svc.needs_rotation(&token, issued + Duration::minutes(31)));
        assert!(svc.needs_rotation("garbage", issued));
    }
}
