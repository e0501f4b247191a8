//! JWT claims structure carried by every access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dochub_core::types::UserId;

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login of the authenticated user.
    pub user_login: String,
    /// Address the token was issued to.
    pub client_ip: String,
    /// The authenticated user.
    pub user_id: UserId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now` (`now >= exp`).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Whole seconds of validity left at `now`, or `None` once expired.
    pub fn remaining_seconds_at(&self, now: DateTime<Utc>) -> Option<u64> {
        let remaining = self.exp - now.timestamp();
        u64::try_from(remaining).ok().filter(|s| *s > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            user_login: "alice_owner".to_string(),
            client_ip: "127.0.0.1:5000".to_string(),
            user_id: UserId(1),
            iat: 1_000,
            exp: 1_100,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let c = claims();
        let before = DateTime::from_timestamp(1_099, 0).expect("valid timestamp");
        let at = DateTime::from_timestamp(1_100, 0).expect("valid timestamp");
        assert!(!c.is_expired_at(before));
        assert!(c.is_expired_at(at));
        assert_eq!(c.remaining_seconds_at(before), Some(1));
        assert_eq!(c.remaining_seconds_at(at), None);
    }
}
