//! Expiry checks on bearer tokens.
//!
//! Tokens are JWTs: three dot-separated segments whose middle segment is a
//! base64url JSON payload carrying an `exp` claim in seconds since the epoch.
//! Signatures are not verified here; the API does that. Anything that cannot
//! be read is treated as expired.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};

/// What a token's `exp` claim says about it at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// `exp` is strictly in the future.
    Live,
    /// `exp` is now or in the past.
    Expired,
    /// No readable `exp` claim (not a JWT, bad encoding, missing claim).
    Opaque,
}

/// Read the numeric `exp` claim, if the token carries one.
fn exp_claim(token: &str) -> Option<f64> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    if header.is_empty() || payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_f64()
}

/// Classify a token against `now`.
pub fn inspect_at(token: &str, now: DateTime<Utc>) -> TokenState {
    match exp_claim(token) {
        Some(exp) if exp * 1000.0 <= now.timestamp_millis() as f64 => TokenState::Expired,
        Some(_) => TokenState::Live,
        None => TokenState::Opaque,
    }
}

/// Fail-closed expiry check: unreadable tokens count as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    inspect_at(token, now) != TokenState::Live
}

/// Fail-closed expiry check against the current wall clock.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// The instant encoded in the `exp` claim, for display.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = exp_claim(token)?;
    Utc.timestamp_millis_opt((exp * 1000.0) as i64).single()
}

/// Build an unsigned token whose payload is `claims`.
#[cfg(test)]
pub(crate) fn token_with_claims(claims: serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
    )
}

/// Build an unsigned token expiring `offset_secs` from now.
#[cfg(test)]
pub(crate) fn token_expiring_in(offset_secs: i64) -> String {
    token_with_claims(serde_json::json!({
        "sub": 42,
        "exp": Utc::now().timestamp() + offset_secs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[test]
    fn test_future_exp_is_live() {
        let token = token_with_claims(json!({ "exp": 2_000 }));
        assert_eq!(inspect_at(&token, at(1_000)), TokenState::Live);
        assert!(!is_expired_at(&token, at(1_000)));
    }

    #[test]
    fn test_past_exp_is_expired() {
        let token = token_with_claims(json!({ "exp": 1_000 }));
        assert_eq!(inspect_at(&token, at(5_000)), TokenState::Expired);
        assert!(is_expired_at(&token, at(5_000)));
    }

    #[test]
    fn test_exp_equal_to_now_is_expired() {
        let token = token_with_claims(json!({ "exp": 1_000 }));
        assert!(is_expired_at(&token, at(1_000)));

        // One millisecond earlier the token is still good
        let just_before = at(1_000) - chrono::Duration::milliseconds(1);
        assert!(!is_expired_at(&token, just_before));
    }

    #[test]
    fn test_fractional_exp() {
        let token = token_with_claims(json!({ "exp": 1_000.5 }));
        assert!(!is_expired_at(&token, at(1_000)));
        assert!(is_expired_at(&token, at(1_001)));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        let no_exp = token_with_claims(json!({ "sub": 1 }));
        let string_exp = token_with_claims(json!({ "exp": "2099-01-01" }));
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        let array_payload = format!("h.{}.s", URL_SAFE_NO_PAD.encode("[1,2,3]"));
        let valid = token_expiring_in(3600);
        let four_segments = format!("{}.extra", valid);

        for token in [
            "",
            "abc",
            "a.b",
            "a..c",
            ".payload.sig",
            "a.!!!not-base64!!!.c",
            no_exp.as_str(),
            string_exp.as_str(),
            not_json.as_str(),
            array_payload.as_str(),
            four_segments.as_str(),
        ] {
            assert!(is_expired(token), "expected {:?} to be expired", token);
            assert_eq!(inspect_at(token, Utc::now()), TokenState::Opaque);
        }
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": 4_102_444_800i64 }).to_string());
        let padded = format!("h.{}==.s", payload);
        assert!(!is_expired_at(&padded, at(1_000)));
    }

    #[test]
    fn test_empty_signature_is_accepted() {
        let token = token_with_claims(json!({ "exp": 2_000 }));
        let unsigned = format!("{}.", token.rsplit_once('.').map(|(head, _)| head).unwrap_or(""));
        assert_eq!(inspect_at(&unsigned, at(1_000)), TokenState::Live);
    }

    #[test]
    fn test_expires_at() {
        let token = token_with_claims(json!({ "exp": 1_700_000_000 }));
        assert_eq!(expires_at(&token), Some(at(1_700_000_000)));
        assert_eq!(expires_at("opaque-refresh-token"), None);
    }

    #[test]
    fn test_relative_helpers() {
        assert!(!is_expired(&token_expiring_in(3600)));
        assert!(is_expired(&token_expiring_in(-3600)));
    }
}
