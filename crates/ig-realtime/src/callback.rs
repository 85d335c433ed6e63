//! Helpers for the subscriber side of the real-time protocol
//!
//! The API calls the subscription's `callback_url` twice over its lifetime:
//!
//! - once with a `GET` carrying `hub.mode`, `hub.challenge` and
//!   `hub.verify_token` while the subscription is being created; the
//!   challenge must be echoed back as the response body;
//! - with a `POST` per batch of changes, signed with an `X-Hub-Signature`
//!   header holding the hex HMAC-SHA1 of the raw body keyed with the client
//!   secret.
//!
//! ```rust
//! use ig_realtime::callback::CallbackValidator;
//!
//! let validator = CallbackValidator::new("client-secret");
//! let body = br#"[{"subscription_id":1,"object":"tag","object_id":"nofilter","changed_aspect":"media","time":1297286541}]"#;
//!
//! let signature = validator.compute_signature(body);
//! assert!(validator.validate(&signature, body).is_ok());
//! ```

use crate::error::{Error, Result};
use crate::models::{
    optional_string_or_number, string_or_number, SubscriptionAspect, SubscriptionObject,
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Header name for the notification signature
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

pub const MODE_PARAM: &str = "hub.mode";
pub const CHALLENGE_PARAM: &str = "hub.challenge";
pub const VERIFY_TOKEN_PARAM: &str = "hub.verify_token";

/// Answer a subscription challenge.
///
/// `get_param` looks up the callback's query parameters. When
/// `expected_verify_token` is given, the request must carry the same token.
/// Returns the challenge to send back as the response body.
pub fn verify_challenge<F>(get_param: F, expected_verify_token: Option<&str>) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match get_param(MODE_PARAM) {
        Some(mode) if mode == "subscribe" => {}
        Some(mode) => {
            return Err(Error::InvalidChallenge(format!("unexpected mode {mode:?}")));
        }
        None => return Err(Error::InvalidChallenge(format!("missing {MODE_PARAM}"))),
    }

    if let Some(expected) = expected_verify_token {
        let token = get_param(VERIFY_TOKEN_PARAM).unwrap_or_default();
        if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
            return Err(Error::InvalidChallenge("verify token mismatch".to_string()));
        }
    }

    get_param(CHALLENGE_PARAM)
        .filter(|challenge| !challenge.is_empty())
        .ok_or_else(|| Error::InvalidChallenge(format!("missing {CHALLENGE_PARAM}")))
}

/// Validator for signed notification callbacks
pub struct CallbackValidator {
    secret: Vec<u8>,
}

impl CallbackValidator {
    /// Create a validator keyed with the application's client secret
    pub fn new(client_secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: client_secret.as_ref().to_vec(),
        }
    }

    /// Validate a notification body against its signature header
    pub fn validate(&self, signature: &str, body: &[u8]) -> Result<()> {
        let signature = hex::decode(signature.trim())
            .map_err(|e| Error::InvalidSignature(format!("Signature is not hex: {e}")))?;

        self.mac(body)
            .verify_slice(&signature)
            .map_err(|_| Error::InvalidSignature("Signature mismatch".into()))
    }

    /// Lower-case hex HMAC-SHA1 of `body`
    pub fn compute_signature(&self, body: &[u8]) -> String {
        hex::encode(self.mac(body).finalize().into_bytes())
    }

    fn mac(&self, body: &[u8]) -> HmacSha1 {
        let mut mac =
            HmacSha1::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(body);
        mac
    }

    /// Extract the signature from a header lookup
    pub fn signature_from_headers<F>(get_header: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        get_header(SIGNATURE_HEADER)
            .ok_or_else(|| Error::MissingHeader(SIGNATURE_HEADER.to_string()))
    }
}

/// One change reported to the callback URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "string_or_number")]
    pub subscription_id: String,
    pub object: SubscriptionObject,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub object_id: Option<String>,
    pub changed_aspect: SubscriptionAspect,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
}

/// Parse a notification batch posted to the callback URL
pub fn parse_notifications(body: &[u8]) -> Result<Vec<Notification>> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_challenge_echoed() {
        let challenge = verify_challenge(
            params(&[
                (MODE_PARAM, "subscribe"),
                (CHALLENGE_PARAM, "15f7d1a91c1f40f8a748fd134752feb3"),
                (VERIFY_TOKEN_PARAM, "myVerifyToken"),
            ]),
            Some("myVerifyToken"),
        )
        .unwrap();

        assert_eq!(challenge, "15f7d1a91c1f40f8a748fd134752feb3");
    }

    #[test]
    fn test_challenge_without_expected_token() {
        let challenge =
            verify_challenge(params(&[(MODE_PARAM, "subscribe"), (CHALLENGE_PARAM, "abc")]), None)
                .unwrap();
        assert_eq!(challenge, "abc");
    }

    #[test]
    fn test_challenge_token_mismatch() {
        let result = verify_challenge(
            params(&[
                (MODE_PARAM, "subscribe"),
                (CHALLENGE_PARAM, "abc"),
                (VERIFY_TOKEN_PARAM, "other"),
            ]),
            Some("mine"),
        );
        assert!(matches!(result, Err(Error::InvalidChallenge(_))));
    }

    #[test]
    fn test_challenge_requires_subscribe_mode() {
        let wrong_mode = verify_challenge(
            params(&[(MODE_PARAM, "unsubscribe"), (CHALLENGE_PARAM, "abc")]),
            None,
        );
        assert!(matches!(wrong_mode, Err(Error::InvalidChallenge(_))));

        let no_mode = verify_challenge(params(&[(CHALLENGE_PARAM, "abc")]), None);
        assert!(matches!(no_mode, Err(Error::InvalidChallenge(_))));
    }

    #[test]
    fn test_challenge_missing() {
        let result = verify_challenge(params(&[(MODE_PARAM, "subscribe")]), None);
        assert!(matches!(result, Err(Error::InvalidChallenge(ref m)) if m.contains(CHALLENGE_PARAM)));
    }

    #[test]
    fn test_known_signature() {
        // RFC 2202 test case 2
        let validator = CallbackValidator::new("Jefe");
        assert_eq!(
            validator.compute_signature(b"what do ya want for nothing?"),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_validate_signature() {
        let validator = CallbackValidator::new("test-secret");
        let body = b"[]";

        let signature = validator.compute_signature(body);

        assert!(validator.validate(&signature, body).is_ok());
        assert!(validator.validate(&signature.to_uppercase(), body).is_ok());
        assert!(validator.validate(&format!(" {signature}\n"), body).is_ok());
        assert!(matches!(
            validator.validate(&signature, b"[{}]"),
            Err(Error::InvalidSignature(_))
        ));
        assert!(matches!(
            validator.validate("invalid-signature", body),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_from_headers() {
        let present = CallbackValidator::signature_from_headers(params(&[(SIGNATURE_HEADER, "abc")]));
        assert_eq!(present.unwrap(), "abc");

        let missing = CallbackValidator::signature_from_headers(params(&[]));
        assert!(matches!(missing, Err(Error::MissingHeader(_))));
    }

    #[test]
    fn test_parse_notifications() {
        let body = br#"[
            {"subscription_id": "1", "object": "user", "object_id": "1234", "changed_aspect": "media", "time": 1297286541},
            {"subscription_id": 2, "object": "tag", "object_id": "nofilter", "changed_aspect": "media", "time": 1297286541},
            {"subscription_id": 3, "object": "location", "object_id": 1257285, "changed_aspect": "media", "time": 1297286541}
        ]"#;

        let notifications = parse_notifications(body).unwrap();

        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications[0].object, SubscriptionObject::User);
        assert_eq!(notifications[1].subscription_id, "2");
        assert_eq!(notifications[1].object_id.as_deref(), Some("nofilter"));
        assert_eq!(notifications[2].object_id.as_deref(), Some("1257285"));
        assert_eq!(notifications[0].time.timestamp(), 1297286541);
    }

    #[test]
    fn test_parse_notifications_rejects_garbage() {
        assert!(matches!(parse_notifications(b"not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_validate_rejects_truncated_signature() {
        let validator = CallbackValidator::new("test-secret");
        let body = b"[]";

        let signature = validator.compute_signature(body);

        assert!(matches!(
            validator.validate(&signature[..signature.len() - 2], body),
            Err(Error::InvalidSignature(ref m)) if m == "Signature mismatch"
        ));
        assert!(matches!(
            validator.validate("", body),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_challenge_token_prefix_rejected() {
        let result = verify_challenge(
            params(&[
                (MODE_PARAM, "subscribe"),
                (CHALLENGE_PARAM, "abc"),
                (VERIFY_TOKEN_PARAM, "min"),
            ]),
            Some("mine"),
        );
        assert!(matches!(result, Err(Error::InvalidChallenge(_))));
    }
}
