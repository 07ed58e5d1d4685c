//! Stripe wire formats: the `Stripe-Signature` header, event envelopes and
//! the Checkout Session object. Nothing here leaves the adapter.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Oldest signed timestamp accepted, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Allowed clock skew for timestamps ahead of ours.
pub const FUTURE_SKEW_SECS: i64 = 60;

/// Why a webhook signature was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,

    #[error("Unable to extract timestamp from header")]
    MissingTimestamp,

    #[error("Invalid timestamp in header")]
    InvalidTimestamp,

    #[error("No signatures found with expected scheme")]
    MissingV1Signature,

    #[error("Signature is not valid hex")]
    MalformedSignature,

    #[error("Timestamp outside the tolerance zone (too old by {age_secs} seconds)")]
    Stale { age_secs: i64 },

    #[error("Timestamp outside the tolerance zone (signed in the future)")]
    FromFuture,

    #[error("No signatures found matching the expected signature for payload")]
    Mismatch,
}

/// `t=<unix>,v1=<hex>[,v1=<hex>...]`
///
/// Several `v1` entries appear while a signing secret is being rolled; one
/// match is enough. `v0` and unknown schemes are skipped.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        if header.trim().is_empty() {
            return Err(SignatureError::MissingHeader);
        }

        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        let pairs = header
            .split(',')
            .filter_map(|part| part.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()));
        for (key, value) in pairs {
            match key {
                "t" => {
                    let parsed = value.parse().map_err(|_| SignatureError::InvalidTimestamp)?;
                    timestamp = Some(parsed);
                }
                "v1" => {
                    let bytes = hex_decode(value).ok_or(SignatureError::MalformedSignature)?;
                    v1_signatures.push(bytes);
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureError::MissingV1Signature);
        }
        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }

    /// Checks freshness against `now`, then the HMAC in constant time.
    pub fn verify(&self, secret: &[u8], payload: &[u8], now: i64) -> Result<(), SignatureError> {
        let age_secs = now
            .checked_sub(self.timestamp)
            .ok_or(SignatureError::InvalidTimestamp)?;
        if age_secs > SIGNATURE_TOLERANCE_SECS {
            return Err(SignatureError::Stale { age_secs });
        }
        if age_secs < -FUTURE_SKEW_SECS {
            return Err(SignatureError::FromFuture);
        }

        let expected = compute_v1_signature(secret, self.timestamp, payload);
        let matched = self
            .v1_signatures
            .iter()
            .any(|candidate| bool::from(expected.as_slice().ct_eq(candidate.as_slice())));
        if matched {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| std::str::from_utf8(pair).ok().and_then(|s| u8::from_str_radix(s, 16).ok()))
        .collect()
}

/// Lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// HMAC-SHA256 of `"{timestamp}.{payload}"`.
fn compute_v1_signature(secret: &[u8], timestamp: i64, payload: &[u8]) -> Vec<u8> {
    // Any key length is valid for HMAC, so the error arm is unreachable.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret) else {
        return Vec::new();
    };
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// A header value exactly as Stripe would send it for `payload`.
///
/// Lets tests and local tooling deliver signed webhooks.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signature = compute_v1_signature(secret.as_bytes(), timestamp, payload);
    format!("t={},v1={}", timestamp, hex_encode(&signature))
}

/// Envelope of every webhook delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created: i64,
    pub data: StripeEventData,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// Returned by `POST /v1/checkout/sessions` and carried by
/// `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// Gone once the session is complete or expired.
    pub url: Option<String>,
    /// Minor units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_status: Option<String>,
    pub status: Option<String>,
    /// `courseId` and `userId` set at creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub expires_at: Option<i64>,
}

/// Body of a non-2xx API response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"whsec_test";
    const NOW: i64 = 1_704_067_200;

    fn signed(timestamp: i64, payload: &[u8]) -> SignatureHeader {
        SignatureHeader::parse(&signature_header("whsec_test", timestamp, payload)).unwrap()
    }

    #[test]
    fn header_with_one_signature() {
        let parsed = SignatureHeader::parse("t=1704067200,v1=abcdef0123456789").unwrap();

        assert_eq!(parsed.timestamp, NOW);
        assert_eq!(
            parsed.v1_signatures,
            vec![vec![0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89]]
        );
    }

    #[test]
    fn header_keeps_every_v1_and_skips_v0() {
        let parsed = SignatureHeader::parse("t=1,v1=aa,v0=ff,v1=bb").unwrap();
        assert_eq!(parsed.v1_signatures, vec![vec![0xaa], vec![0xbb]]);
    }

    #[test]
    fn malformed_headers_say_what_is_missing() {
        let cases = [
            ("  ", SignatureError::MissingHeader),
            ("v1=abcdef", SignatureError::MissingTimestamp),
            ("t=1704067200,v0=abcdef", SignatureError::MissingV1Signature),
            ("t=yesterday,v1=abcdef", SignatureError::InvalidTimestamp),
            ("t=1,v1=xyz1", SignatureError::MalformedSignature),
            ("t=1,v1=abc", SignatureError::MalformedSignature),
            ("t=1,v1=é1", SignatureError::MalformedSignature),
        ];
        for (header, expected) in cases {
            assert_eq!(SignatureHeader::parse(header).unwrap_err(), expected, "{header}");
        }
    }

    #[test]
    fn fresh_signature_verifies() {
        let payload = br#"{"id":"evt_test"}"#;
        assert_eq!(signed(NOW, payload).verify(SECRET, payload, NOW), Ok(()));
        assert_eq!(signed(NOW + 30, payload).verify(SECRET, payload, NOW), Ok(()));
    }

    #[test]
    fn wrong_secret_or_edited_body_mismatch() {
        let header = signed(NOW, br#"{"amount":1}"#);
        assert_eq!(
            header.verify(b"other", br#"{"amount":1}"#, NOW),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            header.verify(SECRET, br#"{"amount":9}"#, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn any_matching_v1_is_enough() {
        let payload = b"{}";
        let good = signature_header("whsec_test", NOW, payload);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header =
            SignatureHeader::parse(&format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_sig))
                .unwrap();

        assert_eq!(header.verify(SECRET, payload, NOW), Ok(()));
    }

    #[test]
    fn timestamps_outside_tolerance_are_rejected() {
        let payload = b"{}";
        assert_eq!(
            signed(NOW - 600, payload).verify(SECRET, payload, NOW),
            Err(SignatureError::Stale { age_secs: 600 })
        );
        assert_eq!(
            signed(NOW + 120, payload).verify(SECRET, payload, NOW),
            Err(SignatureError::FromFuture)
        );
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        for header in [
            format!("t={},v1=00", i64::MIN),
            format!("t={},v1=00", i64::MAX),
        ] {
            let parsed = SignatureHeader::parse(&header).unwrap();
            assert!(parsed.verify(SECRET, b"{}", NOW).is_err(), "{header}");
        }
        let parsed = SignatureHeader::parse(&format!("t={},v1=00", i64::MIN)).unwrap();
        assert_eq!(
            parsed.verify(SECRET, b"{}", NOW),
            Err(SignatureError::InvalidTimestamp)
        );
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(hex_encode(&[]), "");
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xff]), "000fff");
        assert_eq!(compute_v1_signature(b"k", 1, b"p").len(), 32);
    }

    #[test]
    fn completed_event_carries_session_metadata() {
        let json = r#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "livemode": false,
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "object": "checkout.session",
                    "amount_total": 50000,
                    "currency": "pkr",
                    "payment_status": "paid",
                    "status": "complete",
                    "url": null,
                    "metadata": {"courseId": "c1", "userId": "u1"}
                }
            }
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");

        let session: StripeCheckoutSession = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.amount_total, Some(50000));
        assert_eq!(session.metadata.get("courseId").map(String::as_str), Some("c1"));
        assert!(session.url.is_none());
    }

    #[test]
    fn created_session_without_metadata() {
        let session: StripeCheckoutSession =
            serde_json::from_str(r#"{"id":"cs_1","url":"https://checkout.stripe.com/c/pay/cs_1"}"#)
                .unwrap();
        assert!(session.metadata.is_empty());
        assert_eq!(
            session.url.as_deref(),
            Some("https://checkout.stripe.com/c/pay/cs_1")
        );
    }

    #[test]
    fn api_error_envelope() {
        let body = r#"{"error":{"type":"invalid_request_error","code":"parameter_invalid_integer","message":"Invalid integer"}}"#;
        let parsed: StripeErrorResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.error.error_type.as_deref(), Some("invalid_request_error"));
        assert_eq!(parsed.error.code.as_deref(), Some("parameter_invalid_integer"));
    }
}
