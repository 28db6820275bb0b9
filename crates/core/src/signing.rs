//! HMAC-SHA256 webhook request signatures.
//!
//! Outbound webhook requests carry [`SIGNATURE_HEADER`] so receivers can
//! verify that the body was produced by the holder of their signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature on outbound webhook requests.
pub const SIGNATURE_HEADER: &str = "x-relay-signature";

/// Compute the signature header value for a serialized request body.
///
/// Format: `sha256=<lowercase hex HMAC-SHA256 of the body>`.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    format!("sha256={digest:x}")
}

/// Verify a received signature header value against a body and secret.
///
/// Receivers acknowledge a delivery only after this check passes.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Some(hex) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Some(expected) = decode_hex(hex) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    // Constant-time comparison via the MAC itself.
    mac.verify_slice(&expected).is_ok()
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?".
        let sig = sign_body("Jefe", b"what do ya want for nothing?");
        assert_eq!(
            sig,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let body = br#"{"event_id":1,"type":"project:created"}"#;
        let sig = sign_body("secret", body);
        assert!(verify_signature("secret", body, &sig));
    }

    #[test]
    fn wrong_secret_rejected() {
        let body = b"payload";
        let sig = sign_body("secret", body);
        assert!(!verify_signature("other", body, &sig));
    }

    #[test]
    fn tampered_body_rejected() {
        let sig = sign_body("secret", b"payload");
        assert!(!verify_signature("secret", b"payload!", &sig));
    }

    #[test]
    fn malformed_signature_rejected() {
        assert!(!verify_signature("secret", b"payload", "md5=abcd"));
        assert!(!verify_signature("secret", b"payload", "sha256=nothex"));
        assert!(!verify_signature("secret", b"payload", "sha256=abc"));
    }
}
