use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// HMAC-SHA256 signing and verification for webhook bodies.
///
/// Without a secret, verification is disabled and every signature is accepted.
#[derive(Clone, Default)]
pub struct WebhookSigner {
    secret: Option<String>,
}

impl WebhookSigner {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    fn mac(secret: &str, body: &[u8]) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(body);
        mac
    }

    /// Hex HMAC of `body`, or `None` when no secret is configured
    pub fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_deref()?;
        Some(hex::encode(Self::mac(secret, body).finalize().into_bytes()))
    }

    /// Constant-time check of `signature` (optionally `sha256=` prefixed)
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };

        let signature = signature.trim();
        let hex_digest = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
        let Ok(expected) = hex::decode(hex_digest) else {
            return false;
        };

        Self::mac(secret, body).verify_slice(&expected).is_ok()
    }
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSigner")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event":"content_updated","targets":["local"]}"#;

    #[test]
    fn test_signature_round_trip() {
        let signer = WebhookSigner::new(Some("s3cr3t".into()));
        let signature = signer.sign(BODY).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signer.verify(BODY, &signature));
        assert!(signer.verify(BODY, &format!("sha256={}", signature)));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = WebhookSigner::new(Some("s3cr3t".into()));
        assert_eq!(signer.sign(BODY), signer.sign(BODY));
    }

    #[test]
    fn test_flipping_a_byte_fails_verification() {
        let signer = WebhookSigner::new(Some("s3cr3t".into()));
        let signature = signer.sign(BODY).unwrap();

        let mut tampered = BODY.to_vec();
        tampered[3] ^= 0x01;
        assert!(!signer.verify(&tampered, &signature));
    }

    #[test]
    fn test_wrong_secret_and_garbage_are_rejected() {
        let signer = WebhookSigner::new(Some("s3cr3t".into()));
        let other = WebhookSigner::new(Some("other".into()));
        let signature = other.sign(BODY).unwrap();
        assert!(!signer.verify(BODY, &signature));
        assert!(!signer.verify(BODY, "not-hex"));
        assert!(!signer.verify(BODY, ""));
    }

    #[test]
    fn test_disabled_without_secret() {
        let signer = WebhookSigner::new(None);
        assert!(!signer.is_enabled());
        assert!(signer.sign(BODY).is_none());
        assert!(signer.verify(BODY, "anything"));
        assert!(signer.verify(b"", ""));

        // an empty secret counts as unset
        assert!(!WebhookSigner::new(Some(String::new())).is_enabled());
    }
}
