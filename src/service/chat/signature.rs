use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::base::types::Res;

type HmacSha1 = Hmac<Sha1>;

/// Header Webex signs webhook bodies into.
pub const SIGNATURE_HEADER: &str = "x-spark-signature";

/// Verifies a Webex webhook signature using constant-time comparison.
///
/// Webex sends `X-Spark-Signature: <hex>`, the HMAC-SHA1 of the raw request body
/// keyed with the webhook secret.
pub fn verify(secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Ok(expected) = hex::decode(signature_header.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Computes the signature Webex would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Res<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).map_err(|e| anyhow::anyhow!("Invalid webhook secret: {e}"))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
