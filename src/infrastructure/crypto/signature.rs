//! HMAC-SHA256 signatures for payment gateway payloads
//!
//! The gateway signs the `data` object of a webhook by sorting its keys,
//! joining them as `key=value&key=value` and taking HMAC-SHA256 with the
//! checksum key, hex encoded.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Canonical `k=v&k=v` form of a flat JSON object, keys sorted.
/// `null` becomes the empty string.
pub fn canonical_query(data: &serde_json::Map<String, Value>) -> String {
    let mut keys: Vec<&String> = data.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| {
            let value = match &data[k] {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}={}", k, value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sign(payload: &str, key: &str) -> String {
    match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(mut mac) => {
            mac.update(payload.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        // HMAC accepts keys of any length
        Err(_) => String::new(),
    }
}

/// Constant-time comparison of a hex signature.
pub fn verify(payload: &str, signature: &str, key: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_form_sorts_keys() {
        let data = json!({"orderCode": 123, "amount": 50000, "desc": "Booking", "ref": null});
        let map = data.as_object().unwrap();
        assert_eq!(
            canonical_query(map),
            "amount=50000&desc=Booking&orderCode=123&ref="
        );
    }

    #[test]
    fn signature_round_trip() {
        let payload = "amount=50000&orderCode=123";
        let sig = sign(payload, "checksum-key");
        assert_eq!(sig.len(), 64);
        assert!(verify(payload, &sig, "checksum-key"));
        assert!(!verify(payload, &sig, "other-key"));
        assert!(!verify("amount=1&orderCode=123", &sig, "checksum-key"));
        assert!(!verify(payload, "not-hex", "checksum-key"));
    }
}
