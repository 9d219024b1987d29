//! Wire codec for U2F messages
//!
//! Base64url framing for everything that crosses the browser boundary, the
//! binary layouts of raw registration and signature messages, and the client
//! data JSON the token signs over.

mod client_data;
mod der;
mod raw;

pub use client_data::{ChannelIdKey, ClientData, JwkKey, TYPE_AUTHENTICATE, TYPE_REGISTER};
pub use der::{measure_sequence, DerError};
pub use raw::{
    parse_raw_registration, parse_raw_signature, RawRegistration, RawSignature,
    PUBLIC_KEY_SIZE, RESERVED_BYTE,
};
pub(crate) use raw::{decode_public_key, encode_public_key};

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{Result, U2fError};

/// Decode base64url, with or without trailing padding
///
/// Missing padding is restored before decoding so that inputs produced by
/// either padded or unpadded encoders are accepted.
///
/// # Errors
///
/// Returns `MalformedEncoding` on invalid characters or a truncated group.
pub fn decode_base64url(s: &str) -> Result<Vec<u8>> {
    let missing = (4 - s.len() % 4) % 4;
    let mut padded = String::with_capacity(s.len() + missing);
    padded.push_str(s);
    padded.extend(std::iter::repeat('=').take(missing));

    URL_SAFE
        .decode(padded.as_bytes())
        .map_err(|_| U2fError::MalformedEncoding)
}

/// Encode bytes as base64url without padding
#[must_use]
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Serde adapter for byte fields carried as unpadded base64url strings
pub(crate) mod base64url_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_base64url(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::decode_base64url(&encoded).map_err(|err| D::Error::custom(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_round_trip_all_remainders() {
        for len in 0..=10 {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 37 + 251) as u8).collect();
            let encoded = encode_base64url(&bytes);
            assert!(!encoded.contains('='), "Encoding must strip padding");
            assert_eq!(decode_base64url(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn test_decode_accepts_padded_input() {
        assert_eq!(decode_base64url("YQ==").unwrap(), b"a");
        assert_eq!(decode_base64url("YQ").unwrap(), b"a");
    }

    #[test]
    fn test_decode_uses_url_alphabet() {
        assert_eq!(decode_base64url("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(
            decode_base64url("+/8").unwrap_err(),
            U2fError::MalformedEncoding
        );
    }

    #[test]
    fn test_decode_rejects_truncated_group() {
        // A single trailing character can never encode a whole byte
        assert_eq!(
            decode_base64url("YWJjZ").unwrap_err(),
            U2fError::MalformedEncoding
        );
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        assert_eq!(
            decode_base64url("invalid_base64!@#").unwrap_err(),
            U2fError::MalformedEncoding
        );
    }
}
