//! Raw registration and signature messages
//!
//! Layouts from the FIDO U2F raw message formats:
//!
//! ```text
//! registration: 0x05 | public key (65) | kh len (1) | key handle | X.509 cert (DER) | ECDSA sig (DER)
//! signature:    user presence (1) | counter (4, big-endian) | ECDSA sig (DER)
//! ```

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;

use super::der::measure_sequence;
use crate::error::{Result, U2fError};

/// Leading byte of every registration message
pub const RESERVED_BYTE: u8 = 0x05;

/// Size of an uncompressed SEC1 P-256 point
pub const PUBLIC_KEY_SIZE: usize = 65;

/// Tag of an uncompressed SEC1 point
const UNCOMPRESSED_POINT: u8 = 0x04;

/// Reserved byte, public key, key handle length, and at least one byte each of
/// key handle, certificate and signature
const MIN_REGISTRATION_SIZE: usize = 1 + PUBLIC_KEY_SIZE + 1 + 1 + 1;

/// User presence byte and counter
const SIGNATURE_HEADER_SIZE: usize = 5;

/// Parsed registration message
///
/// Certificate and signature are kept as the raw DER slices received so the
/// registration signature can be checked over exactly what the token sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRegistration {
    pub public_key: PublicKey,
    pub key_handle: Vec<u8>,
    pub attestation_certificate: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Parsed signature (authentication) message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub user_presence: bool,
    pub counter: u32,
    pub signature: Vec<u8>,
}

/// Parse a raw registration message
///
/// # Errors
///
/// - `TooShort` if the message ends before any required field
/// - `BadReservedByte` if the first byte is not 0x05
/// - `InvalidPublicKey` if the key is not an uncompressed P-256 point
/// - `MalformedCertificate` if the certificate is not a well-formed DER X.509
pub fn parse_raw_registration(data: &[u8]) -> Result<RawRegistration> {
    if data.len() < MIN_REGISTRATION_SIZE {
        return Err(U2fError::TooShort("registration data"));
    }

    if data[0] != RESERVED_BYTE {
        return Err(U2fError::BadReservedByte(data[0]));
    }
    let rest = &data[1..];

    let (key_bytes, rest) = rest.split_at(PUBLIC_KEY_SIZE);
    let public_key = decode_public_key(key_bytes)?;

    let key_handle_len = usize::from(rest[0]);
    let rest = &rest[1..];
    if rest.len() < key_handle_len {
        return Err(U2fError::TooShort("key handle"));
    }
    let (key_handle, rest) = rest.split_at(key_handle_len);

    if rest.is_empty() {
        return Err(U2fError::TooShort("attestation certificate"));
    }

    // No length field precedes the certificate; its size is whatever the DER
    // SEQUENCE header says, and the signature is everything after it.
    let cert_len = measure_sequence(rest)
        .map_err(|err| U2fError::MalformedCertificate(err.to_string()))?;
    let (certificate, signature) = rest.split_at(cert_len);

    openssl::x509::X509::from_der(certificate)
        .map_err(|_| U2fError::MalformedCertificate("invalid X.509 structure".to_string()))?;

    if signature.is_empty() {
        return Err(U2fError::TooShort("registration signature"));
    }

    Ok(RawRegistration {
        public_key,
        key_handle: key_handle.to_vec(),
        attestation_certificate: certificate.to_vec(),
        signature: signature.to_vec(),
    })
}

/// Parse a raw signature message
///
/// # Errors
///
/// - `TooShort` if fewer than 5 bytes are present
/// - `InvalidPresenceByte` if the presence byte is anything but 0 or 1
/// - `InvalidSignature` if the remainder does not start with a DER SEQUENCE
/// - `TrailingData` if bytes follow the DER signature
pub fn parse_raw_signature(data: &[u8]) -> Result<RawSignature> {
    if data.len() < SIGNATURE_HEADER_SIZE {
        return Err(U2fError::TooShort("signature data"));
    }

    let presence = data[0];
    if presence | 1 != 1 {
        return Err(U2fError::InvalidPresenceByte);
    }

    let counter = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);

    let signature = &data[SIGNATURE_HEADER_SIZE..];
    let sig_len = measure_sequence(signature).map_err(|_| U2fError::InvalidSignature)?;
    if sig_len != signature.len() {
        return Err(U2fError::TrailingData);
    }

    Ok(RawSignature {
        user_presence: presence == 1,
        counter,
        signature: signature.to_vec(),
    })
}

/// Decode a 65-byte uncompressed SEC1 point on P-256
pub(crate) fn decode_public_key(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != PUBLIC_KEY_SIZE || bytes[0] != UNCOMPRESSED_POINT {
        return Err(U2fError::InvalidPublicKey);
    }
    PublicKey::from_sec1_bytes(bytes).map_err(|_| U2fError::InvalidPublicKey)
}

/// Encode a P-256 public key as a 65-byte uncompressed SEC1 point
#[must_use]
pub(crate) fn encode_public_key(key: &PublicKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes().to_vec()
}

impl RawRegistration {
    /// Uncompressed SEC1 encoding of the registered public key
    #[must_use]
    pub fn public_key_bytes(&self) -> Vec<u8> {
        encode_public_key(&self.public_key)
    }

    /// Serialise back to the wire layout
    ///
    /// # Errors
    ///
    /// Returns `KeyHandleTooLong` if the key handle does not fit in one length byte.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let key_handle_len = u8::try_from(self.key_handle.len())
            .map_err(|_| U2fError::KeyHandleTooLong(self.key_handle.len()))?;

        let mut buf = Vec::with_capacity(
            1 + PUBLIC_KEY_SIZE
                + 1
                + self.key_handle.len()
                + self.attestation_certificate.len()
                + self.signature.len(),
        );
        buf.push(RESERVED_BYTE);
        buf.extend_from_slice(&self.public_key_bytes());
        buf.push(key_handle_len);
        buf.extend_from_slice(&self.key_handle);
        buf.extend_from_slice(&self.attestation_certificate);
        buf.extend_from_slice(&self.signature);
        Ok(buf)
    }
}

impl RawSignature {
    /// The presence byte and big-endian counter, as covered by the signature
    #[must_use]
    pub fn signed_header(&self) -> [u8; SIGNATURE_HEADER_SIZE] {
        let counter = self.counter.to_be_bytes();
        [
            u8::from(self.user_presence),
            counter[0],
            counter[1],
            counter[2],
            counter[3],
        ]
    }

    /// Serialise back to the wire layout
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SIGNATURE_HEADER_SIZE + self.signature.len());
        buf.extend_from_slice(&self.signed_header());
        buf.extend_from_slice(&self.signature);
        buf
    }
}
