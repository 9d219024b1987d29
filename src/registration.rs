//! Registration records
//!
//! A token enrolment yields an [`Enrollment`], which still carries the
//! attestation certificate. Long-term storage only needs the [`Registration`]
//! inside it. [`RegistrationRecord`] is the flat, string-typed form callers map
//! into their own storage types.

use p256::PublicKey;
use serde::{Deserialize, Serialize};

use crate::codec::{self, base64url_bytes};
use crate::error::{Result, U2fError};
use crate::messages::{RegisteredKey, U2F_VERSION};

/// One key bound to one app id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    #[serde(with = "base64url_bytes")]
    pub key_handle: Vec<u8>,
    #[serde(with = "public_key_base64url")]
    pub public_key: PublicKey,
    pub counter: u32,
}

/// Result of a successful registration, before the certificate is dropped
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Enrollment {
    pub registration: Registration,
    #[serde(with = "base64url_bytes")]
    pub attestation_certificate: Vec<u8>, // DER
}

/// Canonical storage fields, all strings base64url-encoded
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub key_handle: String,
    pub public_key: String, // Uncompressed SEC1 point
    pub counter: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>, // DER attestation certificate
}

impl Registration {
    /// Base64url-encoded key handle, as it appears in requests and responses
    #[must_use]
    pub fn encoded_key_handle(&self) -> String {
        codec::encode_base64url(&self.key_handle)
    }

    /// Uncompressed SEC1 encoding of the public key
    #[must_use]
    pub fn public_key_bytes(&self) -> Vec<u8> {
        codec::encode_public_key(&self.public_key)
    }

    /// Entry for the `registeredKeys` list of a request
    #[must_use]
    pub fn registered_key(&self, app_id: &str) -> RegisteredKey {
        RegisteredKey {
            version: U2F_VERSION.to_string(),
            key_handle: self.encoded_key_handle(),
            app_id: app_id.to_string(),
            transports: None,
        }
    }

    /// Flat storage form without a certificate
    #[must_use]
    pub fn to_record(&self) -> RegistrationRecord {
        RegistrationRecord {
            key_handle: self.encoded_key_handle(),
            public_key: codec::encode_base64url(&self.public_key_bytes()),
            counter: self.counter,
            certificate: None,
        }
    }
}

impl Enrollment {
    /// Drop the attestation certificate, keeping what authentication needs
    #[must_use]
    pub fn into_registration(self) -> Registration {
        self.registration
    }

    /// Flat storage form including the certificate
    #[must_use]
    pub fn to_record(&self) -> RegistrationRecord {
        RegistrationRecord {
            certificate: Some(codec::encode_base64url(&self.attestation_certificate)),
            ..self.registration.to_record()
        }
    }
}

impl TryFrom<&RegistrationRecord> for Registration {
    type Error = U2fError;

    fn try_from(record: &RegistrationRecord) -> Result<Self> {
        let key_handle = codec::decode_base64url(&record.key_handle)
            .map_err(|_| U2fError::MalformedRecord("key handle"))?;
        if key_handle.len() > usize::from(u8::MAX) {
            return Err(U2fError::KeyHandleTooLong(key_handle.len()));
        }

        let key_bytes = codec::decode_base64url(&record.public_key)
            .map_err(|_| U2fError::MalformedRecord("public key"))?;
        let public_key = codec::decode_public_key(&key_bytes)?;

        Ok(Self {
            key_handle,
            public_key,
            counter: record.counter,
        })
    }
}

impl TryFrom<RegistrationRecord> for Registration {
    type Error = U2fError;

    fn try_from(record: RegistrationRecord) -> Result<Self> {
        Self::try_from(&record)
    }
}

impl TryFrom<&RegistrationRecord> for Enrollment {
    type Error = U2fError;

    fn try_from(record: &RegistrationRecord) -> Result<Self> {
        let registration = Registration::try_from(record)?;
        let encoded = record
            .certificate
            .as_deref()
            .ok_or(U2fError::MalformedRecord("certificate missing"))?;
        let attestation_certificate = codec::decode_base64url(encoded)
            .map_err(|_| U2fError::MalformedRecord("certificate"))?;

        openssl::x509::X509::from_der(&attestation_certificate)
            .map_err(|_| U2fError::MalformedCertificate("invalid X.509 structure".to_string()))?;

        Ok(Self {
            registration,
            attestation_certificate,
        })
    }
}

/// Serde adapter storing a P-256 key as a base64url uncompressed point
mod public_key_base64url {
    use p256::PublicKey;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::codec;

    pub fn serialize<S: Serializer>(key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&codec::encode_base64url(&codec::encode_public_key(key)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PublicKey, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = codec::decode_base64url(&encoded).map_err(|err| D::Error::custom(err.to_string()))?;
        codec::decode_public_key(&bytes).map_err(|err| D::Error::custom(err.to_string()))
    }
}
