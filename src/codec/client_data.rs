//! Client data JSON
//!
//! The browser builds this object, hashes it, and passes the hash to the token,
//! so the signature binds the challenge to the origin the browser saw.

use serde::{Deserialize, Serialize};

use crate::error::{Result, U2fError};
use crate::utils::crypto::constant_time_eq;

/// `typ` tag of registration client data
pub const TYPE_REGISTER: &str = "navigator.id.finishEnrollment";

/// `typ` tag of authentication client data
pub const TYPE_AUTHENTICATE: &str = "navigator.id.getAssertion";

/// Client data as returned by the browser
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientData {
    pub typ: String,
    pub challenge: String, // Base64URL-encoded challenge
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid_pubkey: Option<ChannelIdKey>,
}

/// TLS channel ID reported by the browser
///
/// Browsers without channel ID support send an empty string (or omit the
/// field); the value is passed through and never checked.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChannelIdKey {
    Key(JwkKey),
    Unused(String),
}

/// Channel ID public key in JWK form
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JwkKey {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl ClientData {
    /// Create client data without a channel ID
    #[must_use]
    pub fn new(typ: &str, challenge: &str, origin: &str) -> Self {
        Self {
            typ: typ.to_string(),
            challenge: challenge.to_string(),
            origin: origin.to_string(),
            cid_pubkey: None,
        }
    }

    /// Parse client data from the decoded JSON bytes
    ///
    /// # Errors
    ///
    /// Returns `MalformedClientData` if the JSON is invalid or a required field is missing.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| U2fError::MalformedClientData(err.to_string()))
    }

    /// Serialise to JSON bytes
    ///
    /// # Errors
    ///
    /// Returns `MalformedClientData` if serialisation fails.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| U2fError::MalformedClientData(err.to_string()))
    }

    /// Check type, origin and challenge against what the server issued
    ///
    /// Origins must match a trusted facet exactly. The challenge comparison is
    /// constant-time.
    ///
    /// # Errors
    ///
    /// Returns `ClientDataTypeMismatch`, `UntrustedOrigin` or `ChallengeMismatch`.
    pub fn verify(
        &self,
        expected_type: &'static str,
        expected_challenge: &str,
        trusted_facets: &[String],
    ) -> Result<()> {
        if self.typ != expected_type {
            return Err(U2fError::ClientDataTypeMismatch {
                expected: expected_type,
            });
        }

        if !trusted_facets.iter().any(|facet| *facet == self.origin) {
            return Err(U2fError::UntrustedOrigin(self.origin.clone()));
        }

        if !constant_time_eq(self.challenge.as_bytes(), expected_challenge.as_bytes()) {
            return Err(U2fError::ChallengeMismatch);
        }

        Ok(())
    }
}
