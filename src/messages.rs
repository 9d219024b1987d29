//! Browser-facing U2F messages
//!
//! Field names follow the U2F JavaScript API and must not change, hence the
//! `camelCase` renames.

use serde::{Deserialize, Serialize};

/// Protocol version string for every request
pub const U2F_VERSION: &str = "U2F_V2";

/// Single registration request (legacy `u2f.register` form)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub version: String,
    pub challenge: String, // Base64URL-encoded challenge
    pub app_id: String,
}

/// Registration request carrying the keys already bound to this app id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestMessage {
    pub app_id: String,
    pub register_requests: Vec<RegisterChallenge>,
    pub registered_keys: Vec<RegisteredKey>,
}

/// One version/challenge pair inside a `RegisterRequestMessage`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterChallenge {
    pub version: String,
    pub challenge: String, // Base64URL-encoded challenge
}

/// A key the browser may offer to the token
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredKey {
    pub version: String,
    pub key_handle: String, // Base64URL-encoded key handle
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>, // Opaque hints, passed through
}

/// Token response to a registration request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub registration_data: String, // Base64URL-encoded raw registration message
    pub client_data: String,       // Base64URL-encoded client data JSON
}

/// Single sign request for one key (legacy `u2f.sign` form)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub version: String,
    pub challenge: String,  // Base64URL-encoded challenge
    pub key_handle: String, // Base64URL-encoded key handle
    pub app_id: String,
}

/// Authentication request covering every registered key
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignRequestMessage {
    pub app_id: String,
    pub challenge: String, // Base64URL-encoded challenge
    pub registered_keys: Vec<RegisteredKey>,
}

/// Token response to an authentication request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub key_handle: String,     // Base64URL-encoded key handle
    pub signature_data: String, // Base64URL-encoded raw signature message
    pub client_data: String,    // Base64URL-encoded client data JSON
}

/// Trusted facet list for one app id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrustedFacets {
    pub version: FacetVersion,
    pub ids: Vec<String>,
}

/// Version of the trusted facets document
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetVersion {
    pub major: u32,
    pub minor: u32,
}

/// Document served at the app id URL
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrustedFacetsEndpoint {
    pub trusted_facets: Vec<TrustedFacets>,
}

impl TrustedFacets {
    /// Facet list at version 1.0
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            version: FacetVersion { major: 1, minor: 0 },
            ids,
        }
    }
}

impl TrustedFacetsEndpoint {
    /// Endpoint document holding a single facet list
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            trusted_facets: vec![TrustedFacets::new(ids)],
        }
    }
}
