//! Challenge manager
//!
//! A [`Challenge`] is the per-transaction state of one registration or
//! authentication attempt. The caller stores it (typically in a server-side
//! session) between building the request and verifying the response. Both
//! verification entry points take it by value, so it cannot be used twice.

use chrono::{DateTime, Duration, Utc};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::codec::{self, base64url_bytes};
use crate::error::{Result, U2fError};
use crate::messages::{
    RegisterChallenge, RegisterRequest, RegisterRequestMessage, RegisteredKey, SignRequest,
    SignRequestMessage, U2F_VERSION,
};
use crate::registration::Registration;
use crate::utils::crypto;

/// How long a challenge stays valid after it is created, in seconds
pub const CHALLENGE_TIMEOUT_SECS: i64 = 5 * 60;

/// State of one registration or authentication transaction
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Challenge {
    #[serde(with = "base64url_bytes")]
    pub nonce: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub app_id: String,
    pub trusted_facets: Vec<String>,
    #[serde(default)]
    pub registered_keys: Vec<Registration>,
}

impl Challenge {
    /// Create a challenge with a fresh 32-byte nonce from the OS random source
    ///
    /// # Errors
    ///
    /// Returns `InsufficientRandomness` if the random source fails.
    pub fn new(
        app_id: &str,
        trusted_facets: &[String],
        registered_keys: Vec<Registration>,
    ) -> Result<Self> {
        let nonce = crypto::generate_challenge()?;
        Ok(Self::with_nonce(&nonce, app_id, trusted_facets, registered_keys))
    }

    /// Create a challenge drawing the nonce from `rng`
    ///
    /// # Errors
    ///
    /// Returns `InsufficientRandomness` if `rng` cannot supply 32 bytes.
    pub fn new_with_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
        app_id: &str,
        trusted_facets: &[String],
        registered_keys: Vec<Registration>,
    ) -> Result<Self> {
        let nonce = crypto::generate_challenge_with(rng)?;
        Ok(Self::with_nonce(&nonce, app_id, trusted_facets, registered_keys))
    }

    fn with_nonce(
        nonce: &[u8],
        app_id: &str,
        trusted_facets: &[String],
        registered_keys: Vec<Registration>,
    ) -> Self {
        log::debug!(
            "Issued challenge for app id {app_id} with {} registered key(s)",
            registered_keys.len()
        );
        Self {
            nonce: nonce.to_vec(),
            created_at: Utc::now(),
            app_id: app_id.to_string(),
            trusted_facets: trusted_facets.to_vec(),
            registered_keys,
        }
    }

    /// Nonce as sent to the browser
    #[must_use]
    pub fn encoded_nonce(&self) -> String {
        codec::encode_base64url(&self.nonce)
    }

    /// Whether the validity window has passed at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.created_at) > Duration::seconds(CHALLENGE_TIMEOUT_SECS)
    }

    /// Fail with `ChallengeExpired` once the validity window has passed
    pub(crate) fn ensure_fresh(&self) -> Result<()> {
        if self.is_expired_at(Utc::now()) {
            log::debug!("Challenge for app id {} expired", self.app_id);
            return Err(U2fError::ChallengeExpired);
        }
        Ok(())
    }

    /// Single registration request (legacy form)
    #[must_use]
    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            version: U2F_VERSION.to_string(),
            challenge: self.encoded_nonce(),
            app_id: self.app_id.clone(),
        }
    }

    /// Registration request listing the keys already bound to this app id
    ///
    /// The token refuses to enrol again if it recognises one of the listed
    /// key handles.
    #[must_use]
    pub fn registration_request(&self) -> RegisterRequestMessage {
        RegisterRequestMessage {
            app_id: self.app_id.clone(),
            register_requests: vec![RegisterChallenge {
                version: U2F_VERSION.to_string(),
                challenge: self.encoded_nonce(),
            }],
            registered_keys: self.registered_key_entries(),
        }
    }

    /// Sign request for a single registered key (legacy form)
    #[must_use]
    pub fn sign_request(&self, registration: &Registration) -> SignRequest {
        SignRequest {
            version: U2F_VERSION.to_string(),
            challenge: self.encoded_nonce(),
            key_handle: registration.encoded_key_handle(),
            app_id: self.app_id.clone(),
        }
    }

    /// Authentication request any of the registered keys may answer
    #[must_use]
    pub fn authentication_request(&self) -> SignRequestMessage {
        SignRequestMessage {
            app_id: self.app_id.clone(),
            challenge: self.encoded_nonce(),
            registered_keys: self.registered_key_entries(),
        }
    }

    fn registered_key_entries(&self) -> Vec<RegisteredKey> {
        self.registered_keys
            .iter()
            .map(|registration| registration.registered_key(&self.app_id))
            .collect()
    }
}
