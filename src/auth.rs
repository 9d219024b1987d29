//! Authentication verification
//!
//! Checks a signed assertion against the challenge it answers and the stored
//! registration it claims to come from, including the use-counter check that
//! detects cloned tokens.

use std::fmt;
use std::str::FromStr;

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;
use crate::codec::{self, ClientData, TYPE_AUTHENTICATE};
use crate::error::{Result, U2fError};
use crate::messages::SignResponse;
use crate::registration::Registration;
use crate::utils::crypto::sha256;

/// How a received counter is compared with the stored one
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CounterPolicy {
    /// Reject only counters lower than the stored value
    #[default]
    RejectDecrease,
    /// Reject counters that do not exceed the stored value
    RequireIncrease,
}

impl CounterPolicy {
    #[must_use]
    pub fn accepts(self, received: u32, stored: u32) -> bool {
        match self {
            Self::RejectDecrease => received >= stored,
            Self::RequireIncrease => received > stored,
        }
    }
}

impl FromStr for CounterPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject-decrease" => Ok(Self::RejectDecrease),
            "require-increase" => Ok(Self::RequireIncrease),
            other => Err(format!("Unknown counter policy: {other}")),
        }
    }
}

impl fmt::Display for CounterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectDecrease => f.write_str("reject-decrease"),
            Self::RequireIncrease => f.write_str("require-increase"),
        }
    }
}

/// Authentication verification options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthenticationConfig {
    pub counter_policy: CounterPolicy,
}

/// Result of a successful authentication
///
/// `registration.counter` already holds the new value; the caller persists
/// the whole registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authentication {
    pub counter: u32,
    pub user_present: bool,
    pub registration: Registration,
}

impl Challenge {
    /// Verify an authentication response with the default counter policy
    ///
    /// # Errors
    ///
    /// See [`Challenge::authenticate_with`].
    pub fn authenticate(
        self,
        response: &SignResponse,
        stored_counter: u32,
    ) -> Result<Authentication> {
        self.authenticate_with(response, stored_counter, &AuthenticationConfig::default())
    }

    /// Verify an authentication response
    ///
    /// The received counter is compared with the larger of `stored_counter`
    /// and the matched registration's own counter. Consumes the challenge; a
    /// failed attempt needs a new one.
    ///
    /// # Errors
    ///
    /// Returns a `U2fError` if:
    /// - The challenge has expired
    /// - No registered key matches the response's key handle
    /// - The response is not valid base64url or the signature data is malformed
    /// - The counter fails the configured policy
    /// - The client data has the wrong type, origin or challenge
    /// - The assertion signature does not verify
    /// - The user presence flag is not set
    pub fn authenticate_with(
        self,
        response: &SignResponse,
        stored_counter: u32,
        config: &AuthenticationConfig,
    ) -> Result<Authentication> {
        // 1. Check the challenge is still within its validity window
        self.ensure_fresh()?;

        // 2. Find the registration the response claims to come from
        let key_handle = response.key_handle.trim_end_matches('=');
        let registration = self
            .registered_keys
            .iter()
            .find(|registration| registration.encoded_key_handle() == key_handle)
            .ok_or(U2fError::UnknownKeyHandle)?;

        // 3. Decode the response fields
        let signature_data = codec::decode_base64url(&response.signature_data)?;
        let client_data_bytes = codec::decode_base64url(&response.client_data)?;

        // 4. Parse the raw signature message
        let raw = codec::parse_raw_signature(&signature_data)?;

        // 5. Anti-replay check before spending time on the signature
        let floor = stored_counter.max(registration.counter);
        if !config.counter_policy.accepts(raw.counter, floor) {
            log::debug!(
                "Counter check failed for app id {} under {} policy",
                self.app_id,
                config.counter_policy
            );
            return Err(U2fError::CounterNotIncreasing {
                received: raw.counter,
                stored: floor,
            });
        }

        // 6. Verify client data against the challenge
        let client_data = ClientData::from_json(&client_data_bytes)?;
        client_data.verify(TYPE_AUTHENTICATE, &self.encoded_nonce(), &self.trusted_facets)?;

        // 7. Verify the assertion signature with the registered key
        let message =
            authentication_signed_data(&self.app_id, &raw.signed_header(), &client_data_bytes);
        let signature =
            Signature::from_der(&raw.signature).map_err(|_| U2fError::InvalidSignature)?;
        VerifyingKey::from(&registration.public_key)
            .verify(&message, &signature)
            .map_err(|_| U2fError::InvalidSignature)?;

        // 8. Require a user presence test
        if !raw.user_presence {
            return Err(U2fError::UserNotPresent);
        }

        // 9. Return the counter the caller must persist
        log::debug!(
            "Authenticated key for app id {} (key handle {} bytes)",
            self.app_id,
            registration.key_handle.len()
        );

        let mut registration = registration.clone();
        registration.counter = raw.counter;
        Ok(Authentication {
            counter: raw.counter,
            user_present: raw.user_presence,
            registration,
        })
    }
}

/// Bytes covered by an authentication signature
///
/// `SHA256(app_id) || user_presence || counter (big-endian) || SHA256(client_data)`
pub(crate) fn authentication_signed_data(
    app_id: &str,
    signed_header: &[u8],
    client_data: &[u8],
) -> Vec<u8> {
    let mut message = Vec::with_capacity(32 + signed_header.len() + 32);
    message.extend_from_slice(&sha256(app_id.as_bytes()));
    message.extend_from_slice(signed_header);
    message.extend_from_slice(&sha256(client_data));
    message
}
