//! Test fixtures built from the recorded vectors
//!
//! Challenges here are backdated by one minute, the way a real server would
//! hold them between issuing a request and receiving the token's answer.

use chrono::{Duration, Utc};
use p256::ecdsa::SigningKey;
use p256::PublicKey;
use rand::rngs::OsRng;

use super::vectors;
use crate::challenge::Challenge;
use crate::codec;
use crate::messages::{RegisterResponse, SignResponse};
use crate::registration::Registration;

/// Central fixture provider for protocol test data
pub struct TestFixtures;

impl TestFixtures {
    /// Challenge whose nonce is the given base64url string, issued a minute ago
    ///
    /// # Panics
    ///
    /// Panics if `nonce` is not valid base64url.
    #[must_use]
    pub fn challenge_with_nonce(
        nonce: &str,
        app_id: &str,
        registered_keys: Vec<Registration>,
    ) -> Challenge {
        Challenge {
            nonce: codec::decode_base64url(nonce).expect("fixture nonce must be base64url"),
            created_at: Utc::now() - Duration::minutes(1),
            app_id: app_id.to_string(),
            trusted_facets: vec![app_id.to_string()],
            registered_keys,
        }
    }

    /// Move a challenge's creation time into the past
    #[must_use]
    pub fn backdated(mut challenge: Challenge, minutes: i64) -> Challenge {
        challenge.created_at = Utc::now() - Duration::minutes(minutes);
        challenge
    }

    /// Registration challenge matching the FIDO example client data
    #[must_use]
    pub fn fido_example_challenge() -> Challenge {
        Self::challenge_with_nonce(
            vectors::FIDO_EXAMPLE_CHALLENGE,
            vectors::FIDO_EXAMPLE_APP_ID,
            vec![],
        )
    }

    /// Registration response wrapping the FIDO example message
    ///
    /// # Panics
    ///
    /// Panics if the embedded hex vector is corrupt.
    #[must_use]
    pub fn fido_example_response() -> RegisterResponse {
        let raw = hex::decode(vectors::FIDO_EXAMPLE_REGISTRATION_HEX)
            .expect("FIDO example vector must be hex");
        RegisterResponse {
            registration_data: codec::encode_base64url(&raw),
            client_data: codec::encode_base64url(vectors::FIDO_EXAMPLE_CLIENT_DATA.as_bytes()),
        }
    }

    /// Registration challenge the hardware token answered
    #[must_use]
    pub fn token_register_challenge() -> Challenge {
        Self::challenge_with_nonce(vectors::TOKEN_REGISTER_CHALLENGE, vectors::TOKEN_APP_ID, vec![])
    }

    /// Registration response recorded from the hardware token
    #[must_use]
    pub fn token_register_response() -> RegisterResponse {
        RegisterResponse {
            registration_data: vectors::TOKEN_REGISTRATION_DATA.to_string(),
            client_data: vectors::TOKEN_REGISTRATION_CLIENT_DATA.to_string(),
        }
    }

    /// Authentication challenge the hardware token answered
    #[must_use]
    pub fn token_sign_challenge(registration: Registration) -> Challenge {
        Self::challenge_with_nonce(
            vectors::TOKEN_SIGN_CHALLENGE,
            vectors::TOKEN_APP_ID,
            vec![registration],
        )
    }

    /// Authentication response recorded from the hardware token
    #[must_use]
    pub fn token_sign_response() -> SignResponse {
        SignResponse {
            key_handle: vectors::TOKEN_KEY_HANDLE.to_string(),
            signature_data: vectors::TOKEN_SIGNATURE_DATA.to_string(),
            client_data: vectors::TOKEN_SIGN_CLIENT_DATA.to_string(),
        }
    }

    /// Registration with a freshly generated key and a fixed key handle
    #[must_use]
    pub fn generated_registration() -> Registration {
        let signing_key = SigningKey::random(&mut OsRng);
        Registration {
            key_handle: b"Fake key handle".to_vec(),
            public_key: PublicKey::from(signing_key.verifying_key()),
            counter: 7,
        }
    }
}

