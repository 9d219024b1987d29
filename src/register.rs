//! Registration verification
//!
//! Checks a token's enrolment response against the challenge it answers and
//! produces the [`Enrollment`] the caller persists. Nothing is stored here.

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::sign::Verifier;
use openssl::x509::X509;

use crate::attestation::AttestationTrust;
use crate::challenge::Challenge;
use crate::codec::{self, ClientData, RawRegistration, TYPE_REGISTER};
use crate::error::{Result, U2fError};
use crate::messages::RegisterResponse;
use crate::registration::{Enrollment, Registration};
use crate::utils::crypto::sha256;

/// Leading byte of the registration signature payload
const REGISTRATION_SIGNATURE_PREFIX: u8 = 0x00;

/// How attestation certificates are judged during registration
#[derive(Clone, Debug, Default)]
pub struct RegistrationConfig {
    /// Accept any attestation certificate without checking its chain
    pub skip_attestation_check: bool,
    /// Roots an attestation certificate must chain to
    pub trust: AttestationTrust,
}

impl RegistrationConfig {
    /// Require attestation certificates to chain to `trust`
    #[must_use]
    pub fn with_trust(trust: AttestationTrust) -> Self {
        Self {
            skip_attestation_check: false,
            trust,
        }
    }

    /// Accept any attestation certificate
    #[must_use]
    pub fn skip_attestation() -> Self {
        Self {
            skip_attestation_check: true,
            trust: AttestationTrust::new(),
        }
    }
}

impl Challenge {
    /// Verify a registration response and produce the new enrolment
    ///
    /// Consumes the challenge; a failed attempt needs a new one.
    ///
    /// # Errors
    ///
    /// Returns a `U2fError` if:
    /// - The challenge has expired
    /// - The response is not valid base64url or the raw message is malformed
    /// - The client data has the wrong type, origin or challenge
    /// - The attestation certificate is not trusted (unless the check is skipped)
    /// - The registration signature does not verify
    pub fn register(
        self,
        response: &RegisterResponse,
        config: &RegistrationConfig,
    ) -> Result<Enrollment> {
        // 1. Check the challenge is still within its validity window
        self.ensure_fresh()?;

        // 2. Decode the response fields
        let registration_data = codec::decode_base64url(&response.registration_data)?;
        let client_data_bytes = codec::decode_base64url(&response.client_data)?;

        // 3. Parse the raw registration message
        let raw = codec::parse_raw_registration(&registration_data)?;

        // 4. Verify client data against the challenge
        let client_data = ClientData::from_json(&client_data_bytes)?;
        client_data.verify(TYPE_REGISTER, &self.encoded_nonce(), &self.trusted_facets)?;

        // 5. Verify the attestation certificate chain
        if config.skip_attestation_check {
            log::debug!("Attestation check skipped for app id {}", self.app_id);
        } else {
            config.trust.verify(&raw.attestation_certificate)?;
        }

        // 6. Verify the registration signature with the attestation key
        verify_registration_signature(&raw, &self.app_id, &client_data_bytes)?;

        // 7. Hand the new registration back to the caller
        log::debug!(
            "Registered key for app id {} (key handle {} bytes)",
            self.app_id,
            raw.key_handle.len()
        );

        Ok(Enrollment {
            registration: Registration {
                key_handle: raw.key_handle,
                public_key: raw.public_key,
                counter: 0,
            },
            attestation_certificate: raw.attestation_certificate,
        })
    }
}

/// Verify the token's signature over a registration
///
/// The signature covers
/// `0x00 || SHA256(app_id) || SHA256(client_data) || key_handle || public_key`
/// and is made with the key in the attestation certificate.
///
/// # Errors
///
/// - `MalformedCertificate` if the certificate or its key cannot be read, or
///   the key is not a P-256 ECDSA key
/// - `InvalidSignature` if the signature is malformed or does not verify
pub fn verify_registration_signature(
    raw: &RawRegistration,
    app_id: &str,
    client_data: &[u8],
) -> Result<()> {
    let cert = X509::from_der(&raw.attestation_certificate)
        .map_err(|_| U2fError::MalformedCertificate("invalid X.509 structure".to_string()))?;
    let key = cert
        .public_key()
        .map_err(|_| U2fError::MalformedCertificate("unreadable public key".to_string()))?;
    let ec_key = key
        .ec_key()
        .map_err(|_| U2fError::MalformedCertificate("public key is not ECDSA".to_string()))?;
    if ec_key.group().curve_name() != Some(Nid::X9_62_PRIME256V1) {
        return Err(U2fError::MalformedCertificate(
            "public key is not on P-256".to_string(),
        ));
    }

    let message = registration_signed_data(
        app_id,
        client_data,
        &raw.key_handle,
        &raw.public_key_bytes(),
    );

    let mut verifier = Verifier::new(MessageDigest::sha256(), &key)?;
    verifier.update(&message)?;
    match verifier.verify(&raw.signature) {
        Ok(true) => Ok(()),
        _ => Err(U2fError::InvalidSignature),
    }
}

/// Bytes covered by a registration signature
pub(crate) fn registration_signed_data(
    app_id: &str,
    client_data: &[u8],
    key_handle: &[u8],
    public_key: &[u8],
) -> Vec<u8> {
    let mut message = Vec::with_capacity(1 + 32 + 32 + key_handle.len() + public_key.len());
    message.push(REGISTRATION_SIGNATURE_PREFIX);
    message.extend_from_slice(&sha256(app_id.as_bytes()));
    message.extend_from_slice(&sha256(client_data));
    message.extend_from_slice(key_handle);
    message.extend_from_slice(public_key);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{vectors, TestFixtures};
    use crate::virtual_key::VirtualKey;
    use openssl::asn1::Asn1Time;
    use openssl::ec::{EcGroup, EcKey};
    use openssl::pkey::{PKey, Private};
    use openssl::rsa::Rsa;
    use openssl::sign::Signer;
    use openssl::x509::X509NameBuilder;

    /// Flip the lowest bit of the last signature byte in a registration response
    fn corrupt_signature(response: &RegisterResponse) -> RegisterResponse {
        let mut data = codec::decode_base64url(&response.registration_data).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        RegisterResponse {
            registration_data: codec::encode_base64url(&data),
            client_data: response.client_data.clone(),
        }
    }

    #[test]
    fn test_fido_example_signature_verifies() {
        let data = hex::decode(vectors::FIDO_EXAMPLE_REGISTRATION_HEX).unwrap();
        let raw = codec::parse_raw_registration(&data).unwrap();

        verify_registration_signature(
            &raw,
            vectors::FIDO_EXAMPLE_APP_ID,
            vectors::FIDO_EXAMPLE_CLIENT_DATA.as_bytes(),
        )
        .unwrap();

        assert_eq!(
            verify_registration_signature(
                &raw,
                "http://example.org",
                vectors::FIDO_EXAMPLE_CLIENT_DATA.as_bytes(),
            )
            .unwrap_err(),
            U2fError::InvalidSignature
        );
    }

    #[test]
    fn test_register_fido_example() {
        let enrollment = TestFixtures::fido_example_challenge()
            .register(
                &TestFixtures::fido_example_response(),
                &RegistrationConfig::skip_attestation(),
            )
            .unwrap();

        assert_eq!(
            hex::encode(&enrollment.registration.key_handle),
            vectors::FIDO_EXAMPLE_KEY_HANDLE_HEX
        );
        assert_eq!(
            hex::encode(enrollment.registration.public_key_bytes()),
            vectors::FIDO_EXAMPLE_PUBLIC_KEY_HEX
        );
        assert_eq!(
            hex::encode(&enrollment.attestation_certificate),
            vectors::FIDO_EXAMPLE_CERTIFICATE_HEX
        );
        assert_eq!(enrollment.registration.counter, 0);
    }

    #[test]
    fn test_register_recorded_token() {
        let enrollment = TestFixtures::token_register_challenge()
            .register(
                &TestFixtures::token_register_response(),
                &RegistrationConfig::skip_attestation(),
            )
            .unwrap();

        assert_eq!(
            enrollment.registration.encoded_key_handle(),
            vectors::TOKEN_KEY_HANDLE
        );
    }

    #[test]
    fn test_register_untrusted_attestation() {
        let result = TestFixtures::token_register_challenge()
            .register(
                &TestFixtures::token_register_response(),
                &RegistrationConfig::default(),
            );
        assert_eq!(result.unwrap_err(), U2fError::UntrustedAttestation);

        let key = VirtualKey::new().unwrap();
        let mut trust = AttestationTrust::new();
        trust.add_root_der(key.attestation_certificate()).unwrap();
        let result = TestFixtures::token_register_challenge().register(
            &TestFixtures::token_register_response(),
            &RegistrationConfig::with_trust(trust),
        );
        assert_eq!(result.unwrap_err(), U2fError::UntrustedAttestation);
    }

    #[test]
    fn test_register_expired_challenge() {
        let challenge = TestFixtures::backdated(TestFixtures::token_register_challenge(), 6);
        let result = challenge.register(
            &TestFixtures::token_register_response(),
            &RegistrationConfig::skip_attestation(),
        );
        assert_eq!(result.unwrap_err(), U2fError::ChallengeExpired);
    }

    #[test]
    fn test_register_untrusted_origin() {
        let mut challenge = TestFixtures::token_register_challenge();
        challenge.trusted_facets = vec!["http://localhost:3484".to_string()];
        let result = challenge.register(
            &TestFixtures::token_register_response(),
            &RegistrationConfig::skip_attestation(),
        );
        assert_eq!(
            result.unwrap_err(),
            U2fError::UntrustedOrigin("http://localhost:3483".to_string())
        );
    }

    #[test]
    fn test_register_challenge_mismatch() {
        let challenge = TestFixtures::challenge_with_nonce(
            vectors::TOKEN_SIGN_CHALLENGE,
            vectors::TOKEN_APP_ID,
            vec![],
        );
        let result = challenge.register(
            &TestFixtures::token_register_response(),
            &RegistrationConfig::skip_attestation(),
        );
        assert_eq!(result.unwrap_err(), U2fError::ChallengeMismatch);
    }

    #[test]
    fn test_register_wrong_client_data_type() {
        let mut response = TestFixtures::token_register_response();
        let client_data = ClientData::new(
            codec::TYPE_AUTHENTICATE,
            vectors::TOKEN_REGISTER_CHALLENGE,
            vectors::TOKEN_APP_ID,
        );
        response.client_data = codec::encode_base64url(&client_data.to_json().unwrap());

        let result = TestFixtures::token_register_challenge()
            .register(&response, &RegistrationConfig::skip_attestation());
        assert!(matches!(
            result,
            Err(U2fError::ClientDataTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_register_bit_flip_in_signature() {
        let response = corrupt_signature(&TestFixtures::token_register_response());
        let result = TestFixtures::token_register_challenge()
            .register(&response, &RegistrationConfig::skip_attestation());
        assert_eq!(result.unwrap_err(), U2fError::InvalidSignature);

        let response = corrupt_signature(&TestFixtures::fido_example_response());
        let result = TestFixtures::fido_example_challenge()
            .register(&response, &RegistrationConfig::skip_attestation());
        assert_eq!(result.unwrap_err(), U2fError::InvalidSignature);
    }

    fn fresh_challenge() -> Challenge {
        let facets = [vectors::TOKEN_APP_ID.to_string()];
        Challenge::new(vectors::TOKEN_APP_ID, &facets, vec![]).unwrap()
    }

    /// Self-signed certificate for `key`, signed with SHA-256
    fn self_signed_certificate(key: &PKey<Private>) -> Vec<u8> {
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "Non-ECDSA attestation").unwrap();
        let name = name.build();
        let not_before = Asn1Time::days_from_now(0).unwrap();
        let not_after = Asn1Time::days_from_now(1).unwrap();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_not_before(&not_before).unwrap();
        builder.set_not_after(&not_after).unwrap();
        builder.set_pubkey(key).unwrap();
        builder.sign(key, MessageDigest::sha256()).unwrap();
        builder.build().to_der().unwrap()
    }

    /// Registration response attested and signed by `attestation_key`
    fn response_signed_with(
        challenge: &Challenge,
        attestation_key: &PKey<Private>,
    ) -> RegisterResponse {
        let registration = TestFixtures::generated_registration();
        let client_data =
            ClientData::new(TYPE_REGISTER, &challenge.encoded_nonce(), &challenge.app_id)
                .to_json()
                .unwrap();
        let message = registration_signed_data(
            &challenge.app_id,
            &client_data,
            &registration.key_handle,
            &registration.public_key_bytes(),
        );
        let mut signer = Signer::new(MessageDigest::sha256(), attestation_key).unwrap();
        signer.update(&message).unwrap();

        let raw = RawRegistration {
            public_key: registration.public_key,
            key_handle: registration.key_handle,
            attestation_certificate: self_signed_certificate(attestation_key),
            signature: signer.sign_to_vec().unwrap(),
        };
        RegisterResponse {
            registration_data: codec::encode_base64url(&raw.to_bytes().unwrap()),
            client_data: codec::encode_base64url(&client_data),
        }
    }

    #[test]
    fn test_register_rejects_rsa_attestation_key() {
        let rsa_key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let challenge = fresh_challenge();
        let response = response_signed_with(&challenge, &rsa_key);

        let result = challenge.register(&response, &RegistrationConfig::skip_attestation());
        assert!(matches!(result, Err(U2fError::MalformedCertificate(_))));
    }

    #[test]
    fn test_register_rejects_attestation_key_on_other_curve() {
        let group = EcGroup::from_curve_name(Nid::SECP384R1).unwrap();
        let p384_key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
        let challenge = fresh_challenge();
        let response = response_signed_with(&challenge, &p384_key);

        let result = challenge.register(&response, &RegistrationConfig::skip_attestation());
        assert!(matches!(result, Err(U2fError::MalformedCertificate(_))));
    }

    #[test]
    fn test_register_accepts_p256_attestation_key() {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let p256_key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
        let challenge = fresh_challenge();
        let response = response_signed_with(&challenge, &p256_key);

        challenge
            .register(&response, &RegistrationConfig::skip_attestation())
            .unwrap();
    }

    #[test]
    fn test_register_malformed_encoding() {
        let mut response = TestFixtures::token_register_response();
        response.registration_data.push_str("!!");
        let result = TestFixtures::token_register_challenge()
            .register(&response, &RegistrationConfig::skip_attestation());
        assert_eq!(result.unwrap_err(), U2fError::MalformedEncoding);
    }
}
