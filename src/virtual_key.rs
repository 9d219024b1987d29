//! Software U2F token
//!
//! Plays the token side of the protocol so the verifiers can be exercised
//! end to end without hardware. It holds one self-signed attestation key for
//! its lifetime and one P-256 key pair per registration.

use chrono::{DateTime, Utc};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer as OpensslSigner;
use openssl::x509::extension::{BasicConstraints, KeyUsage, SubjectKeyIdentifier};
use openssl::x509::{X509NameBuilder, X509};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::PublicKey;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::auth::authentication_signed_data;
use crate::codec::{
    self, ClientData, RawRegistration, RawSignature, TYPE_AUTHENTICATE, TYPE_REGISTER,
};
use crate::error::AuthenticatorError;
use crate::messages::{
    RegisterRequestMessage, RegisterResponse, SignRequestMessage, SignResponse,
};
use crate::register::registration_signed_data;

/// Validity of the attestation certificate
const CERTIFICATE_VALIDITY_DAYS: u32 = 365;

type Result<T> = std::result::Result<T, AuthenticatorError>;

/// A key pair bound to one app id
struct KeyInstance {
    generated: DateTime<Utc>,
    app_id: String,
    key_handle: Vec<u8>,
    signing_key: SigningKey,
    counter: u32,
}

/// In-memory software token
pub struct VirtualKey {
    attestation_key: PKey<Private>,
    attestation_certificate: Vec<u8>,
    keys: Vec<KeyInstance>,
}

impl VirtualKey {
    /// Create a token with a fresh attestation key and self-signed certificate
    ///
    /// # Errors
    ///
    /// Returns `Crypto` if key generation or certificate signing fails.
    pub fn new() -> Result<Self> {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)?;
        let attestation_key = PKey::from_ec_key(EcKey::generate(&group)?)?;
        let attestation_certificate = build_attestation_certificate(&attestation_key)?;

        Ok(Self {
            attestation_key,
            attestation_certificate,
            keys: Vec::new(),
        })
    }

    /// DER attestation certificate, for installing as a trust root
    #[must_use]
    pub fn attestation_certificate(&self) -> &[u8] {
        &self.attestation_certificate
    }

    /// Number of keys registered so far
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// When the key with this handle was generated
    #[must_use]
    pub fn key_generated_at(&self, key_handle: &[u8]) -> Option<DateTime<Utc>> {
        self.keys
            .iter()
            .find(|key| key.key_handle == key_handle)
            .map(|key| key.generated)
    }

    /// Answer a registration request with a new key
    ///
    /// # Errors
    ///
    /// - `AlreadyRegistered` if one of the request's registered keys is held here
    /// - `MissingChallenge` if the request has no register request
    /// - `Crypto` or `Encoding` if the response cannot be built
    pub fn handle_register_request(
        &mut self,
        request: &RegisterRequestMessage,
    ) -> Result<RegisterResponse> {
        let already_registered = request.registered_keys.iter().any(|registered| {
            codec::decode_base64url(&registered.key_handle)
                .is_ok_and(|key_handle| self.find_key(&request.app_id, &key_handle).is_some())
        });
        if already_registered {
            return Err(AuthenticatorError::AlreadyRegistered(request.app_id.clone()));
        }

        let challenge = request
            .register_requests
            .first()
            .ok_or(AuthenticatorError::MissingChallenge)?;

        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = PublicKey::from(signing_key.verifying_key());
        let key_handle = Uuid::new_v4().as_bytes().to_vec();

        let client_data =
            ClientData::new(TYPE_REGISTER, &challenge.challenge, &request.app_id).to_json()?;

        let public_key_bytes = codec::encode_public_key(&public_key);
        let message = registration_signed_data(
            &request.app_id,
            &client_data,
            &key_handle,
            &public_key_bytes,
        );
        let mut signer = OpensslSigner::new(MessageDigest::sha256(), &self.attestation_key)?;
        signer.update(&message)?;
        let signature = signer.sign_to_vec()?;

        let registration_data = RawRegistration {
            public_key,
            key_handle: key_handle.clone(),
            attestation_certificate: self.attestation_certificate.clone(),
            signature,
        }
        .to_bytes()?;

        log::debug!("Virtual key registered new key for app id {}", request.app_id);
        self.keys.push(KeyInstance {
            generated: Utc::now(),
            app_id: request.app_id.clone(),
            key_handle,
            signing_key,
            counter: 0,
        });

        Ok(RegisterResponse {
            registration_data: codec::encode_base64url(&registration_data),
            client_data: codec::encode_base64url(&client_data),
        })
    }

    /// Answer an authentication request with the first matching key
    ///
    /// The key's counter is incremented and kept for the next request.
    ///
    /// # Errors
    ///
    /// - `UnknownKey` if none of the request's keys is held for its app id
    /// - `Encoding` if the client data cannot be built
    pub fn handle_authentication_request(
        &mut self,
        request: &SignRequestMessage,
    ) -> Result<SignResponse> {
        let index = request
            .registered_keys
            .iter()
            .filter_map(|registered| codec::decode_base64url(&registered.key_handle).ok())
            .find_map(|key_handle| self.find_key(&request.app_id, &key_handle))
            .ok_or_else(|| AuthenticatorError::UnknownKey(request.app_id.clone()))?;

        let client_data =
            ClientData::new(TYPE_AUTHENTICATE, &request.challenge, &request.app_id).to_json()?;

        let key = &mut self.keys[index];
        key.counter = key.counter.saturating_add(1);

        let header = RawSignature {
            user_presence: true,
            counter: key.counter,
            signature: Vec::new(),
        }
        .signed_header();
        let message = authentication_signed_data(&request.app_id, &header, &client_data);
        let signature: Signature = key.signing_key.sign(&message);

        let signature_data = RawSignature {
            user_presence: true,
            counter: key.counter,
            signature: signature.to_der().as_bytes().to_vec(),
        }
        .to_bytes();

        log::debug!(
            "Virtual key signed for app id {} at counter {}",
            request.app_id,
            key.counter
        );

        Ok(SignResponse {
            key_handle: codec::encode_base64url(&key.key_handle),
            signature_data: codec::encode_base64url(&signature_data),
            client_data: codec::encode_base64url(&client_data),
        })
    }

    fn find_key(&self, app_id: &str, key_handle: &[u8]) -> Option<usize> {
        self.keys
            .iter()
            .position(|key| key.app_id == app_id && key.key_handle == key_handle)
    }
}

/// Self-signed X.509 v3 certificate around the attestation key
fn build_attestation_certificate(key: &PKey<Private>) -> Result<Vec<u8>> {
    // A unique subject keeps separate instances apart in one trust store
    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("O", "vouchrs-u2f")?;
    name.append_entry_by_text("CN", &format!("Virtual U2F Key {}", Uuid::new_v4()))?;
    let name = name.build();

    let mut serial = BigNum::new()?;
    serial.rand(128, MsbOption::MAYBE_ZERO, false)?;

    let serial = serial.to_asn1_integer()?;
    let not_before = Asn1Time::days_from_now(0)?;
    let not_after = Asn1Time::days_from_now(CERTIFICATE_VALIDITY_DAYS)?;

    let mut builder = X509::builder()?;
    builder.set_version(2)?; // X.509 v3
    builder.set_serial_number(&serial)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;
    builder.set_pubkey(key)?;

    builder.append_extension(BasicConstraints::new().critical().ca().build()?)?;
    builder.append_extension(
        KeyUsage::new()
            .critical()
            .digital_signature()
            .key_cert_sign()
            .build()?,
    )?;
    let subject_key_identifier =
        SubjectKeyIdentifier::new().build(&builder.x509v3_context(None, None))?;
    builder.append_extension(subject_key_identifier)?;

    builder.sign(key, MessageDigest::sha256())?;
    Ok(builder.build().to_der()?)
}
