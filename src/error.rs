//! U2F error types
//!
//! Every failure the codec and the verifiers can report. None of them are
//! retryable with the same challenge, and none of the messages carry key,
//! nonce or signature bytes.

use thiserror::Error;

/// Errors returned by the codec, the challenge manager and the verifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum U2fError {
    /// Base64url input with invalid characters or a truncated group
    #[error("Malformed base64url encoding")]
    MalformedEncoding,

    /// Binary message ended before a required field
    #[error("Message too short: {0}")]
    TooShort(&'static str),

    /// Bytes left over after the final field of a message
    #[error("Trailing data after signature")]
    TrailingData,

    /// Registration message does not start with the 0x05 reserved byte
    #[error("Invalid reserved byte 0x{0:02x}, expected 0x05")]
    BadReservedByte(u8),

    /// User-presence byte has bits other than bit 0 set
    #[error("Invalid user presence byte")]
    InvalidPresenceByte,

    /// Not an uncompressed point on P-256
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Attestation certificate is not a well-formed DER X.509 structure
    #[error("Malformed attestation certificate: {0}")]
    MalformedCertificate(String),

    /// Attestation certificate does not chain to a configured root
    #[error("Attestation certificate is not trusted")]
    UntrustedAttestation,

    /// Signature does not verify, or cannot be decoded
    #[error("Invalid signature")]
    InvalidSignature,

    /// Client data JSON could not be parsed
    #[error("Malformed client data: {0}")]
    MalformedClientData(String),

    /// Client data `typ` does not belong to this phase of the protocol
    #[error("Client data type mismatch: expected {expected}")]
    ClientDataTypeMismatch { expected: &'static str },

    /// Client data origin is not one of the trusted facets
    #[error("Untrusted origin: {0}")]
    UntrustedOrigin(String),

    /// Client data challenge does not match the issued nonce
    #[error("Challenge does not match")]
    ChallengeMismatch,

    /// Challenge is older than the validity window
    #[error("Challenge has expired")]
    ChallengeExpired,

    /// Response key handle matches none of the registered keys
    #[error("Unknown key handle")]
    UnknownKeyHandle,

    /// Counter went backwards (or did not move, under a strict policy)
    #[error("Counter not increasing: received {received}, stored {stored}")]
    CounterNotIncreasing { received: u32, stored: u32 },

    /// Token reported that no user was present
    #[error("User was not present")]
    UserNotPresent,

    /// Random source returned fewer bytes than requested
    #[error("Unable to generate random bytes")]
    InsufficientRandomness,

    /// Key handle length does not fit the one-byte length prefix
    #[error("Key handle too long: {0} bytes")]
    KeyHandleTooLong(usize),

    /// Stored registration record could not be mapped back
    #[error("Malformed registration record: {0}")]
    MalformedRecord(&'static str),

    /// Cryptographic backend failure unrelated to the input
    #[error("Crypto error: {0}")]
    Crypto(String),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, U2fError>;

impl From<openssl::error::ErrorStack> for U2fError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Self::Crypto(err.to_string())
    }
}

/// Errors returned by the virtual authenticator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// A key for this app id is already among the request's registered keys
    #[error("Key already registered for app id {0}")]
    AlreadyRegistered(String),

    /// No stored key answers the request
    #[error("No key registered for app id {0}")]
    UnknownKey(String),

    /// Registration request without a challenge
    #[error("Registration request carries no challenge")]
    MissingChallenge,

    /// Key generation, certificate building or signing failed
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Response could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<openssl::error::ErrorStack> for AuthenticatorError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        Self::Crypto(err.to_string())
    }
}

impl From<U2fError> for AuthenticatorError {
    fn from(err: U2fError) -> Self {
        Self::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_never_includes_bytes() {
        let err = U2fError::CounterNotIncreasing {
            received: 3,
            stored: 5,
        };
        assert_eq!(err.to_string(), "Counter not increasing: received 3, stored 5");
        assert_eq!(
            U2fError::BadReservedByte(0x04).to_string(),
            "Invalid reserved byte 0x04, expected 0x05"
        );
    }

    #[test]
    fn test_authenticator_error_from_codec_error() {
        let err = AuthenticatorError::from(U2fError::KeyHandleTooLong(300));
        assert_eq!(
            err,
            AuthenticatorError::Encoding("Key handle too long: 300 bytes".to_string())
        );
    }
}
