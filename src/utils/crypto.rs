// Cryptographic utilities for generating challenges and hashing protocol data

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::{Result, U2fError};

/// Challenge size in bytes (256 bits)
pub const CHALLENGE_SIZE: usize = 32;

/// Generate a fresh challenge from the operating system random source
///
/// # Errors
///
/// Returns `InsufficientRandomness` if the random source cannot fill the buffer.
pub fn generate_challenge() -> Result<[u8; CHALLENGE_SIZE]> {
    generate_challenge_with(&mut OsRng)
}

/// Generate a fresh challenge from the given random source
///
/// A failed or short fill is a hard error; the partially written buffer is
/// never returned.
///
/// # Errors
///
/// Returns `InsufficientRandomness` if `rng` reports an error.
pub fn generate_challenge_with<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<[u8; CHALLENGE_SIZE]> {
    let mut challenge = [0u8; CHALLENGE_SIZE];
    rng.try_fill_bytes(&mut challenge)
        .map_err(|_| U2fError::InsufficientRandomness)?;
    Ok(challenge)
}

/// SHA-256 digest of `data`
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compare two byte strings without leaking the position of the first difference
///
/// Lengths are compared first; they are not secret.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && openssl::memcmp::eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Random source that always fails, standing in for an exhausted device
    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test]
    fn test_generate_challenge_length_and_uniqueness() {
        let first = generate_challenge().unwrap();
        let second = generate_challenge().unwrap();

        assert_eq!(first.len(), CHALLENGE_SIZE);
        assert_ne!(first, second, "Two challenges should never collide");
    }

    #[test]
    fn test_generate_challenge_rejects_failed_source() {
        let result = generate_challenge_with(&mut ExhaustedRng);
        assert_eq!(result.unwrap_err(), U2fError::InsufficientRandomness);
    }

    #[test]
    fn test_sha256_known_value() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"challenge", b"challenge"));
        assert!(!constant_time_eq(b"challenge", b"challengf"));
        assert!(!constant_time_eq(b"challenge", b"challenge-longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
