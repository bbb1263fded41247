//! Provisioning of API credential pairs.
//!
//! A credential pair is asymmetric by *role*, not by cryptography: the public key identifies the
//! caller and is the lookup key into the server's account store; the secret key never leaves the
//! two parties and is only ever fed into the HMAC.

use std::fmt;

use rand::{rngs::OsRng, RngCore};
use smapi_common::Secret;
use thiserror::Error;

/// Length, in bytes, of the random material behind each key. Keys are hex-encoded, so the
/// caller-visible strings are twice this long.
pub const KEY_LENGTH: usize = 32;

// The chance of OsRng producing the same 32 bytes twice is astronomically small, so hitting this
// cap means the randomness source is broken, not that we were unlucky.
const MAX_GENERATE_ATTEMPTS: usize = 9_999;

#[derive(Debug, Clone, Error)]
pub enum KeyGenerationError {
    #[error("The random source repeatedly produced identical public and secret keys.")]
    RngDegenerate,
}

/// An API credential pair. The secret key is wrapped in [`Secret`] so it cannot leak into logs.
#[derive(Clone)]
pub struct KeyPair {
    pub public_key: String,
    pub secret_key: Secret<String>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair {{ public_key: {}, secret_key: **** }}", self.public_key)
    }
}

/// Generate a new credential pair from the operating system's secure randomness source.
///
/// The public and secret keys are guaranteed to be distinct. The retry loop is capped; if the cap
/// is ever reached the randomness source has degenerated and the function fails deterministically
/// rather than spinning forever.
pub fn generate_key_pair() -> Result<KeyPair, KeyGenerationError> {
    let mut rng = OsRng;
    for _ in 0..MAX_GENERATE_ATTEMPTS {
        let public_key = random_hex_key(&mut rng);
        let secret_key = random_hex_key(&mut rng);
        if public_key != secret_key {
            return Ok(KeyPair { public_key, secret_key: Secret::new(secret_key) });
        }
    }
    Err(KeyGenerationError::RngDegenerate)
}

fn random_hex_key(rng: &mut OsRng) -> String {
    let mut bytes = [0u8; KEY_LENGTH];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keys_are_distinct_and_well_formed() {
        for _ in 0..100 {
            let pair = generate_key_pair().expect("key generation failed");
            assert_ne!(pair.public_key, *pair.secret_key.reveal());
            assert_eq!(pair.public_key.len(), 2 * KEY_LENGTH);
            assert_eq!(pair.secret_key.reveal().len(), 2 * KEY_LENGTH);
            assert!(pair.public_key.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn successive_pairs_differ() {
        let a = generate_key_pair().unwrap();
        let b = generate_key_pair().unwrap();
        assert_ne!(a.public_key, b.public_key);
        assert_ne!(a.secret_key.reveal(), b.secret_key.reveal());
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let pair = generate_key_pair().unwrap();
        let debugged = format!("{pair:?}");
        assert!(debugged.contains(&pair.public_key));
        assert!(!debugged.contains(pair.secret_key.reveal().as_str()));
    }
}
