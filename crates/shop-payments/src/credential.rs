//! Temporary Credentials
//!
//! One-time passwords issued to newly provisioned accounts. The plaintext
//! is handed back exactly once; only an Argon2id hash is stored.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use rand::{Rng, rngs::OsRng, seq::SliceRandom};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{PaymentError, Result};

/// Generated credential length
pub const CREDENTIAL_LENGTH: usize = 20;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+";

/// A freshly generated plaintext credential
///
/// `Debug` is redacted by `SecretString`.
#[derive(Debug)]
pub struct Credential(SecretString);

impl Credential {
    /// Draw a new credential from the OS RNG
    ///
    /// Always contains at least one lowercase letter, uppercase letter,
    /// digit and symbol.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let classes = [LOWER, UPPER, DIGITS, SYMBOLS];
        let all: Vec<u8> = classes.concat();

        let mut chars: Vec<u8> = classes
            .iter()
            .map(|class| class[rng.gen_range(0..class.len())])
            .collect();

        while chars.len() < CREDENTIAL_LENGTH {
            chars.push(all[rng.gen_range(0..all.len())]);
        }
        chars.shuffle(&mut rng);

        // every byte comes from the ASCII tables above
        let plain: String = chars.into_iter().map(char::from).collect();
        Self(SecretString::from(plain))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Argon2id PHC string for storage
    pub fn hash(&self) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(self.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PaymentError::Credential(e.to_string()))
    }
}

/// Check a plaintext against a stored hash
#[cfg(test)]
pub(crate) fn verify_credential(plain: &str, hash: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
