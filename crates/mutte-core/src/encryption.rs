// Note: Deprecation warnings from generic-array 0.14.x are expected until
// aes-gcm moves to generic-array 1.x
#![allow(deprecated)]

use aes_gcm::{
    aead::{Aead, KeyInit},
    AeadCore, Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use thiserror::Error;

const NONCE_LENGTH: usize = 12;

/// Errors from encrypting or decrypting tenant credential material
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Master key must be exactly 32 bytes or 64 hex characters")]
    InvalidKey,

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),
}

/// Encrypts and decrypts tenant SMTP credentials with AES-256-GCM.
///
/// Every `encrypt` call draws a fresh random nonce, so encrypting the same
/// plaintext twice produces different ciphertexts. The stored form is
/// base64(nonce || ciphertext). Plaintext only ever exists transiently in
/// the scope of a single send operation.
#[derive(Debug, Clone)]
pub struct EncryptionService {
    master_key: Arc<[u8; 32]>,
}

impl EncryptionService {
    /// Creates a service from a raw 32-byte key or a 64-character hex key.
    pub fn new(master_key: &str) -> Result<Self, CryptoError> {
        let key_bytes = if master_key.len() == 32 {
            master_key.as_bytes().to_vec()
        } else if master_key.len() == 64 {
            hex::decode(master_key).map_err(|_| CryptoError::InvalidKey)?
        } else {
            return Err(CryptoError::InvalidKey);
        };

        if key_bytes.len() != 32 {
            return Err(CryptoError::InvalidKey);
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&key_bytes);

        Ok(Self {
            master_key: Arc::new(key),
        })
    }

    /// Encrypts a string, returning base64(nonce || ciphertext).
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new(self.master_key.as_slice().into());
        let nonce = Aes256Gcm::generate_nonce(&mut aes_gcm::aead::OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

        let mut combined = nonce.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Decrypts a value produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails deterministically on malformed base64, truncated input, a wrong
    /// key, or tampered ciphertext (GCM authentication).
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let data = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::Decrypt(format!("invalid base64: {}", e)))?;

        if data.len() < NONCE_LENGTH {
            return Err(CryptoError::Decrypt("ciphertext too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LENGTH);
        let cipher = Aes256Gcm::new(self.master_key.as_slice().into());

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::Decrypt(format!("not valid UTF-8: {}", e)))
    }

    /// Generates a random 32-byte key as a 64-character hex string.
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        hex::encode(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "12345678901234567890123456789012";

    #[test]
    fn test_new_with_valid_32_byte_key() {
        assert!(EncryptionService::new(KEY).is_ok());
    }

    #[test]
    fn test_new_with_valid_hex_key() {
        let key = EncryptionService::generate_key();
        assert_eq!(key.len(), 64);
        assert!(EncryptionService::new(&key).is_ok());
    }

    #[test]
    fn test_new_with_invalid_key_length() {
        let result = EncryptionService::new("short");
        assert!(matches!(result, Err(CryptoError::InvalidKey)));
    }

    #[test]
    fn test_round_trip() {
        let service = EncryptionService::new(KEY).unwrap();

        let original = "smtp.example.com";
        let encrypted = service.encrypt(original).unwrap();
        assert_ne!(encrypted, original);
        assert_eq!(service.decrypt(&encrypted).unwrap(), original);
    }

    #[test]
    fn test_round_trip_empty_and_unicode() {
        let service = EncryptionService::new(KEY).unwrap();

        for original in ["", "Hello 世界! 🦀", "p@ssw0rd with spaces"] {
            let encrypted = service.encrypt(original).unwrap();
            assert_eq!(service.decrypt(&encrypted).unwrap(), original);
        }
    }

    #[test]
    fn test_encryption_different_each_time() {
        let service = EncryptionService::new(KEY).unwrap();

        let encrypted1 = service.encrypt("same input").unwrap();
        let encrypted2 = service.encrypt("same input").unwrap();

        // Fresh random nonce per call
        assert_ne!(encrypted1, encrypted2);
        assert_eq!(service.decrypt(&encrypted1).unwrap(), "same input");
        assert_eq!(service.decrypt(&encrypted2).unwrap(), "same input");
    }

    #[test]
    fn test_decrypt_invalid_base64() {
        let service = EncryptionService::new(KEY).unwrap();
        assert!(service.decrypt("not-base-64!!!").is_err());
    }

    #[test]
    fn test_decrypt_too_short() {
        let service = EncryptionService::new(KEY).unwrap();
        let short = BASE64.encode(b"short");
        assert!(service.decrypt(&short).is_err());
    }

    #[test]
    fn test_decrypt_corrupted_data() {
        let service = EncryptionService::new(KEY).unwrap();

        let mut encrypted = service.encrypt("hello").unwrap();
        encrypted.pop();
        encrypted.push('X');

        assert!(service.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_decrypt_with_wrong_key() {
        let service1 = EncryptionService::new(KEY).unwrap();
        let service2 = EncryptionService::new("09876543210987654321098765432109").unwrap();

        let encrypted = service1.encrypt("secret").unwrap();
        assert!(service2.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_generated_keys_are_different() {
        assert_ne!(
            EncryptionService::generate_key(),
            EncryptionService::generate_key()
        );
    }
}
