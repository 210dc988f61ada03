//! Symmetric encryption of token subjects
//!
//! The token subject is the decimal user ID, encrypted with
//! XChaCha20-Poly1305 and base64-encoded as `nonce || ciphertext`.

use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

const NONCE_LEN: usize = 24;

/// Encrypts and decrypts user IDs carried in token subjects
#[derive(Clone)]
pub struct SubjectCipher {
    cipher: XChaCha20Poly1305,
}

impl SubjectCipher {
    /// Create a cipher keyed by the SHA-256 digest of `secret`
    pub fn new(secret: &str) -> Self {
        let key_bytes: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(&key_bytes)),
        }
    }

    /// Encrypt raw bytes, returning base64 of `nonce || ciphertext`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, AuthError> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| AuthError::Cipher(format!("Encryption failed: {e}")))?;

        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(payload))
    }

    /// Reverse `encrypt`
    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, AuthError> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|e| AuthError::Cipher(format!("Invalid base64: {e}")))?;

        if raw.len() < NONCE_LEN {
            return Err(AuthError::Cipher("Ciphertext too short".to_string()));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| AuthError::Cipher(format!("Decryption failed: {e}")))
    }

    /// Encrypt the decimal form of a user ID
    pub fn encrypt_user_id(&self, user_id: i64) -> Result<String, AuthError> {
        self.encrypt(user_id.to_string().as_bytes())
    }

    /// Decrypt a subject back to the user ID it was issued for
    pub fn decrypt_user_id(&self, encoded: &str) -> Result<i64, AuthError> {
        let plaintext = self.decrypt(encoded)?;
        let decimal = String::from_utf8(plaintext)
            .map_err(|e| AuthError::Cipher(format!("Invalid UTF-8 plaintext: {e}")))?;
        decimal
            .parse()
            .map_err(|_| AuthError::Cipher(format!("Subject is not a user ID: {decimal}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_round_trip() {
        let cipher = SubjectCipher::new("encryption-key");
        let encoded = cipher.encrypt_user_id(42).unwrap();

        assert_ne!(encoded, "42");
        assert_eq!(cipher.decrypt_user_id(&encoded).unwrap(), 42);
    }

    #[test]
    fn test_nonce_is_random() {
        let cipher = SubjectCipher::new("encryption-key");
        let a = cipher.encrypt_user_id(7).unwrap();
        let b = cipher.encrypt_user_id(7).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let encoded = SubjectCipher::new("key-a").encrypt_user_id(1).unwrap();
        assert!(SubjectCipher::new("key-b").decrypt_user_id(&encoded).is_err());
    }

    #[test]
    fn test_malformed_input_rejected() {
        let cipher = SubjectCipher::new("encryption-key");
        assert!(cipher.decrypt_user_id("not base64!").is_err());
        assert!(cipher.decrypt_user_id("c2hvcnQ=").is_err());
    }

    #[test]
    fn test_non_numeric_plaintext_rejected() {
        let cipher = SubjectCipher::new("encryption-key");
        let encoded = cipher.encrypt(b"not-a-number").unwrap();
        assert!(cipher.decrypt_user_id(&encoded).is_err());
    }
}
