//! AES-256-GCM encryption of single values under a passphrase.
//!
//! The cipher key is the lowercase hex MD5 digest of the passphrase, taken
//! as 32 ASCII bytes. This is a plain hash, not a password KDF: it is only
//! adequate because the passphrase is expected to be a high-entropy,
//! machine-generated key. Changing the derivation would invalidate every
//! token already on disk.
//!
//! A token is `base64url(nonce || ciphertext || tag)` with padding, and a
//! fresh random nonce is drawn for every call.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use localenv_core::Passphrase;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Result, StoreError};

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Derive the 256-bit cipher key from `passphrase`.
fn derive_key(passphrase: &Passphrase) -> Zeroizing<[u8; KEY_SIZE]> {
    let digest = md5::compute(passphrase.expose().as_bytes());
    let hex_digest = Zeroizing::new(hex::encode(digest.0));

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(hex_digest.as_bytes());
    key
}

fn cipher(passphrase: &Passphrase) -> Result<Aes256Gcm> {
    let key = derive_key(passphrase);
    Aes256Gcm::new_from_slice(&key[..]).map_err(|e| StoreError::Crypto(e.to_string()))
}

/// Encrypt `plaintext` and return a URL-safe ciphertext token.
///
/// Two calls with the same input produce different tokens.
pub fn encrypt_secret(passphrase: &Passphrase, plaintext: &str) -> Result<String> {
    let cipher = cipher(passphrase)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
        .map_err(|e| StoreError::Crypto(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    Ok(URL_SAFE.encode(sealed))
}

/// Generate a random passphrase: 32 bytes from the OS-seeded RNG, hex-encoded.
pub fn generate_secret_key() -> Passphrase {
    let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
    rand::thread_rng().fill_bytes(&mut bytes[..]);
    Passphrase::new(hex::encode(&bytes[..]))
}

/// Decrypt a token produced by [`encrypt_secret`].
///
/// Fails with [`StoreError::Decryption`] on bad encoding, a token too short
/// to hold a nonce, a failed authentication check (tampering or the wrong
/// passphrase), or non-UTF-8 plaintext.
pub fn decrypt_secret(passphrase: &Passphrase, token: &str) -> Result<String> {
    let sealed = URL_SAFE
        .decode(token)
        .map_err(|e| StoreError::Decryption(format!("base64 decode failed: {e}")))?;

    if sealed.len() < NONCE_SIZE {
        return Err(StoreError::Decryption("ciphertext too short".to_string()));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    let plaintext = cipher(passphrase)?
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| StoreError::Decryption("authentication failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|e| StoreError::Decryption(format!("invalid UTF-8: {e}")))
}
