// crates/pythia-test-config/src/keys.rs
// ============================================================================
// Module: Credential Keys
// Description: Ed25519 key import/export and public key identifier derivation.
// Purpose: Turn base64 key settings into key material and stable identifiers.
// Dependencies: base64, ed25519-dalek, sha2, thiserror
// ============================================================================

//! ## Overview
//! Application keys are stored as base64 text of either a PKCS#8 DER
//! Ed25519 private key or a raw 32-byte seed. The public key identifier is
//! the first 32 lowercase hex characters of SHA-512 over the base64 text of
//! the DER-exported public key.
//!
//! Error messages never echo key bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::SigningKey;
use ed25519_dalek::VerifyingKey;
use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::pkcs8::EncodePublicKey;
use sha2::Digest;
use sha2::Sha512;
use thiserror::Error;

use crate::settings::PUBLIC_KEY_ID_HEX_LEN;
use crate::settings::is_blank;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of a raw Ed25519 seed or public key.
pub const RAW_KEY_LEN: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Key decoding or import errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key text is empty or whitespace.
    #[error("key is blank")]
    Blank,
    /// Key text is not valid base64.
    #[error("key is not valid base64")]
    Base64,
    /// Decoded bytes are not an Ed25519 private key.
    #[error("invalid ed25519 private key")]
    InvalidPrivateKey,
    /// Decoded bytes are not an Ed25519 public key.
    #[error("invalid ed25519 public key")]
    InvalidPublicKey,
    /// Public key could not be encoded.
    #[error("failed to export public key: {0}")]
    Export(String),
}

// ============================================================================
// SECTION: Import
// ============================================================================

/// Decodes base64 key text, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns [`KeyError::Blank`] or [`KeyError::Base64`].
pub fn decode_key_text(text: &str) -> Result<Vec<u8>, KeyError> {
    if is_blank(text) {
        return Err(KeyError::Blank);
    }
    BASE64.decode(text.trim().as_bytes()).map_err(|_| KeyError::Base64)
}

/// Imports a private key from base64 text.
///
/// # Errors
///
/// Returns [`KeyError`] when the text is blank, not base64, or not a key.
pub fn import_private_key(text: &str) -> Result<SigningKey, KeyError> {
    let bytes = decode_key_text(text)?;
    private_key_from_bytes(&bytes)
}

/// Imports a private key from raw seed or PKCS#8 DER bytes.
///
/// # Errors
///
/// Returns [`KeyError::InvalidPrivateKey`] when the bytes are neither form.
pub fn private_key_from_bytes(bytes: &[u8]) -> Result<SigningKey, KeyError> {
    if bytes.len() == RAW_KEY_LEN {
        let seed: [u8; RAW_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidPrivateKey)?;
        return Ok(SigningKey::from_bytes(&seed));
    }
    SigningKey::from_pkcs8_der(bytes).map_err(|_| KeyError::InvalidPrivateKey)
}

/// Imports a public key from base64 text of SPKI DER or raw bytes.
///
/// # Errors
///
/// Returns [`KeyError`] when the text is blank, not base64, or not a key.
pub fn import_public_key(text: &str) -> Result<VerifyingKey, KeyError> {
    let bytes = decode_key_text(text)?;
    if bytes.len() == RAW_KEY_LEN {
        let raw: [u8; RAW_KEY_LEN] =
            bytes.as_slice().try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        return VerifyingKey::from_bytes(&raw).map_err(|_| KeyError::InvalidPublicKey);
    }
    VerifyingKey::from_public_key_der(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

// ============================================================================
// SECTION: Export and Identifiers
// ============================================================================

/// Exports a public key as SubjectPublicKeyInfo DER.
///
/// # Errors
///
/// Returns [`KeyError::Export`] when encoding fails.
pub fn export_public_key(key: &VerifyingKey) -> Result<Vec<u8>, KeyError> {
    key.to_public_key_der()
        .map(|document| document.as_bytes().to_vec())
        .map_err(|err| KeyError::Export(err.to_string()))
}

/// Computes the identifier of a public key.
///
/// # Errors
///
/// Returns [`KeyError::Export`] when the key cannot be exported.
pub fn public_key_id(key: &VerifyingKey) -> Result<String, KeyError> {
    let exported = export_public_key(key)?;
    let encoded = BASE64.encode(exported);
    let mut hasher = Sha512::new();
    hasher.update(encoded.as_bytes());
    let digest = hasher.finalize();
    let mut id = hex_encode(digest.as_slice());
    id.truncate(PUBLIC_KEY_ID_HEX_LEN);
    Ok(id)
}

/// Derives the public key identifier paired with a base64 private key.
///
/// # Errors
///
/// Returns [`KeyError`] when the private key cannot be imported or exported.
pub fn derive_public_key_id(private_key_text: &str) -> Result<String, KeyError> {
    let private_key = import_private_key(private_key_text)?;
    public_key_id(&private_key.verifying_key())
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
