//! Credential tokens for tokenized links (RSVP invites, email verification).
//!
//! A token is 32 bytes from the operating system's CSPRNG, encoded as URL-safe
//! base64 without padding. Only its SHA-256 digest is ever persisted; a token
//! presented later is re-hashed and compared against the stored digest in
//! constant time.
//!
//! Every function here is stateless and can be called from any thread.

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Number of random bytes behind every token.
pub const TOKEN_BYTES: usize = 32;

/// Length of a generated token once encoded (unpadded base64 of 32 bytes).
pub const TOKEN_LEN: usize = 43;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_LEN: usize = 64;

/// Errors raised while issuing tokens.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The secure random source could not supply bytes.
    #[error("secure random source unavailable: {0}")]
    Entropy(#[source] rand::Error),
}

/// A freshly issued token together with the digest to persist.
///
/// The plaintext goes to the requester (usually inside a link) and must not be
/// kept by the server once it has been handed out.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Plaintext token, URL safe.
    pub token: String,
    /// Lowercase hex SHA-256 digest of `token`.
    pub hash: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Generate a secure random token
///
/// Fails only when the OS random source fails; there is no fallback RNG.
pub fn generate_token() -> Result<String, TokenError> {
    let mut token_bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut token_bytes)
        .map_err(TokenError::Entropy)?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes))
}

/// Hash a token for secure storage in the database
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented token against a stored digest.
///
/// The comparison runs in constant time over the digest bytes. A digest of
/// the wrong length, or one that is not a digest at all, simply fails.
///
/// The empty string verifies against `hash_token("")`. Callers are expected
/// to reject empty or short tokens before getting here.
pub fn verify_token(presented: &str, stored_hash: &str) -> bool {
    let computed = hash_token(presented);

    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Generate a token and its digest in one step.
pub fn generate_token_pair() -> Result<TokenPair, TokenError> {
    let token = generate_token()?;
    let hash = hash_token(&token);

    Ok(TokenPair { token, hash })
}
