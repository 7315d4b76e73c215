//! One-way digest applied to submitted plaintexts.
//!
//! SHA-512 over the UTF-8 bytes, rendered with the standard base64 alphabet
//! (padded). The function is pure and total, so callers never need to handle
//! a failure.

use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha512};

/// Length of every encoded digest (64 bytes → 88 base64 chars)
pub const ENCODED_LEN: usize = 88;

/// Hash and encode a plaintext
pub fn encode(plaintext: &str) -> String {
  let hash = Sha512::digest(plaintext.as_bytes());
  general_purpose::STANDARD.encode(hash)
}
