//! Password Hasher
//! Mission: one-way, salted credential hashing. Plaintext passwords exist
//! only on the stack of these two functions and in the incoming request.

use anyhow::{bail, Context, Result};
use bcrypt::DEFAULT_COST;

/// Hash a plaintext password. Fails only on malformed input.
pub fn hash(plaintext: &str) -> Result<String> {
    if plaintext.is_empty() {
        bail!("cannot hash an empty password");
    }
    bcrypt::hash(plaintext, DEFAULT_COST).context("Failed to hash password")
}

/// Check a plaintext password against a stored digest. A mismatch or an
/// unparseable digest both come back as `false`, never as an error.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}
