//! HOTP (RFC 4226) evaluated at TOTP (RFC 6238) time steps.

use hmac::digest::{generic_array::GenericArray, KeyInit};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

type HmacSha1 = Hmac<Sha1>;

/// Length of a time step in seconds.
pub const STEP_SECONDS: u64 = 30;
pub const DIGITS: usize = 6;
const MODULUS: u32 = 1_000_000;
const BLOCK_BYTES: usize = 64;

/// Time step containing `unix_seconds`.
pub fn counter_at(unix_seconds: u64) -> u64 {
    unix_seconds / STEP_SECONDS
}

/// Compute the 6-digit code for `secret` at `counter`, zero-padded.
pub fn generate(secret: &[u8], counter: u64) -> String {
    format!("{:0width$}", truncate(&sign(secret, counter)), width = DIGITS)
}

// RFC 2104 key preparation: keys longer than a block are hashed, the rest
// zero-padded, so any secret length yields a block-sized key.
fn keyed(secret: &[u8]) -> HmacSha1 {
    let mut block = [0u8; BLOCK_BYTES];
    if secret.len() > BLOCK_BYTES {
        block[..20].copy_from_slice(&Sha1::digest(secret));
    } else {
        block[..secret.len()].copy_from_slice(secret);
    }
    <HmacSha1 as KeyInit>::new(GenericArray::from_slice(&block))
}

fn sign(secret: &[u8], counter: u64) -> [u8; 20] {
    let mut mac = keyed(secret);
    mac.update(&counter.to_be_bytes());
    let mut digest = [0u8; 20];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

// Dynamic truncation (RFC 4226 section 5.3)
fn truncate(digest: &[u8; 20]) -> u32 {
    let offset = (digest[19] & 0x0f) as usize;
    let word = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    (word & 0x7fff_ffff) % MODULUS
}
