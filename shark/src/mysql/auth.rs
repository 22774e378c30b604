//! Password scrambles for the mysql authentication plugins.
//!
//! Both plugins answer the 20-byte server scramble (the nonce) with the
//! same XOR shape over their digest:
//!
//! - `mysql_native_password`:
//!   `sha1(password) XOR sha1(sha1(sha1(password)) ++ nonce)`
//! - `caching_sha2_password`:
//!   `sha256(password) XOR sha256(sha256(sha256(password)) ++ nonce)`
//!
//! An empty password answers with an empty scramble.

pub(crate) const NATIVE_PASSWORD: &str = "mysql_native_password";
pub(crate) const CACHING_SHA2: &str = "caching_sha2_password";

fn sha1(parts: &[&[u8]]) -> [u8; 20] {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

pub(crate) fn scramble_native(password: &str, nonce: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let first = sha1(&[password.as_bytes()]);
    let double = sha1(&[&first]);
    let salted = sha1(&[&double, nonce]);
    first.iter().zip(salted).map(|(a, b)| a ^ b).collect()
}

pub(crate) fn scramble_caching_sha2(password: &str, nonce: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let first = sha256(&[password.as_bytes()]);
    let double = sha256(&[&first]);
    let salted = sha256(&[&double, nonce]);
    first.iter().zip(salted).map(|(a, b)| a ^ b).collect()
}
