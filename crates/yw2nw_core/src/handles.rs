//! novelWriter handle registry.
//!
//! # Responsibility
//! - Validate and record the 13-character handles of one project.
//! - Derive new handles deterministically from text.
//!
//! # Invariants
//! - A handle is exactly 13 characters from `abcdef0123456789`.
//! - A handle is accepted at most once; members are never removed.
//! - `create` yields the same handle for the same text and registry state.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::HashSet;
use thiserror::Error;

/// Symbols used by novelWriter handles, in extraction order.
pub const HANDLE_CHARS: &[u8; 16] = b"abcdef0123456789";
/// Handle length.
pub const HANDLE_SIZE: usize = 13;
/// Highest salt tried before `create` gives up.
pub const MAX_SALT: u32 = 1000;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    /// Every salt up to `MAX_SALT` produced a rejected handle.
    #[error("unable to create a proper handle for `{seed}`")]
    Exhausted { seed: String },
}

/// Set of handles in use by one project.
#[derive(Debug, Default, Clone)]
pub struct Handles {
    members: HashSet<String>,
}

impl Handles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, handle: &str) -> bool {
        self.members.contains(handle)
    }

    /// Records `handle` when it is well-formed and not yet used.
    ///
    /// Returns `false` for any rejection; malformed input is not an error here.
    pub fn add(&mut self, handle: &str) -> bool {
        if !is_valid_handle(handle) || self.has(handle) {
            return false;
        }
        self.members.insert(handle.to_string());
        true
    }

    /// Derives a fresh handle from `seed` and records it.
    ///
    /// The salt starts at 0 and is raised until the candidate is accepted.
    pub fn create(&mut self, seed: &str) -> Result<String, HandleError> {
        for salt in 0..=MAX_SALT {
            let candidate = derive_handle(seed, salt);
            if self.add(&candidate) {
                return Ok(candidate);
            }
        }
        Err(HandleError::Exhausted {
            seed: seed.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

pub fn is_valid_handle(handle: &str) -> bool {
    handle.len() == HANDLE_SIZE && handle.bytes().all(|b| HANDLE_CHARS.contains(&b))
}

/// Derives a candidate handle: one PBKDF2-HMAC-SHA1 block with a single
/// iteration, keyed by `seed`, salted with `salt` zero bytes.
///
/// The key is read as a big-endian integer and symbols are taken by repeated
/// modulo 16 until 13 symbols are collected or the integer reaches zero. A
/// short result is later rejected by `Handles::add`.
pub fn derive_handle(seed: &str, salt: u32) -> String {
    let key = pbkdf2_sha1_block(seed.as_bytes(), salt as usize);

    // Base-16 digits of the key, least significant first.
    let digits: Vec<u8> = key
        .iter()
        .rev()
        .flat_map(|byte| [byte & 0x0f, byte >> 4])
        .collect();

    let mut handle = String::with_capacity(HANDLE_SIZE);
    for (index, digit) in digits.iter().enumerate() {
        if handle.len() == HANDLE_SIZE || digits[index..].iter().all(|d| *d == 0) {
            break;
        }
        handle.push(HANDLE_CHARS[usize::from(*digit)] as char);
    }
    handle
}

fn pbkdf2_sha1_block(password: &[u8], salt_len: usize) -> [u8; 20] {
    let mut mac = HmacSha1::new_from_slice(password).expect("hmac accepts keys of any length");
    mac.update(&vec![0u8; salt_len]);
    mac.update(&1u32.to_be_bytes());
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::{derive_handle, is_valid_handle};

    #[test]
    fn derived_handles_depend_on_salt() {
        assert_ne!(derive_handle("seed", 0), derive_handle("seed", 1));
        assert_eq!(derive_handle("seed", 3), derive_handle("seed", 3));
    }

    #[test]
    fn validity_checks_length_and_alphabet() {
        assert!(is_valid_handle("0123456789abc"));
        assert!(!is_valid_handle("0123456789ab"));
        assert!(!is_valid_handle("0123456789abg"));
        assert!(!is_valid_handle("0123456789ABC"));
    }
}
