// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config_hash(bytes) = lowercase-hex(SHA-256(bytes))`.

use sha2::{Digest, Sha256};

/// Hash raw config bytes to a 64-character lowercase hex string.
pub fn config_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
#[path = "config_hash_tests.rs"]
mod tests;
