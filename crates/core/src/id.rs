// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types and generation.
//!
//! `run_id`, `execution_id`, and `event_id` all follow the same shape: a
//! fixed literal prefix followed by lowercase hex. Uniqueness is
//! process-monotonic per §9 ("Identifier generation") — a nanosecond
//! timestamp combined with an atomic counter, since clock monotonicity
//! alone doesn't guarantee two calls land in different nanoseconds.

use std::borrow::Borrow;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static EVENT_COUNTER: AtomicU32 = AtomicU32::new(0);
static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

fn next_id_counter() -> u32 {
    ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn next_event_counter() -> u32 {
    EVENT_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn now_ns() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos() as u64
}

/// Returns a string slice truncated to at most `n` characters, on a char
/// boundary.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut end = n;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Define a string-backed identifier type with a fixed prefix.
///
/// Unlike the fixed-width nanoid IDs used elsewhere in this codebase, these
/// wrap an owned `String` because the wire formats they must satisfy
/// (`run_[0-9a-f]{16,64}`, `exe_[0-9a-f]{8,64}`) are variable-length.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing string without validating its shape, e.g.
            /// when deserializing an ID produced elsewhere in the system.
            pub fn from_string(id: impl AsRef<str>) -> Self {
                Self(id.as_ref().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The ID suffix with the type prefix stripped.
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }

            pub fn short(&self, n: usize) -> &str {
                short(self.suffix(), n)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Matches `^run_[0-9a-f]{16,64}$`.
    pub struct RunId("run_");
}

define_id! {
    /// Matches `^exe_[0-9a-f]{8,64}$`.
    pub struct ExecutionId("exe_");
}

define_id! {
    /// Opaque within a run; unique within process lifetime.
    pub struct EventId("evt_");
}

impl RunId {
    /// `run_<16 hex of ts_ns><4 hex of counter>`.
    pub fn generate() -> Self {
        let ts = now_ns();
        let counter = next_id_counter() & 0xffff;
        Self(format!("run_{:016x}{:04x}", ts, counter))
    }
}

impl ExecutionId {
    /// `exe_<12 hex><4 hex>`.
    pub fn generate() -> Self {
        let ts = now_ns();
        let counter = next_id_counter() & 0xffff;
        Self(format!("exe_{:012x}{:04x}", ts & 0xffff_ffff_ffff, counter))
    }
}

impl EventId {
    /// `evt_<hex(ts_ms)><hex(counter)>`, built from the process-wide
    /// monotonic counter called out in §9 — the only global mutable state
    /// this core carries.
    pub fn generate(ts_ms: u64) -> Self {
        let counter = next_event_counter();
        Self(format!("evt_{:012x}{:08x}", ts_ms, counter))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
