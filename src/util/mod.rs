// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shared utilities.

pub mod debounce;
pub mod geometry;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a unique id for new groups and hotspots.
///
/// Millisecond timestamp plus a process-local counter; the counter
/// keeps ids unique when several are minted in the same millisecond.
pub fn fresh_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_unique() {
        let a = fresh_id();
        let b = fresh_id();
        assert_ne!(a, b);
    }
}
