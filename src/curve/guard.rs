// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-point failure isolation
//!
//! Leaf fields and mask callbacks are user code. A panic inside one of them must only
//! affect the point being queried, so every public point query runs through [`guarded`].
//!
//! `catch_unwind` does not silence the process panic hook: the default hook still prints
//! a message (and a backtrace when `RUST_BACKTRACE` is set) to stderr for every failing
//! point, in addition to the `warn!` emitted here. Callers running large batches over
//! untrusted fields can install a quieter hook with [`std::panic::set_hook`].

use std::panic::{self, AssertUnwindSafe};

/// Run `query`, turning a panic into `None`.
///
/// Nodes are immutable, so no state can be left half-updated by an unwind.
pub(crate) fn guarded<T>(what: &str, x: f64, y: f64, query: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(query)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            log::warn!("{what} failed at ({x}, {y}): {message}; treating point as not contained");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_values_through() {
        assert_eq!(guarded("value", 0.0, 0.0, || 42), Some(42));
    }

    #[test]
    fn test_catches_panics() {
        let result: Option<bool> = guarded("mask", 1.0, 2.0, || panic!("bad mask"));
        assert_eq!(result, None);
    }
}
