//! # Thread Utilities

use core::str::FromStr;
use std::{env, thread};

/// The search list of environment variables that Rayon uses to control parallelism.
const RAYON_VARS: &[&str] = &["RAYON_NUM_THREADS", "RAYON_RS_NUM_CPUS"];

/// Get the max parallelism available.
///
/// Scans over the Rayon environment variables first; then falls back to
/// ``thread::available_parallelism()``, and finally to ``1``.
pub fn est_max_parallelism() -> usize {
    for name in RAYON_VARS {
        if let Some(x @ 1..) = env::var(name).ok().and_then(|s| usize::from_str(&s).ok()) {
            return x;
        }
    }

    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_est_max_parallelism() {
        assert!(est_max_parallelism() >= 1);
    }
}
