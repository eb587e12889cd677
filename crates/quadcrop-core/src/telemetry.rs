// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracing subscriber setup for hosts embedding the scanner.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"` or `"quadcrop_vision=debug"`).
///
/// Returns `false` when a global subscriber was already installed, so it is
/// safe to call from every entry point and from tests.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_directive, "tracing subscriber installed");
    }
    installed
}
