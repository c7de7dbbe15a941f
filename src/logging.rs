//! Logging setup
//!
//! The library only emits `tracing` events. Programs that want to see them
//! call [`init`] once; logs go to stderr so they never mix with echoed
//! shell output on stdout.

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable that turns on debug logging (`1` or `true`)
pub const DEBUG_ENV: &str = "SHELLBRIDGE_DEBUG";

/// Install a compact stderr subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` the level is `info`, or `debug` when
/// `SHELLBRIDGE_DEBUG` is set. Returns `false` if a global subscriber was
/// already installed.
pub fn init() -> bool {
    let debug = env::var(DEBUG_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    init_with_default(if debug { "debug" } else { "info" })
}

/// Like [`init`], with an explicit fallback filter when `RUST_LOG` is unset
pub fn init_with_default(default_filter: &str) -> bool {
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init()
        .is_ok()
}
