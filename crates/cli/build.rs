//! Build script for the walksafe CLI
//!
//! Records package, target and compiler details for `check-config`, and
//! the commit hash and build time shown by `walksafe --version`.

use std::env;

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // CI exports GIT_COMMIT_HASH; local builds report "unknown"
    println!(
        "cargo:rustc-env=BUILT_GIT_COMMIT_HASH={}",
        env::var("GIT_COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=BUILT_TIME_UTC={}",
        chrono::Utc::now().to_rfc3339()
    );
}
