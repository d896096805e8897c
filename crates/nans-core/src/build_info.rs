//! Build metadata embedded by `build.rs`.
//!
//! Shown by `nans-cli version` and logged once when the editor starts.

/// Short git commit hash, or `unknown` outside a checkout.
pub const GIT_HASH: &str = env!("NANS_GIT_HASH");

/// Unix epoch seconds at build time.
pub const BUILD_TIMESTAMP: &str = env!("NANS_BUILD_TIMESTAMP");

/// `debug` or `release`.
pub const BUILD_PROFILE: &str = env!("NANS_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `"0.1.0 (abc1234, debug)"`
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}

/// Multi-line block for `--version` style output.
pub fn long_version() -> String {
    format!(
        "nans {VERSION}\ncommit: {GIT_HASH}\nbuilt: {BUILD_TIMESTAMP}\nprofile: {BUILD_PROFILE}"
    )
}
