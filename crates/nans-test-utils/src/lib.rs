#![deny(unsafe_code)]

//! Shared test utilities for the nans workspace.
//!
//! Config builders, canned introspection data, on-disk workspaces with a
//! fake `site-packages`, and tracing setup, so crate tests stay short.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! nans-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod introspect;
pub mod tracing_setup;
pub mod workspace;

pub use config::TestConfigBuilder;
pub use introspect::{StaticIntrospector, fixture_engine, fixture_registry};
pub use workspace::TestWorkspace;
