#![deny(unsafe_code)]

//! Core of the nans editor.
//!
//! Holds everything that is not terminal plumbing: the document buffer, the
//! completion engine and the introspection registry it queries, file I/O,
//! self-update, and the status feed that surfaces warnings in the UI.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Context classification and candidate generation.
pub mod completion;
/// Text buffer with a cursor.
pub mod document;
/// Loading and saving the edited file.
pub mod files;
/// Registry-backed object introspection and installed-module discovery.
pub mod introspect;
/// Status-bar feed of warnings captured from `tracing`.
pub mod logging;
/// Background self-update.
pub mod update;

pub use completion::{Candidate, CandidateKind, CompletionContext, CompletionEngine, Completions};
pub use document::Document;
pub use files::FileError;
pub use introspect::{ModuleIndex, ModuleRegistry, ObjectIntrospector, RegistryError};
pub use logging::{StatusFeed, StatusReader};
pub use update::{SelfUpdater, UpdateError, UpdateEvent};
