//! Fuzz target for the completion engine.
//!
//! Run with: cargo +nightly fuzz run fuzz_completion
//!
//! The first two bytes pick the cursor offset (clamped by the engine); the
//! rest is the document. Every request must classify and finish without
//! panicking, and attribute candidates must never overwrite text.

#![no_main]

use std::sync::{Arc, LazyLock};

use libfuzzer_sys::fuzz_target;
use nans_core::{CompletionContext, CompletionEngine, ModuleIndex, ModuleRegistry};

static ENGINE: LazyLock<CompletionEngine> = LazyLock::new(|| {
    let registry = ModuleRegistry::bundled().expect("bundled registry parses");
    let modules = ModuleIndex::from_names(["numpy", "num2words", "requests"]);
    CompletionEngine::new(Arc::new(registry), Arc::new(modules))
});

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let offset = usize::from(u16::from_le_bytes([data[0], data[1]]));
    let text = String::from_utf8_lossy(&data[2..]);

    let completions = ENGINE.completions(&text, offset);
    let is_attribute = matches!(
        completions.context(),
        CompletionContext::AttributePath { .. }
    );
    for candidate in completions {
        if is_attribute {
            assert_eq!(candidate.replace_from, 0);
        } else {
            assert!(candidate.replace_from <= 0);
        }
    }
});
