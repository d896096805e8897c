//! Fuzz target for alias extraction.
//!
//! Run with: cargo +nightly fuzz run fuzz_alias_table
//!
//! Arbitrary text must yield only well-formed entries that resolve to
//! themselves, and refreshing twice must agree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nans_core::completion::AliasTable;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let table = AliasTable::refresh(&text);

    for entry in table.entries() {
        assert!(!entry.local_name.is_empty());
        assert!(!entry.target.is_empty());
        assert_eq!(table.resolve(&entry.local_name), Some(entry.target.as_str()));
    }
    assert_eq!(table.len(), AliasTable::refresh(&text).len());
});
