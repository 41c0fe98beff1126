//! Fuzz target for parsing, loading and analysis.
//!
//! Arbitrary text must either be rejected with an error or analyzed
//! without panicking, including degenerate tables that reach PCA.

#![no_main]

use libfuzzer_sys::fuzz_target;
use watermetal::{Analyzer, DatasetLoader, Parser};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(table) = Parser::new().parse_str(text) else {
        return;
    };
    if let Ok((dataset, _)) = DatasetLoader::new().load(&table) {
        let _ = Analyzer::new().analyze_dataset(&dataset);
    }
});
