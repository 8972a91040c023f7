#![no_main]

use bdl::diagnostics::NullSink;
use bdl::frontend::{lexer, parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // The tokenizer and parser never fail; they must also never panic.
        let _ = lexer::lex(s);
        let _ = parser::parse(s, &parser::ParseOptions::default(), &mut NullSink);
    }
});
