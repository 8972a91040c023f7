#![no_main]

use bdl::frontend::check::{CheckForErrors, CheckOptions};
use bdl::Program;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let program = Program::default();
        let id = program.add_source("fuzz.4gl", s);
        program.annotate(id);
        let _ = CheckForErrors::new(&program, CheckOptions::default()).check_program();
    }
});
