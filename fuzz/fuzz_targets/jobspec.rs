#![no_main]

use libfuzzer_sys::fuzz_target;
use testuqwordladder_core::{parse_exit_status, parse_job_spec};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Alternate the readability answer so every error path is reachable
    let mut toggle = false;
    if let Ok(entries) = parse_job_spec(&text, |_| {
        toggle = !toggle;
        toggle
    }) {
        for entry in &entries {
            assert!(!entry.id.is_empty() && !entry.id.contains('/'));
        }
    }

    let _ = parse_exit_status(&text);
});
