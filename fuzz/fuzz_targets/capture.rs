#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(capture) = pktanalyzer::Capture::parse(data) else {
        return;
    };

    let first = capture.report().to_string();
    assert_eq!(first, capture.report().to_string());
});
