#![no_main]

use libfuzzer_sys::fuzz_target;
use pktanalyzer::render::{sections, Layer};

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = pktanalyzer::icmp::Message::new(data) {
        let _name = message.typ().name();
        let _rest = message.rest_of_header();
        let _fields = message.fields();
        let _sections = sections(&message);
    }
});
