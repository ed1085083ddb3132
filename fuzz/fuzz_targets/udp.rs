#![no_main]

use libfuzzer_sys::fuzz_target;
use pktanalyzer::render::{sections, Layer};

fuzz_target!(|data: &[u8]| {
    if let Ok(datagram) = pktanalyzer::udp::Datagram::new(data) {
        let _len = datagram.len();
        let _fields = datagram.fields();
        let _sections = sections(&datagram);
    }
});
