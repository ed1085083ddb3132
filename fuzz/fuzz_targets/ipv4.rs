#![no_main]

use std::error::Error;
use libfuzzer_sys::fuzz_target;
use pktanalyzer::render::Layer;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_ipv4(data);
});

fn fuzz_ipv4(bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    let packet = pktanalyzer::ipv4::Packet::new(bytes)?;

    let _version = packet.version();
    let _dscp = packet.dscp();
    let _ecn = packet.ecn();
    let _flags = packet.flags();
    let _offset = packet.fragment_offset();
    let _options = packet.options().map(|bytes| bytes.to_owned());
    let _payload = packet.payload();
    let _fields = packet.fields();
    let _sections = pktanalyzer::render::sections(&packet);

    Ok(())
}
