#![no_main]

use std::error::Error;
use libfuzzer_sys::fuzz_target;
use pktanalyzer::render::Layer;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_tcp(data);
});

fn fuzz_tcp(bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    let segment = pktanalyzer::tcp::Segment::new(bytes)?;

    let _sequence = segment.sequence();
    let _acked = segment.acked();
    let _ns = segment.ns();
    let _flags = segment.flags();
    let _summary = segment.flags_summary();
    let _payload = segment.payload().map(|payload| payload.fields());
    let _fields = segment.fields();

    Ok(())
}
