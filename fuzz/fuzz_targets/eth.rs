#![no_main]

use std::error::Error;
use libfuzzer_sys::fuzz_target;
use pktanalyzer::render::Layer;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_eth(data);
});

fn fuzz_eth(bytes: &[u8]) -> Result<(), Box<dyn Error>> {
    let frame = pktanalyzer::enet::Frame::new(bytes)?;

    let _dest = frame.dest().to_string();
    let _source = frame.source().to_string();
    let _label = frame.length_type().label();
    let _payload = frame.payload();
    let _fields = frame.fields();

    Ok(())
}
