#![no_main]

use libfuzzer_sys::fuzz_target;
use pcmwave::WaveContainer;

fuzz_target!(|data: &[u8]| {
    if let Ok(wave) = WaveContainer::parse(data) {
        // Anything that parses must serialize to a file that parses back identically.
        let bytes = wave.to_bytes();
        let reparsed = WaveContainer::parse(&bytes).expect("serialized output must parse");
        assert_eq!(reparsed, wave);
    }
});
