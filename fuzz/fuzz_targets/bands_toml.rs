#![no_main]

use bandwatch::bands::{BandClassifier, Bands};
use bandwatch::series::Mode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(bands) = Bands::from_toml_str(input) {
            if let Ok(classifier) = BandClassifier::new(bands) {
                for value in [f64::NEG_INFINITY, -1e9, 0.0, 25.0, 1e9, f64::NAN] {
                    let _ = classifier.classify(value, Mode::Idle);
                    let _ = classifier.classify(value, Mode::Run);
                }
            }
        }
    }
});
