#![no_main]

use bandwatch::ingest::CsvSeriesLoader;
use bandwatch::series::Mode;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Arbitrary log content must parse or fail cleanly, never panic
    if let Ok(input) = std::str::from_utf8(data) {
        let loader = CsvSeriesLoader::default();
        let _ = loader.parse(Path::new("HTOL_fuzz.csv"), input, "Temp", Mode::Run);
    }
});
