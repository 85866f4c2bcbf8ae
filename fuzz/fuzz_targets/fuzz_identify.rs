#![no_main]

use gme_formats::{FormatRegistry, GmeError, GmeType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let registry = FormatRegistry::compiled();
    match registry.identify(data) {
        Ok(format) => assert_eq!(GmeType::detect(data), Some(format)),
        Err(GmeError::UnrecognizedFormat) => assert_eq!(GmeType::detect(data), None),
        Err(_) => {}
    }
});
