#![no_main]

use gme_formats::flags::{self, FlagRequests};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str)| {
    let (list, switch) = input;
    let env = [("USE_GME_VGM".to_string(), switch.to_string())];
    if let Ok((requests, _)) = FlagRequests::from_sources(["gym"], Some(list), env) {
        let first = flags::resolve_build(&requests);
        assert_eq!(flags::resolve_build(&requests), first);
        if let Ok(build) = first {
            assert_eq!(build.ym2612.is_some(), build.flags.needs_ym2612());
        }
    }
});
