//! Registry behaviour for whatever set of emulators this build was
//! configured with.

use gme_formats::{
    BUILD, COMPILED, CapabilityFlag, FlagSet, FormatRegistry, GmeError, GmeType, SharedModule,
    YM2612_CORE,
};

#[test]
fn descriptors_equal_present_formats() {
    let registry = FormatRegistry::compiled();
    let described: Vec<GmeType> = registry.descriptors().map(|d| d.format).collect();
    let present: Vec<GmeType> = COMPILED.formats().collect();
    assert_eq!(described, present);
}

#[test]
fn no_extras_no_omissions() {
    let registry = FormatRegistry::default();
    for format in GmeType::ALL {
        assert_eq!(
            registry.supports(format),
            COMPILED.contains(format.flag()),
            "{format}"
        );
    }
}

#[test]
fn paired_formats_never_diverge() {
    let registry = FormatRegistry::compiled();
    assert_eq!(
        registry.supports(GmeType::Vgm),
        registry.supports(GmeType::Vgz)
    );
    assert_eq!(
        FormatRegistry::is_compiled(GmeType::Vgm),
        FormatRegistry::is_compiled(GmeType::Vgz)
    );
}

#[test]
fn empty_build_is_valid() {
    if COMPILED != FlagSet::EMPTY {
        return;
    }
    let registry = FormatRegistry::compiled();
    assert!(registry.is_empty());
    assert_eq!(registry.descriptors().count(), 0);
    assert_eq!(
        registry.identify(b"SNES-SPC700 Sound File Data"),
        Err(GmeError::UnsupportedFormat(GmeType::Spc))
    );
}

#[test]
fn identify_by_extension_follows_build() {
    let registry = FormatRegistry::compiled();
    for format in GmeType::ALL {
        let ext = format.extension().to_lowercase();
        let result = registry.identify_extension(&ext);
        if COMPILED.contains(format.flag()) {
            assert_eq!(result, Ok(format));
        } else {
            assert_eq!(result, Err(GmeError::UnsupportedFormat(format)));
        }
    }
}

#[test]
fn unsupported_error_names_the_switch() {
    let message = GmeError::UnsupportedFormat(GmeType::Vgz).to_string();
    assert!(message.contains("VGZ"), "{message}");
    assert!(message.contains("USE_GME_VGZ"), "{message}");
}

#[test]
fn generated_header_agrees_with_constant() {
    let header = BUILD.to_c_header();
    for flag in CapabilityFlag::ALL {
        let defined = format!("#define {} 1\n", flag.define());
        assert_eq!(header.contains(&defined), COMPILED.contains(flag), "{flag}");
    }
    match YM2612_CORE {
        Some(core) => assert!(header.contains(&format!("#define {} 1\n", core.define()))),
        None => assert!(!header.contains("VGM_YM2612")),
    }
}

#[test]
fn ym2612_core_only_with_fm_emulators() {
    assert_eq!(YM2612_CORE.is_some(), COMPILED.needs_ym2612());
    assert_eq!(
        COMPILED.modules().any(|m| m == SharedModule::Ym2612),
        COMPILED.needs_ym2612()
    );
    if cfg!(feature = "ym2612-nuked") && COMPILED.needs_ym2612() {
        assert_eq!(YM2612_CORE, Some(gme_formats::Ym2612Core::Nuked));
    }
}

#[test]
fn written_header_is_current() {
    let written = include_str!(concat!(env!("OUT_DIR"), "/gme_types.h"));
    assert_eq!(written, BUILD.to_c_header());
}

#[cfg(feature = "serde")]
#[test]
fn descriptor_json() {
    let json = serde_json::to_value(GmeType::Nsfe.descriptor()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "format": "nsfe",
            "system": "Nintendo NES",
            "extension": "NSFE",
            "multi_track": true,
        })
    );
}
