//! Format registry: which formats this build supports.

use crate::flags::{FlagSet, GmeType, Ym2612Core};
use crate::format::FormatDescriptor;
use crate::{COMPILED, GmeError, YM2612_CORE};

/// Set of formats represented as bits, indexed by declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSet(u16);

impl FormatSet {
    const EMPTY: Self = FormatSet(0);

    #[allow(unused_mut)]
    fn all_compiled() -> Self {
        let mut set = Self::EMPTY;

        #[cfg(gme_use_ay)]
        set.insert(GmeType::Ay);
        #[cfg(gme_use_gbs)]
        set.insert(GmeType::Gbs);
        #[cfg(gme_use_gym)]
        set.insert(GmeType::Gym);
        #[cfg(gme_use_hes)]
        set.insert(GmeType::Hes);
        #[cfg(gme_use_kss)]
        set.insert(GmeType::Kss);
        #[cfg(gme_use_nsf)]
        set.insert(GmeType::Nsf);
        #[cfg(gme_use_nsfe)]
        set.insert(GmeType::Nsfe);
        #[cfg(gme_use_sap)]
        set.insert(GmeType::Sap);
        #[cfg(gme_use_spc)]
        set.insert(GmeType::Spc);
        #[cfg(gme_use_vgm)]
        {
            set.insert(GmeType::Vgm);
            set.insert(GmeType::Vgz);
        }

        set
    }

    fn from_flags(flags: FlagSet) -> Self {
        let mut set = Self::EMPTY;
        for format in flags.formats() {
            set.insert(format);
        }
        set
    }

    fn bit(format: GmeType) -> u16 {
        1 << format as u16
    }

    fn contains(self, format: GmeType) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    fn insert(&mut self, format: GmeType) {
        self.0 |= Self::bit(format);
    }

    fn remove(&mut self, format: GmeType) {
        self.0 &= !Self::bit(format);
    }

    fn iter(self) -> impl Iterator<Item = GmeType> {
        GmeType::ALL.into_iter().filter(move |&f| self.contains(f))
    }
}

/// Runtime format registry.
///
/// The build configuration determines which emulators are *compiled in*;
/// the registry can further narrow which of those are *enabled*, e.g. a
/// player that refuses multi-track formats in some mode. It can never
/// enable a format whose emulator is absent.
///
/// With no emulators compiled in, [`FormatRegistry::compiled`] is simply
/// empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatRegistry {
    enabled: FormatSet,
}

impl FormatRegistry {
    /// All compiled-in formats enabled.
    pub fn compiled() -> Self {
        let enabled = FormatSet::all_compiled();
        debug_assert_eq!(enabled, FormatSet::from_flags(COMPILED));
        Self { enabled }
    }

    /// Nothing enabled — caller must opt in.
    pub fn none() -> Self {
        Self {
            enabled: FormatSet::EMPTY,
        }
    }

    /// Enable or disable a format.
    ///
    /// Enabling a format that is not compiled in has no effect.
    pub fn with_format(mut self, format: GmeType, enabled: bool) -> Self {
        if enabled && Self::is_compiled(format) {
            self.enabled.insert(format);
        } else {
            self.enabled.remove(format);
        }
        self
    }

    /// Is this format's emulator compiled into the build?
    pub fn is_compiled(format: GmeType) -> bool {
        match format {
            #[cfg(gme_use_ay)]
            GmeType::Ay => true,
            #[cfg(not(gme_use_ay))]
            GmeType::Ay => false,

            #[cfg(gme_use_gbs)]
            GmeType::Gbs => true,
            #[cfg(not(gme_use_gbs))]
            GmeType::Gbs => false,

            #[cfg(gme_use_gym)]
            GmeType::Gym => true,
            #[cfg(not(gme_use_gym))]
            GmeType::Gym => false,

            #[cfg(gme_use_hes)]
            GmeType::Hes => true,
            #[cfg(not(gme_use_hes))]
            GmeType::Hes => false,

            #[cfg(gme_use_kss)]
            GmeType::Kss => true,
            #[cfg(not(gme_use_kss))]
            GmeType::Kss => false,

            #[cfg(gme_use_nsf)]
            GmeType::Nsf => true,
            #[cfg(not(gme_use_nsf))]
            GmeType::Nsf => false,

            #[cfg(gme_use_nsfe)]
            GmeType::Nsfe => true,
            #[cfg(not(gme_use_nsfe))]
            GmeType::Nsfe => false,

            #[cfg(gme_use_sap)]
            GmeType::Sap => true,
            #[cfg(not(gme_use_sap))]
            GmeType::Sap => false,

            #[cfg(gme_use_spc)]
            GmeType::Spc => true,
            #[cfg(not(gme_use_spc))]
            GmeType::Spc => false,

            #[cfg(gme_use_vgm)]
            GmeType::Vgm | GmeType::Vgz => true,
            #[cfg(not(gme_use_vgm))]
            GmeType::Vgm | GmeType::Vgz => false,
        }
    }

    /// YM2612 core compiled in for VGM and GYM, if either is.
    pub fn ym2612_core() -> Option<Ym2612Core> {
        let core = if cfg!(gme_ym2612 = "nuked") {
            Some(Ym2612Core::Nuked)
        } else if cfg!(gme_ym2612 = "mame") {
            Some(Ym2612Core::Mame)
        } else if cfg!(gme_ym2612 = "gens") {
            Some(Ym2612Core::Gens)
        } else {
            None
        };
        debug_assert_eq!(core, YM2612_CORE);
        core
    }

    /// Is this format compiled in AND enabled?
    pub fn supports(&self, format: GmeType) -> bool {
        self.enabled.contains(format) && Self::is_compiled(format)
    }

    /// Check a format against the registry.
    pub fn check(&self, format: GmeType) -> Result<GmeType, GmeError> {
        if !Self::is_compiled(format) {
            Err(GmeError::UnsupportedFormat(format))
        } else if !self.enabled.contains(format) {
            Err(GmeError::DisabledFormat(format))
        } else {
            Ok(format)
        }
    }

    /// Formats that are both compiled in and enabled, in declaration order.
    pub fn formats(&self) -> impl Iterator<Item = GmeType> + use<> {
        let enabled = self.enabled;
        enabled.iter().filter(|&f| Self::is_compiled(f))
    }

    /// One descriptor per supported format.
    pub fn descriptors(&self) -> impl Iterator<Item = FormatDescriptor> + use<> {
        self.formats().map(GmeType::descriptor)
    }

    /// Number of supported formats.
    pub fn len(&self) -> usize {
        self.formats().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identify header bytes and check the format is supported.
    pub fn identify(&self, data: &[u8]) -> Result<GmeType, GmeError> {
        let format = GmeType::detect(data).ok_or(GmeError::UnrecognizedFormat)?;
        self.check(format)
    }

    /// Identify a file extension and check the format is supported.
    pub fn identify_extension(&self, ext: &str) -> Result<GmeType, GmeError> {
        let format = GmeType::from_extension(ext)
            .ok_or_else(|| GmeError::UnknownExtension(ext.into()))?;
        self.check(format)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::compiled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::CapabilityFlag;
    use alloc::vec::Vec;

    #[test]
    fn cfgs_agree_with_generated_flags() {
        assert_eq!(FormatSet::all_compiled(), FormatSet::from_flags(COMPILED));
        for format in GmeType::ALL {
            assert_eq!(
                FormatRegistry::is_compiled(format),
                COMPILED.contains(format.flag()),
                "{format}"
            );
        }
    }

    #[test]
    fn ym2612_cfg_agrees_with_generated_core() {
        assert_eq!(FormatRegistry::ym2612_core(), YM2612_CORE);
        let fm = FormatRegistry::is_compiled(GmeType::Vgm)
            || FormatRegistry::is_compiled(GmeType::Gym);
        assert_eq!(FormatRegistry::ym2612_core().is_some(), fm);
    }

    #[test]
    fn compiled_registry_matches_present_flags() {
        let registry = FormatRegistry::compiled();
        let expected: Vec<_> = COMPILED.formats().collect();
        assert_eq!(registry.formats().collect::<Vec<_>>(), expected);
        assert_eq!(registry.len(), expected.len());
        assert_eq!(registry.is_empty(), COMPILED.is_empty());
    }

    #[test]
    fn none_registry() {
        let registry = FormatRegistry::none();

        assert!(registry.is_empty());
        assert_eq!(registry.descriptors().count(), 0);
        for format in GmeType::ALL {
            assert!(!registry.supports(format));
        }
    }

    #[test]
    fn selective_enable() {
        let registry = FormatRegistry::none().with_format(GmeType::Nsf, true);

        assert_eq!(
            registry.supports(GmeType::Nsf),
            COMPILED.contains(CapabilityFlag::Nsf)
        );
        assert!(!registry.supports(GmeType::Spc));
    }

    #[test]
    fn toggle_format() {
        let registry = FormatRegistry::compiled().with_format(GmeType::Vgz, false);

        // VGZ disabled even if compiled, VGM untouched
        assert!(!registry.supports(GmeType::Vgz));
        assert_eq!(
            registry.supports(GmeType::Vgm),
            FormatRegistry::is_compiled(GmeType::Vgm)
        );
    }

    #[test]
    fn check_reports_why() {
        let registry = FormatRegistry::none();
        for format in GmeType::ALL {
            let expected = if FormatRegistry::is_compiled(format) {
                GmeError::DisabledFormat(format)
            } else {
                GmeError::UnsupportedFormat(format)
            };
            assert_eq!(registry.check(format), Err(expected));
        }
    }

    #[test]
    fn identify_unknown() {
        let registry = FormatRegistry::compiled();
        assert_eq!(registry.identify(b"OggS"), Err(GmeError::UnrecognizedFormat));
        assert_eq!(
            registry.identify_extension("ogg"),
            Err(GmeError::UnknownExtension("ogg".into()))
        );
    }

    #[test]
    fn identify_respects_build() {
        let registry = FormatRegistry::compiled();
        let result = registry.identify(b"NESM\x1a");
        if FormatRegistry::is_compiled(GmeType::Nsf) {
            assert_eq!(result, Ok(GmeType::Nsf));
        } else {
            assert_eq!(result, Err(GmeError::UnsupportedFormat(GmeType::Nsf)));
        }
    }
}
