//! Capability flags: which emulators a build includes.
//!
//! Each optional emulator is one [`CapabilityFlag`]. A build resolves every
//! flag to present or absent exactly once, in `build.rs`, from the explicit
//! requests collected in [`FlagRequests`]. Nothing is enabled unless asked for.
//!
//! This file is also compiled into the build script (via `#[path]`), so it
//! must only depend on `core`, `alloc` and `thiserror`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Write as _;

/// One independent "compile this emulator in" decision.
///
/// VGM and VGZ files are played by the same emulator, so both are governed
/// by [`CapabilityFlag::Vgm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityFlag {
    Ay,
    Gbs,
    Gym,
    Hes,
    Kss,
    Nsf,
    Nsfe,
    Sap,
    Spc,
    Vgm,
}

impl CapabilityFlag {
    /// Every flag, in declaration order.
    pub const ALL: [CapabilityFlag; 10] = [
        CapabilityFlag::Ay,
        CapabilityFlag::Gbs,
        CapabilityFlag::Gym,
        CapabilityFlag::Hes,
        CapabilityFlag::Kss,
        CapabilityFlag::Nsf,
        CapabilityFlag::Nsfe,
        CapabilityFlag::Sap,
        CapabilityFlag::Spc,
        CapabilityFlag::Vgm,
    ];

    /// Preprocessor name used in `gme_types.h`.
    pub const fn define(self) -> &'static str {
        match self {
            CapabilityFlag::Ay => "USE_GME_AY",
            CapabilityFlag::Gbs => "USE_GME_GBS",
            CapabilityFlag::Gym => "USE_GME_GYM",
            CapabilityFlag::Hes => "USE_GME_HES",
            CapabilityFlag::Kss => "USE_GME_KSS",
            CapabilityFlag::Nsf => "USE_GME_NSF",
            CapabilityFlag::Nsfe => "USE_GME_NSFE",
            CapabilityFlag::Sap => "USE_GME_SAP",
            CapabilityFlag::Spc => "USE_GME_SPC",
            CapabilityFlag::Vgm => "USE_GME_VGM",
        }
    }

    /// Name of the `cfg` the build script sets when this flag is present.
    pub const fn cfg_name(self) -> &'static str {
        match self {
            CapabilityFlag::Ay => "gme_use_ay",
            CapabilityFlag::Gbs => "gme_use_gbs",
            CapabilityFlag::Gym => "gme_use_gym",
            CapabilityFlag::Hes => "gme_use_hes",
            CapabilityFlag::Kss => "gme_use_kss",
            CapabilityFlag::Nsf => "gme_use_nsf",
            CapabilityFlag::Nsfe => "gme_use_nsfe",
            CapabilityFlag::Sap => "gme_use_sap",
            CapabilityFlag::Spc => "gme_use_spc",
            CapabilityFlag::Vgm => "gme_use_vgm",
        }
    }

    /// Formats played by this flag's emulator.
    pub const fn formats(self) -> &'static [GmeType] {
        match self {
            CapabilityFlag::Ay => &[GmeType::Ay],
            CapabilityFlag::Gbs => &[GmeType::Gbs],
            CapabilityFlag::Gym => &[GmeType::Gym],
            CapabilityFlag::Hes => &[GmeType::Hes],
            CapabilityFlag::Kss => &[GmeType::Kss],
            CapabilityFlag::Nsf => &[GmeType::Nsf],
            CapabilityFlag::Nsfe => &[GmeType::Nsfe],
            CapabilityFlag::Sap => &[GmeType::Sap],
            CapabilityFlag::Spc => &[GmeType::Spc],
            CapabilityFlag::Vgm => &[GmeType::Vgm, GmeType::Vgz],
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for CapabilityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.define())
    }
}

/// Music file formats known to Game Music Emu.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GmeType {
    Ay,
    Gbs,
    Gym,
    Hes,
    Kss,
    Nsf,
    Nsfe,
    Sap,
    Spc,
    Vgm,
    /// Gzipped VGM. Comes with [`GmeType::Vgm`].
    Vgz,
}

impl GmeType {
    /// Every format, in declaration order.
    pub const ALL: [GmeType; 11] = [
        GmeType::Ay,
        GmeType::Gbs,
        GmeType::Gym,
        GmeType::Hes,
        GmeType::Kss,
        GmeType::Nsf,
        GmeType::Nsfe,
        GmeType::Sap,
        GmeType::Spc,
        GmeType::Vgm,
        GmeType::Vgz,
    ];

    /// Lower-case identifier, as used by Cargo features and `GME_FORMATS`.
    pub const fn id(self) -> &'static str {
        match self {
            GmeType::Ay => "ay",
            GmeType::Gbs => "gbs",
            GmeType::Gym => "gym",
            GmeType::Hes => "hes",
            GmeType::Kss => "kss",
            GmeType::Nsf => "nsf",
            GmeType::Nsfe => "nsfe",
            GmeType::Sap => "sap",
            GmeType::Spc => "spc",
            GmeType::Vgm => "vgm",
            GmeType::Vgz => "vgz",
        }
    }

    /// Name of the environment switch that overrides this format.
    pub const fn define(self) -> &'static str {
        match self {
            GmeType::Vgz => "USE_GME_VGZ",
            other => other.flag().define(),
        }
    }

    /// The flag whose emulator plays this format.
    pub const fn flag(self) -> CapabilityFlag {
        match self {
            GmeType::Ay => CapabilityFlag::Ay,
            GmeType::Gbs => CapabilityFlag::Gbs,
            GmeType::Gym => CapabilityFlag::Gym,
            GmeType::Hes => CapabilityFlag::Hes,
            GmeType::Kss => CapabilityFlag::Kss,
            GmeType::Nsf => CapabilityFlag::Nsf,
            GmeType::Nsfe => CapabilityFlag::Nsfe,
            GmeType::Sap => CapabilityFlag::Sap,
            GmeType::Spc => CapabilityFlag::Spc,
            GmeType::Vgm | GmeType::Vgz => CapabilityFlag::Vgm,
        }
    }

    /// Parse an identifier (`"nsfe"`, `"NSFE"`, `"USE_GME_NSFE"`).
    pub fn from_id(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = strip_prefix_ignore_case(name, "USE_GME_").unwrap_or(name);
        GmeType::ALL
            .into_iter()
            .find(|format| format.id().eq_ignore_ascii_case(name))
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GmeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.id().chars() {
            f.write_char(c.to_ascii_uppercase())?;
        }
        Ok(())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// FM synthesis core for the YM2612 chip, shared by VGM and GYM.
///
/// Exactly one core is compiled in when either of those emulators is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ym2612Core {
    /// Gens core. Fast, the default.
    #[default]
    Gens,
    /// Nuked OPN2. Cycle accurate and slow.
    Nuked,
    /// MAME core.
    Mame,
}

impl Ym2612Core {
    pub const ALL: [Ym2612Core; 3] = [Ym2612Core::Gens, Ym2612Core::Nuked, Ym2612Core::Mame];

    /// Lower-case name, the value of `cfg(gme_ym2612 = "...")`.
    pub const fn id(self) -> &'static str {
        match self {
            Ym2612Core::Gens => "gens",
            Ym2612Core::Nuked => "nuked",
            Ym2612Core::Mame => "mame",
        }
    }

    /// Preprocessor name used in `gme_types.h`.
    pub const fn define(self) -> &'static str {
        match self {
            Ym2612Core::Gens => "VGM_YM2612_GENS",
            Ym2612Core::Nuked => "VGM_YM2612_NUKED",
            Ym2612Core::Mame => "VGM_YM2612_MAME",
        }
    }

    /// Cargo feature selecting this core. The default core has none.
    pub const fn feature(self) -> Option<&'static str> {
        match self {
            Ym2612Core::Gens => None,
            Ym2612Core::Nuked => Some("ym2612-nuked"),
            Ym2612Core::Mame => Some("ym2612-mame"),
        }
    }

    fn from_feature(name: &str) -> Option<Self> {
        Ym2612Core::ALL
            .into_iter()
            .find(|core| core.feature() == Some(name))
    }
}

impl fmt::Display for Ym2612Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.define())
    }
}

/// Sound hardware emulation used by more than one emulator.
///
/// Compiled in when any of its [`users`](Self::users) is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SharedModule {
    /// General Instrument AY-3-8910.
    AyApu,
    /// TI SN76489 as found in the Master System.
    SmsApu,
    /// Yamaha YM2612, see [`Ym2612Core`].
    Ym2612,
    /// NES 2A03 CPU and APU with the expansion chips.
    NesCore,
}

impl SharedModule {
    pub const ALL: [SharedModule; 4] = [
        SharedModule::AyApu,
        SharedModule::SmsApu,
        SharedModule::Ym2612,
        SharedModule::NesCore,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SharedModule::AyApu => "Ay_Apu",
            SharedModule::SmsApu => "Sms_Apu",
            SharedModule::Ym2612 => "Ym2612",
            SharedModule::NesCore => "Nes_Core",
        }
    }

    /// Flags whose emulators pull this module in.
    pub const fn users(self) -> &'static [CapabilityFlag] {
        match self {
            SharedModule::AyApu => &[CapabilityFlag::Ay, CapabilityFlag::Kss],
            SharedModule::SmsApu => &[
                CapabilityFlag::Vgm,
                CapabilityFlag::Gym,
                CapabilityFlag::Kss,
            ],
            SharedModule::Ym2612 => &[CapabilityFlag::Vgm, CapabilityFlag::Gym],
            SharedModule::NesCore => &[CapabilityFlag::Nsf, CapabilityFlag::Nsfe],
        }
    }
}

impl fmt::Display for SharedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capability flags represented as bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlagSet(u16);

impl FlagSet {
    pub const EMPTY: Self = FlagSet(0);
    pub const ALL: Self = FlagSet((1 << CapabilityFlag::ALL.len()) - 1);

    /// Build a set from raw bits. Unknown bits are dropped.
    pub const fn from_bits(bits: u16) -> Self {
        FlagSet(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flag: CapabilityFlag) -> bool {
        (self.0 & flag.bit()) != 0
    }

    pub const fn with(self, flag: CapabilityFlag) -> Self {
        FlagSet(self.0 | flag.bit())
    }

    pub fn insert(&mut self, flag: CapabilityFlag) {
        self.0 |= flag.bit();
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Present flags, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = CapabilityFlag> {
        CapabilityFlag::ALL
            .into_iter()
            .filter(move |&flag| self.contains(flag))
    }

    /// Formats exposed by the present flags, in declaration order.
    pub fn formats(self) -> impl Iterator<Item = GmeType> {
        GmeType::ALL
            .into_iter()
            .filter(move |format| self.contains(format.flag()))
    }

    /// Shared modules the present emulators need, in declaration order.
    pub fn modules(self) -> impl Iterator<Item = SharedModule> {
        SharedModule::ALL
            .into_iter()
            .filter(move |module| module.users().iter().any(|&flag| self.contains(flag)))
    }

    /// Does any present emulator use the YM2612?
    pub fn needs_ym2612(self) -> bool {
        self.modules().any(|module| module == SharedModule::Ym2612)
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<CapabilityFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = CapabilityFlag>>(iter: I) -> Self {
        let mut set = FlagSet::EMPTY;
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// Everything the build script resolves: the emulators, and the YM2612
/// core when an emulator needs one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BuildConfig {
    pub flags: FlagSet,
    /// `Some` exactly when [`FlagSet::needs_ym2612`].
    pub ym2612: Option<Ym2612Core>,
}

impl BuildConfig {
    pub const fn new(flags: FlagSet, ym2612: Option<Ym2612Core>) -> Self {
        Self { flags, ym2612 }
    }

    /// Render the `gme_types.h` configuration header.
    pub fn to_c_header(self) -> String {
        let mut out = String::from(
            "#ifndef GME_TYPES_H\n\
             #define GME_TYPES_H\n\
             \n\
             /* Generated by the gme-formats build script. Each emulator is either\n \
             * defined to 1 or left #undef, depending on the Cargo features and\n \
             * USE_GME_* overrides the crate was built with.\n \
             *\n \
             * See gme_type_list() in gme.cpp\n \
             */\n\n",
        );
        for flag in CapabilityFlag::ALL {
            if flag == CapabilityFlag::Vgm {
                out.push_str("/* VGM and VGZ are a package deal */\n");
            }
            if self.flags.contains(flag) {
                let _ = writeln!(out, "#define {} 1", flag.define());
            } else {
                let _ = writeln!(out, "/* #undef {} */", flag.define());
            }
        }
        if let Some(core) = self.ym2612 {
            out.push_str("\n/* YM2612 core for VGM and GYM */\n");
            let _ = writeln!(out, "#define {} 1", core.define());
        }
        out.push_str("\n#endif /* GME_TYPES_H */\n");
        out
    }

    /// Render the Rust constants the library includes from `OUT_DIR`.
    pub fn to_rust_source(self) -> String {
        let mut out = String::from("/// Emulators compiled into this build.\n///\n");
        if self.flags.is_empty() {
            out.push_str("/// None.\n");
        }
        for flag in self.flags.iter() {
            let _ = writeln!(out, "/// - `{}`", flag.define());
        }
        let _ = writeln!(
            out,
            "pub const COMPILED: FlagSet = FlagSet::from_bits({:#06x});",
            self.flags.0
        );
        out.push_str("\n/// YM2612 core compiled in, if VGM or GYM is.\n");
        match self.ym2612 {
            Some(core) => {
                let _ = writeln!(
                    out,
                    "pub const YM2612_CORE: Option<Ym2612Core> = Some(Ym2612Core::{core:?});"
                );
            }
            None => out.push_str("pub const YM2612_CORE: Option<Ym2612Core> = None;\n"),
        }
        out
    }
}

/// Configuration error detected while resolving flags.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A format name that is not in [`GmeType::ALL`].
    #[error(
        "unknown format `{name}` (expected one of: ay, gbs, gym, hes, kss, nsf, nsfe, sap, spc, vgm, vgz)"
    )]
    UnknownFormat { name: String },

    /// Two formats sharing one emulator were requested in opposite states.
    #[error(
        "{enabled} and {disabled} share one emulator and are a package deal, \
         but {enabled} was enabled and {disabled} disabled"
    )]
    PairConflict { enabled: GmeType, disabled: GmeType },

    /// The same format was requested both enabled and disabled.
    #[error("{format} was requested both enabled and disabled")]
    ConflictingRequest { format: GmeType },

    /// A switch value that is not a recognizable boolean, or input that is
    /// not valid Unicode.
    #[error("invalid value `{value}` for {key} (expected ON/OFF, 1/0, true/false or yes/no)")]
    InvalidValue { key: String, value: String },

    /// More than one YM2612 core was selected.
    #[error("only one YM2612 core can be built, but both {first} and {second} were selected")]
    ConflictingCores {
        first: Ym2612Core,
        second: Ym2612Core,
    },
}

/// Explicit per-format requests collected from build configuration.
///
/// Formats never mentioned stay unset and resolve to absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagRequests {
    states: [Option<bool>; GmeType::ALL.len()],
    ym2612: Option<Ym2612Core>,
}

impl FlagRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every format explicitly enabled.
    pub fn all() -> Self {
        Self {
            states: [Some(true); GmeType::ALL.len()],
            ..Self::default()
        }
    }

    /// Record an explicit state. Requesting the opposite of an earlier
    /// request for the same format is an error.
    pub fn request(&mut self, format: GmeType, enabled: bool) -> Result<(), ConfigError> {
        match self.states[format.index()] {
            Some(previous) if previous != enabled => {
                Err(ConfigError::ConflictingRequest { format })
            }
            _ => {
                self.states[format.index()] = Some(enabled);
                Ok(())
            }
        }
    }

    /// Record an explicit state, replacing any earlier request.
    pub fn set(&mut self, format: GmeType, enabled: bool) {
        self.states[format.index()] = Some(enabled);
    }

    /// Like [`request`](Self::request), by name.
    pub fn request_named(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let format = GmeType::from_id(name).ok_or_else(|| ConfigError::UnknownFormat {
            name: String::from(name),
        })?;
        self.request(format, enabled)
    }

    /// Enable every format in a comma or whitespace separated list.
    pub fn request_list(&mut self, list: &str) -> Result<(), ConfigError> {
        for name in list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
        {
            self.request_named(name, true)?;
        }
        Ok(())
    }

    /// Explicit state for a format, if any.
    pub fn get(&self, format: GmeType) -> Option<bool> {
        self.states[format.index()]
    }

    /// Select a YM2612 core. Selecting two different cores is an error.
    pub fn request_ym2612(&mut self, core: Ym2612Core) -> Result<(), ConfigError> {
        match self.ym2612 {
            Some(first) if first != core => Err(ConfigError::ConflictingCores {
                first,
                second: core,
            }),
            _ => {
                self.ym2612 = Some(core);
                Ok(())
            }
        }
    }

    /// Collect requests from every build input, lowest precedence first.
    ///
    /// - `features`: enabled Cargo feature names (`"nsf"`, `"ym2612-nuked"`).
    ///   Names that are neither a format nor a core are ignored.
    /// - `list`: the `GME_FORMATS` value, if set.
    /// - `env`: environment variables. Those starting with `USE_GME_` are
    ///   switches and replace earlier requests for their format; the rest
    ///   are ignored.
    ///
    /// Inputs that were not valid Unicode are expected to arrive with
    /// U+FFFD in place of the bad bytes, and are rejected. Returns the
    /// requests and one warning per switch that contradicted an earlier
    /// request.
    pub fn from_sources<F, E>(
        features: F,
        list: Option<&str>,
        env: E,
    ) -> Result<(Self, Vec<String>), ConfigError>
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        E: IntoIterator<Item = (String, String)>,
    {
        let mut requests = Self::new();
        let mut warnings = Vec::new();

        for feature in features {
            let feature = feature.as_ref();
            if let Some(core) = Ym2612Core::from_feature(feature) {
                requests.request_ym2612(core)?;
            } else if let Some(format) = GmeType::ALL.into_iter().find(|f| f.id() == feature) {
                requests.request(format, true)?;
            }
        }

        if let Some(list) = list {
            reject_replacement(LIST_VAR, list, list)?;
            requests.request_list(list)?;
        }

        let mut switches: Vec<(String, String)> = env
            .into_iter()
            .filter(|(key, _)| key.starts_with(SWITCH_PREFIX))
            .collect();
        switches.sort();

        for (key, value) in switches {
            reject_replacement(&key, &key, &value)?;
            reject_replacement(&key, &value, &value)?;
            let name = key.strip_prefix(SWITCH_PREFIX).unwrap_or(&key);
            let format = GmeType::from_id(name).ok_or_else(|| ConfigError::UnknownFormat {
                name: String::from(name),
            })?;
            let enabled = parse_switch(&key, &value)?;
            if requests.get(format) == Some(!enabled) {
                warnings.push(format!(
                    "{key}={value} overrides an earlier request for {format}"
                ));
            }
            requests.set(format, enabled);
        }

        Ok((requests, warnings))
    }
}

/// Environment variable holding a list of formats to enable.
pub const LIST_VAR: &str = "GME_FORMATS";

/// Prefix of the per-format environment switches.
pub const SWITCH_PREFIX: &str = "USE_GME_";

fn reject_replacement(key: &str, text: &str, value: &str) -> Result<(), ConfigError> {
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(ConfigError::InvalidValue {
            key: String::from(key),
            value: String::from(value),
        });
    }
    Ok(())
}

/// Parse a CMake-style boolean switch.
pub fn parse_switch(key: &str, value: &str) -> Result<bool, ConfigError> {
    let v = value.trim();
    const ON: [&str; 5] = ["1", "on", "true", "yes", "y"];
    const OFF: [&str; 5] = ["0", "off", "false", "no", "n"];
    if ON.iter().any(|s| s.eq_ignore_ascii_case(v)) {
        Ok(true)
    } else if OFF.iter().any(|s| s.eq_ignore_ascii_case(v)) {
        Ok(false)
    } else {
        Err(ConfigError::InvalidValue {
            key: String::from(key),
            value: String::from(value),
        })
    }
}

/// Resolve every flag to present or absent.
///
/// A flag is present when any of its formats is explicitly enabled. Formats
/// sharing a flag must not be requested in opposite states.
pub fn resolve(requests: &FlagRequests) -> Result<FlagSet, ConfigError> {
    let mut set = FlagSet::EMPTY;
    for flag in CapabilityFlag::ALL {
        let mut enabled = None;
        let mut disabled = None;
        for &format in flag.formats() {
            match requests.get(format) {
                Some(true) => enabled = enabled.or(Some(format)),
                Some(false) => disabled = disabled.or(Some(format)),
                None => {}
            }
        }
        match (enabled, disabled) {
            (Some(enabled), Some(disabled)) => {
                return Err(ConfigError::PairConflict { enabled, disabled });
            }
            (Some(_), None) => set.insert(flag),
            _ => {}
        }
    }
    Ok(set)
}

/// Resolve the flags, then the YM2612 core if VGM or GYM needs one.
///
/// A core selected while neither emulator is present is dropped.
pub fn resolve_build(requests: &FlagRequests) -> Result<BuildConfig, ConfigError> {
    let flags = resolve(requests)?;
    let ym2612 = flags
        .needs_ym2612()
        .then(|| requests.ym2612.unwrap_or_default());
    Ok(BuildConfig::new(flags, ym2612))
}
