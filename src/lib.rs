//! # gme-formats
//!
//! Build-time emulator selection for Game Music Emu.
//!
//! Each emulator is feature-gated and nothing is compiled in by default.
//! Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! gme-formats = { version = "0.1", features = ["nsf", "nsfe", "spc"] }
//! ```
//!
//! The build script also honours `USE_GME_<ID>=ON|OFF` overrides (the names
//! of the CMake options) and a `GME_FORMATS=nsf,spc,...` list. `vgm` and
//! `vgz` share one emulator and are always enabled together; asking for one
//! on and the other off fails the build.
//!
//! Cargo only reruns the build script when a variable it knows about
//! changes, and it cannot watch every possible `USE_GME_*` name. A
//! misspelled switch such as `USE_GME_KSX=ON` is rejected the next time the
//! script runs, but setting it after a successful build changes nothing
//! until then. `touch build.rs` or `cargo clean -p gme-formats` forces the
//! check.
//!
//! VGM and GYM need a YM2612 core: Gens by default, or Nuked OPN2 / MAME
//! with the `ym2612-nuked` / `ym2612-mame` features (not both).
//!
//! The resolved configuration is available as [`BUILD`] ([`COMPILED`] and
//! [`YM2612_CORE`]), as `cfg(gme_use_<id>)` and `cfg(gme_ym2612 = "...")`
//! inside this crate, and as a generated `gme_types.h` for C sources
//! (`DEP_GME_FORMATS_INCLUDE` in dependent build scripts).
//!
//! ## Usage
//!
//! ```rust
//! use gme_formats::{FormatRegistry, GmeType};
//!
//! let registry = FormatRegistry::compiled();
//! for d in registry.descriptors() {
//!     println!("{} ({}): .{}", d.format, d.system, d.extension.to_lowercase());
//! }
//!
//! match registry.identify(b"NESM\x1a\x01") {
//!     Ok(format) => assert_eq!(format, GmeType::Nsf),
//!     Err(e) => println!("cannot play: {e}"),
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
pub mod flags;
mod format;
mod registry;

mod generated {
    use crate::flags::{FlagSet, Ym2612Core};

    include!(concat!(env!("OUT_DIR"), "/gme_types.rs"));
}

pub use error::GmeError;
pub use flags::{
    BuildConfig, CapabilityFlag, ConfigError, FlagSet, GmeType, SharedModule, Ym2612Core,
};
pub use format::FormatDescriptor;
pub use generated::{COMPILED, YM2612_CORE};
pub use registry::FormatRegistry;

/// Full configuration this crate was built with.
pub const BUILD: BuildConfig = BuildConfig::new(COMPILED, YM2612_CORE);

