//! Resolves which emulators this build includes.
//!
//! Inputs, lowest precedence first:
//! - Cargo features `ay`, `gbs`, ... `vgz`, and `ym2612-nuked` / `ym2612-mame`
//! - `GME_FORMATS`, a comma or space separated list of formats to enable
//! - `USE_GME_<ID>` switches (`ON`/`OFF`, `1`/`0`, ...), named after the CMake options
//!
//! Outputs `cfg(gme_use_<id>)`, `cfg(gme_ym2612 = "<core>")` when VGM or GYM
//! is present, `$OUT_DIR/gme_types.rs`, `$OUT_DIR/gme_types.h` and
//! `DEP_GME_FORMATS_*` metadata for dependent build scripts.

extern crate alloc;

#[allow(dead_code)]
#[path = "src/flags.rs"]
mod flags;

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use flags::{BuildConfig, CapabilityFlag, ConfigError, FlagRequests, GmeType, Ym2612Core};

fn main() -> ExitCode {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=src/flags.rs");
    println!("cargo::rerun-if-env-changed={}", flags::LIST_VAR);
    for format in GmeType::ALL {
        println!("cargo::rerun-if-env-changed={}", format.define());
    }
    for flag in CapabilityFlag::ALL {
        println!("cargo::rustc-check-cfg=cfg({})", flag.cfg_name());
    }
    let cores: Vec<String> = Ym2612Core::ALL
        .iter()
        .map(|core| format!("\"{}\"", core.id()))
        .collect();
    println!("cargo::rustc-check-cfg=cfg(gme_ym2612, values({}))", cores.join(", "));

    let build = match collect_requests().and_then(|requests| flags::resolve_build(&requests)) {
        Ok(build) => build,
        Err(e) => {
            eprintln!("error: gme-formats build configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = emit(build) {
        eprintln!("error: gme-formats: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Bytes that are not UTF-8 become U+FFFD, which `from_sources` rejects.
fn lossy(s: OsString) -> String {
    s.into_string()
        .unwrap_or_else(|s| s.to_string_lossy().into_owned())
}

fn collect_requests() -> Result<FlagRequests, ConfigError> {
    let features: Vec<String> = env::vars_os()
        .filter_map(|(key, _)| {
            let key = key.into_string().ok()?;
            let name = key.strip_prefix("CARGO_FEATURE_")?;
            Some(name.to_ascii_lowercase().replace('_', "-"))
        })
        .collect();
    let list = env::var_os(flags::LIST_VAR).map(lossy);
    let vars = env::vars_os().map(|(key, value)| (lossy(key), lossy(value)));

    let (requests, warnings) = FlagRequests::from_sources(features, list.as_deref(), vars)?;
    for warning in warnings {
        println!("cargo::warning={warning}");
    }
    Ok(requests)
}

fn emit(build: BuildConfig) -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR not set")
    })?);

    fs::write(out_dir.join("gme_types.rs"), build.to_rust_source())?;
    fs::write(out_dir.join("gme_types.h"), build.to_c_header())?;

    println!("cargo::metadata=include={}", out_dir.display());
    for flag in CapabilityFlag::ALL {
        let key = flag.cfg_name().trim_start_matches("gme_use_");
        if build.flags.contains(flag) {
            println!("cargo::rustc-cfg={}", flag.cfg_name());
            println!("cargo::metadata={key}=1");
        } else {
            println!("cargo::metadata={key}=0");
        }
    }
    match build.ym2612 {
        Some(core) => {
            println!("cargo::rustc-cfg=gme_ym2612=\"{}\"", core.id());
            println!("cargo::metadata=ym2612={}", core.id());
        }
        None => println!("cargo::metadata=ym2612=none"),
    }
    Ok(())
}
