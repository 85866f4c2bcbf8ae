//! File identification — header signature first, extension as fallback.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use gme_formats::{FormatRegistry, GmeError, GmeType};
use serde::Serialize;

use crate::IdentifyArgs;
use crate::inputs;

/// Bytes needed for header detection.
const HEADER_LEN: u64 = 4;

/// Run the `identify` subcommand.
pub fn run(args: IdentifyArgs) -> anyhow::Result<()> {
    let registry = registry_for(&args.only)?;
    let files = inputs::expand_inputs(&args.files)?;

    if files.is_empty() {
        anyhow::bail!("no music files found");
    }

    let reports: Vec<Report> = files
        .iter()
        .map(|path| report_for(path, &registry))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    let unreadable = reports
        .iter()
        .filter(|r| r.detected_by == Some(UNREADABLE))
        .count();
    if unreadable == reports.len() {
        anyhow::bail!("none of the {unreadable} input files could be read");
    }
    Ok(())
}

/// `detected_by` for files whose header could not be read.
const UNREADABLE: &str = "unreadable";

/// Read a file's header and identify it. Read failures become a report too.
fn report_for(path: &Path, registry: &FormatRegistry) -> Report {
    match read_header(path) {
        Ok(header) => identify(path, &header, registry),
        Err(e) => {
            tracing::error!("{}: {e:#}", path.display());
            Report {
                path: path.display().to_string(),
                format: None,
                detected_by: Some(UNREADABLE),
                playable: false,
                error: Some(format!("{e:#}")),
            }
        }
    }
}

/// Build the registry, narrowed to `--only` formats when given.
fn registry_for(only: &[String]) -> anyhow::Result<FormatRegistry> {
    if only.is_empty() {
        return Ok(FormatRegistry::compiled());
    }
    let mut registry = FormatRegistry::none();
    for name in only {
        let format = GmeType::from_id(name)
            .with_context(|| format!("unknown format `{name}` in --only"))?;
        if !FormatRegistry::is_compiled(format) {
            tracing::warn!("{format} is not compiled into this build");
        }
        registry = registry.with_format(format, true);
    }
    Ok(registry)
}

fn read_header(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file = std::fs::File::open(path).context("open failed")?;
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    file.take(HEADER_LEN)
        .read_to_end(&mut header)
        .context("read failed")?;
    Ok(header)
}

#[derive(Debug, Serialize, PartialEq)]
struct Report {
    path: String,
    format: Option<GmeType>,
    /// `header`, `extension` or `unreadable`
    detected_by: Option<&'static str>,
    playable: bool,
    error: Option<String>,
}

fn identify(path: &Path, header: &[u8], registry: &FormatRegistry) -> Report {
    let by_header = GmeType::detect(header).map(|f| (f, "header"));
    let by_extension = || {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(GmeType::from_extension)
            .map(|f| (f, "extension"))
    };

    let Some((format, detected_by)) = by_header.or_else(by_extension) else {
        return Report {
            path: path.display().to_string(),
            format: None,
            detected_by: None,
            playable: false,
            error: Some(GmeError::UnrecognizedFormat.to_string()),
        };
    };
    tracing::debug!("{}: {format} by {detected_by}", path.display());

    let checked = registry.check(format);
    Report {
        path: path.display().to_string(),
        format: Some(format),
        detected_by: Some(detected_by),
        playable: checked.is_ok(),
        error: checked.err().map(|e| e.to_string()),
    }
}

fn print_report(report: &Report) {
    match (report.format, report.detected_by) {
        (Some(format), Some(by)) => {
            let status = if report.playable { "ok" } else { "unsupported" };
            println!(
                "{}: {} ({}, by {}) [{}]",
                report.path,
                format,
                format.system(),
                by,
                status
            );
        }
        (None, Some(by)) => println!("{}: {by}", report.path),
        _ => println!("{}: unknown", report.path),
    }
    if let Some(err) = &report.error {
        println!("  {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_extension() {
        let report = identify(Path::new("song.spc"), b"NESM", &FormatRegistry::compiled());
        assert_eq!(report.format, Some(GmeType::Nsf));
        assert_eq!(report.detected_by, Some("header"));
    }

    #[test]
    fn extension_fallback() {
        let report = identify(Path::new("track.gym"), b"\0\0\0\0", &FormatRegistry::compiled());
        assert_eq!(report.format, Some(GmeType::Gym));
        assert_eq!(report.detected_by, Some("extension"));
    }

    #[test]
    fn unknown_file() {
        let report = identify(Path::new("notes.txt"), b"hi", &FormatRegistry::compiled());
        assert_eq!(report.format, None);
        assert!(!report.playable);
        assert!(report.error.is_some());
    }

    #[test]
    fn disabled_format_is_not_playable() {
        let report = identify(Path::new("a.vgz"), b"\x1f\x8b\x08\x00", &FormatRegistry::none());
        assert_eq!(report.format, Some(GmeType::Vgz));
        assert!(!report.playable);
    }

    #[test]
    fn unreadable_file_is_reported() {
        let registry = FormatRegistry::compiled();
        let report = report_for(Path::new("/definitely/not/here.nsf"), &registry);
        assert_eq!(report.format, None);
        assert_eq!(report.detected_by, Some(UNREADABLE));
        assert!(!report.playable);
        assert!(report.error.unwrap().contains("open failed"));
    }

    #[test]
    fn unreadable_file_appears_in_json() {
        let report = report_for(Path::new("/definitely/not/here.spc"), &FormatRegistry::none());
        let json = serde_json::to_value([&report]).unwrap();
        assert_eq!(json[0]["path"], "/definitely/not/here.spc");
        assert_eq!(json[0]["detected_by"], "unreadable");
        assert!(json[0]["error"].is_string());
    }

    #[test]
    fn only_rejects_unknown_names() {
        assert!(registry_for(&["nsf".into(), "xm".into()]).is_err());
        let registry = registry_for(&["kss".into()]).unwrap();
        assert!(!registry.supports(GmeType::Nsf));
    }
}
