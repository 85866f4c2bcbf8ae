//! Format listing for the linked build.

use gme_formats::{BUILD, COMPILED, FormatDescriptor, FormatRegistry, GmeType};
use serde::Serialize;

use crate::FormatsArgs;

/// Run the `formats` subcommand.
pub fn run(args: FormatsArgs) -> anyhow::Result<()> {
    if args.header {
        print!("{}", BUILD.to_c_header());
        return Ok(());
    }

    let rows = rows(&FormatRegistry::compiled(), args.all);
    tracing::debug!(flags = ?COMPILED, rows = rows.len(), "listing formats");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No emulators compiled in.");
        return Ok(());
    }

    println!(
        "{:<6} {:<18} {:<6} {:<7} {}",
        "Format", "System", "Ext", "Tracks", "Status"
    );
    println!("{}", "-".repeat(50));
    for row in &rows {
        println!(
            "{:<6} {:<18} {:<6} {:<7} {}",
            row.descriptor.format.to_string(),
            row.descriptor.system,
            row.descriptor.extension,
            if row.descriptor.multi_track { "multi" } else { "single" },
            if row.compiled { "compiled" } else { "absent" },
        );
    }

    let modules: Vec<_> = COMPILED.modules().map(|m| m.name()).collect();
    if !modules.is_empty() {
        println!();
        println!("Shared modules: {}", modules.join(", "));
    }
    if let Some(core) = BUILD.ym2612 {
        println!("YM2612 core:    {}", core.id());
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
struct FormatRow {
    #[serde(flatten)]
    descriptor: FormatDescriptor,
    compiled: bool,
}

fn rows(registry: &FormatRegistry, all: bool) -> Vec<FormatRow> {
    if all {
        GmeType::ALL
            .into_iter()
            .map(|format| FormatRow {
                descriptor: format.descriptor(),
                compiled: registry.supports(format),
            })
            .collect()
    } else {
        registry
            .descriptors()
            .map(|descriptor| FormatRow {
                descriptor,
                compiled: true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_format() {
        let rows = rows(&FormatRegistry::none(), true);
        assert_eq!(rows.len(), GmeType::ALL.len());
        assert!(rows.iter().all(|r| !r.compiled));
    }

    #[test]
    fn default_lists_supported_only() {
        let registry = FormatRegistry::none().with_format(GmeType::Spc, true);
        let rows = rows(&registry, false);
        let expected = usize::from(FormatRegistry::is_compiled(GmeType::Spc));
        assert_eq!(rows.len(), expected);
    }

    #[test]
    fn row_json_is_flat() {
        let row = FormatRow {
            descriptor: GmeType::Gbs.descriptor(),
            compiled: false,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["format"], "gbs");
        assert_eq!(json["system"], "Game Boy");
        assert_eq!(json["compiled"], false);
    }
}
